use std::fmt;

use super::{Bytecode, Instructions, Value, lookup, read_operands};

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.as_bytes();
        let mut ip = 0usize;
        while ip < bytes.len() {
            let def = match lookup(bytes[ip]) {
                Ok(def) => def,
                Err(e) => {
                    writeln!(f, "{ip:04} ERROR: {e}")?;
                    ip += 1;
                    continue;
                }
            };
            let Some((operands, read)) = read_operands(def, &bytes[ip + 1..]) else {
                writeln!(f, "{ip:04} ERROR: truncated operands for {}", def.name)?;
                break;
            };
            write!(f, "{ip:04} {}", def.name)?;
            for operand in &operands {
                write!(f, " {operand}")?;
            }
            writeln!(f)?;
            ip += 1 + read;
        }
        Ok(())
    }
}

impl Bytecode {
    pub fn disassemble(&self) -> String {
        let mut out = format!("instructions ({} bytes)\n", self.instructions.len());
        out.push_str(&self.instructions.to_string());
        out.push_str(&format!("constants ({})\n", self.constants.len()));
        for (i, c) in self.constants.iter().enumerate() {
            out.push_str(&format!("  {i:04} {}\n", fmt_constant(c)));
        }
        out
    }
}

fn fmt_constant(v: &Value) -> String {
    match v {
        Value::Int(i) => format!("Int({i})"),
        Value::Bool(b) => format!("Bool({b})"),
        Value::Str(s) => format!("Str({s:?})"),
        Value::Null => "Null".to_string(),
    }
}
