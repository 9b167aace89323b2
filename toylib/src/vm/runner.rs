//! Interpreter loop and instruction dispatch.

mod arith;
mod control_flow;
pub(crate) mod state;

use crate::builtins;
use crate::bytecode::{Opcode, Value, read_u16};

use super::{BuiltinHost, GLOBALS_SIZE, Vm, VmError, VmErrorKind};

impl Vm {
    /// Runs from the current `ip` until the stream ends or an instruction
    /// faults. State bookkeeping is left to the caller.
    pub(super) fn execute(&mut self, host: &mut dyn BuiltinHost) -> Result<(), VmError> {
        let code_len = self.instructions.len();
        let mut dispatched: u64 = 0;

        while self.ip < code_len {
            let at = self.ip;
            if let Some(max) = self.config.max_instructions {
                if dispatched >= max {
                    return Err(err_at(
                        VmErrorKind::BudgetExceeded,
                        format!("instruction budget of {max} exhausted"),
                        at,
                    ));
                }
            }
            dispatched += 1;

            let byte = self.instructions.as_bytes()[at];
            let op = Opcode::from_byte(byte)
                .map_err(|e| err_at(VmErrorKind::UndefinedOpcode, e.to_string(), at))?;
            if self.config.trace {
                log::trace!("@{at:04} {} sp={}", op.definition().name, self.stack.len());
            }
            self.ip += 1;

            match op {
                Opcode::Constant => {
                    let idx = self.read_wide(op, at)?;
                    let Some(v) = self.constants.get(idx).cloned() else {
                        return Err(err_at(
                            VmErrorKind::IndexOutOfRange,
                            format!(
                                "constant index {idx} out of range (pool has {})",
                                self.constants.len()
                            ),
                            at,
                        ));
                    };
                    self.stack.push(v, at)?;
                }
                Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                    arith::binary(&mut self.stack, op, at)?
                }
                Opcode::Pop => {
                    self.stack.pop("OpPop", at)?;
                }
                Opcode::True => self.stack.push(Value::Bool(true), at)?,
                Opcode::False => self.stack.push(Value::Bool(false), at)?,
                Opcode::Null => self.stack.push(Value::Null, at)?,
                Opcode::Equal => arith::equality(&mut self.stack, false, at)?,
                Opcode::NotEqual => arith::equality(&mut self.stack, true, at)?,
                Opcode::GreaterThan => arith::greater_than(&mut self.stack, at)?,
                Opcode::Minus => arith::neg(&mut self.stack, at)?,
                Opcode::Bang => arith::not_bool(&mut self.stack, at)?,
                Opcode::Jump => {
                    let target = self.read_wide(op, at)?;
                    self.ip = control_flow::jump(target, code_len, at)?;
                }
                Opcode::JumpNotTrue => {
                    let target = self.read_wide(op, at)?;
                    if let Some(next) =
                        control_flow::jump_not_true(&mut self.stack, target, code_len, at)?
                    {
                        self.ip = next;
                    }
                }
                Opcode::GetGlobal => {
                    let idx = self.read_wide(op, at)?;
                    let Some(v) = self.globals.get(idx).and_then(Option::as_ref) else {
                        return Err(err_at(
                            VmErrorKind::UnboundGlobal,
                            format!("global slot {idx} read before assignment"),
                            at,
                        ));
                    };
                    self.stack.push(v.clone(), at)?;
                }
                Opcode::SetGlobal => {
                    let idx = self.read_wide(op, at)?;
                    let v = self.stack.pop("OpSetGlobal", at)?;
                    if idx >= GLOBALS_SIZE {
                        return Err(err_at(
                            VmErrorKind::IndexOutOfRange,
                            format!("global index {idx} out of range"),
                            at,
                        ));
                    }
                    if idx >= self.globals.len() {
                        self.globals.resize(idx + 1, None);
                    }
                    self.globals[idx] = Some(v);
                }
                Opcode::CallBuiltin => {
                    let id = self.read_byte(op, at)?;
                    let argc = self.read_byte(op, at)?;
                    let Some(builtin) = builtins::by_id(id) else {
                        return Err(err_at(
                            VmErrorKind::UnknownBuiltin,
                            format!("unknown builtin id {id}"),
                            at,
                        ));
                    };
                    let args = self.stack.pop_n(argc as usize, builtin.name, at)?;
                    let ret = (builtin.handler)(host, args)
                        .map_err(|e| err_at(e.kind, e.message, at))?;
                    self.stack.push(ret, at)?;
                }
            }
        }
        Ok(())
    }

    fn read_wide(&mut self, op: Opcode, at: usize) -> Result<usize, VmError> {
        let Some(bytes) = self.instructions.as_bytes().get(self.ip..self.ip + 2) else {
            return Err(truncated(op, at));
        };
        let v = read_u16(bytes) as usize;
        self.ip += 2;
        Ok(v)
    }

    fn read_byte(&mut self, op: Opcode, at: usize) -> Result<u8, VmError> {
        let Some(&b) = self.instructions.as_bytes().get(self.ip) else {
            return Err(truncated(op, at));
        };
        self.ip += 1;
        Ok(b)
    }
}

fn truncated(op: Opcode, at: usize) -> VmError {
    err_at(
        VmErrorKind::IndexOutOfRange,
        format!("truncated operand for {}", op.definition().name),
        at,
    )
}

pub(super) fn err_at(kind: VmErrorKind, message: impl Into<String>, ip: usize) -> VmError {
    let msg = message.into();
    VmError::new(kind, format!("@{ip}: {msg}"))
}
