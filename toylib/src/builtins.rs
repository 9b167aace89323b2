//! Built-in functions callable through `OpCallBuiltin`.
//!
//! The position of an entry in the table is the id the compiler encodes.

use crate::bytecode::Value;
use crate::vm::{BuiltinHost, VmError, VmErrorKind};

pub type BuiltinHandler = fn(&mut dyn BuiltinHost, Vec<Value>) -> Result<Value, VmError>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub handler: BuiltinHandler,
}

macro_rules! builtin_table {
    ($(($name:literal, $handler:path)),+ $(,)?) => {
        static BUILTINS: &[Builtin] = &[
            $(Builtin { name: $name, handler: $handler },)+
        ];
    };
}

builtin_table![
    ("len", builtin_len),
    ("type", builtin_type),
    ("print", builtin_print),
];

pub fn all() -> &'static [Builtin] {
    BUILTINS
}

/// Id of the builtin named `name`, as encoded in `OpCallBuiltin`.
pub fn lookup(name: &str) -> Option<u8> {
    BUILTINS
        .iter()
        .position(|b| b.name == name)
        .map(|i| i as u8)
}

pub fn by_id(id: u8) -> Option<&'static Builtin> {
    BUILTINS.get(id as usize)
}

fn builtin_len(_host: &mut dyn BuiltinHost, args: Vec<Value>) -> Result<Value, VmError> {
    if args.len() != 1 {
        return Err(VmError::new(
            VmErrorKind::ArityMismatch,
            format!("len expects 1 argument, got {}", args.len()),
        ));
    }
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(VmError::new(
            VmErrorKind::TypeMismatch,
            format!("len expects str argument, got {}", other.type_name()),
        )),
    }
}

fn builtin_type(_host: &mut dyn BuiltinHost, args: Vec<Value>) -> Result<Value, VmError> {
    if args.len() != 1 {
        return Err(VmError::new(
            VmErrorKind::ArityMismatch,
            format!("type expects 1 argument, got {}", args.len()),
        ));
    }
    Ok(Value::Str(args[0].type_name().to_string()))
}

fn builtin_print(host: &mut dyn BuiltinHost, args: Vec<Value>) -> Result<Value, VmError> {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    host.write(&line, true)?;
    Ok(Value::Null)
}
