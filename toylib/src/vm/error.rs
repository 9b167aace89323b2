use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmErrorKind {
    IndexOutOfRange,
    TypeMismatch,
    DivisionByZero,
    StackUnderflow,
    StackOverflow,
    UndefinedOpcode,
    InternalConsistency,
    UnknownBuiltin,
    ArityMismatch,
    HostError,
    BudgetExceeded,
    UnboundGlobal,
}

impl VmErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            VmErrorKind::IndexOutOfRange => "E-VM-INDEX-OOR",
            VmErrorKind::TypeMismatch => "E-VM-TYPE",
            VmErrorKind::DivisionByZero => "E-VM-DIV-ZERO",
            VmErrorKind::StackUnderflow => "E-VM-STACK-UNDERFLOW",
            VmErrorKind::StackOverflow => "E-VM-STACK-OVERFLOW",
            VmErrorKind::UndefinedOpcode => "E-VM-UNDEFINED-OPCODE",
            VmErrorKind::InternalConsistency => "E-VM-INTERNAL",
            VmErrorKind::UnknownBuiltin => "E-VM-UNKNOWN-BUILTIN",
            VmErrorKind::ArityMismatch => "E-VM-ARITY",
            VmErrorKind::HostError => "E-VM-HOST",
            VmErrorKind::BudgetExceeded => "E-VM-BUDGET",
            VmErrorKind::UnboundGlobal => "E-VM-UNBOUND-GLOBAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct VmError {
    pub kind: VmErrorKind,
    pub message: String,
}

impl VmError {
    pub(crate) fn new(kind: VmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
