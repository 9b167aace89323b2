use super::VmError;

/// Output boundary for builtins.
pub trait BuiltinHost {
    fn write(&mut self, s: &str, newline: bool) -> Result<(), VmError>;
}
