use crate::bytecode::Value;
use crate::vm::{VmError, VmErrorKind};

use super::state::ValueStack;

/// Validates an absolute jump target. Landing exactly on the end of the
/// stream is allowed and halts the machine.
pub(super) fn jump(target: usize, code_len: usize, ip: usize) -> Result<usize, VmError> {
    if target > code_len {
        return Err(super::err_at(
            VmErrorKind::IndexOutOfRange,
            format!("jump target {target} is past the end of the stream ({code_len} bytes)"),
            ip,
        ));
    }
    Ok(target)
}

pub(super) fn jump_not_true(
    stack: &mut ValueStack,
    target: usize,
    code_len: usize,
    ip: usize,
) -> Result<Option<usize>, VmError> {
    let cond = match stack.pop("OpJumpNotTrue", ip)? {
        Value::Bool(v) => v,
        other => {
            return Err(super::err_at(
                VmErrorKind::TypeMismatch,
                format!("OpJumpNotTrue expects bool, got {}", other.type_name()),
                ip,
            ));
        }
    };
    if cond {
        return Ok(None);
    }
    jump(target, code_len, ip).map(Some)
}
