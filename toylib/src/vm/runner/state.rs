use crate::bytecode::Value;
use crate::vm::{STACK_SIZE, VmError, VmErrorKind};

/// Operand stack bounded at `STACK_SIZE` slots.
#[derive(Debug, Clone, Default)]
pub(crate) struct ValueStack {
    slots: Vec<Value>,
}

impl ValueStack {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::with_capacity(64),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn top(&self) -> Option<&Value> {
        self.slots.last()
    }

    pub(crate) fn push(&mut self, value: Value, ip: usize) -> Result<(), VmError> {
        if self.slots.len() >= STACK_SIZE {
            return Err(super::err_at(
                VmErrorKind::StackOverflow,
                format!("stack overflow (capacity {STACK_SIZE})"),
                ip,
            ));
        }
        self.slots.push(value);
        Ok(())
    }

    pub(crate) fn pop(&mut self, what: &str, ip: usize) -> Result<Value, VmError> {
        self.slots.pop().ok_or_else(|| {
            super::err_at(VmErrorKind::StackUnderflow, format!("{what} expects a value"), ip)
        })
    }

    /// Pops `n` values, returned in push order.
    pub(crate) fn pop_n(&mut self, n: usize, what: &str, ip: usize) -> Result<Vec<Value>, VmError> {
        if self.slots.len() < n {
            return Err(super::err_at(
                VmErrorKind::StackUnderflow,
                format!("{what} expects {n} values, found {}", self.slots.len()),
                ip,
            ));
        }
        let split = self.slots.len() - n;
        Ok(self.slots.split_off(split))
    }
}
