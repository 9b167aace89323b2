use std::collections::HashMap;

use crate::vm::GLOBALS_SIZE;

use super::CompileError;

/// Global name to slot index. Indices are handed out in order and never
/// reused, even after [`SymbolTable::retain_slots`] drops a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    slots: HashMap<String, usize>,
    next: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing slot for `name` or allocates the next one.
    pub fn define(&mut self, name: &str) -> Result<usize, CompileError> {
        if let Some(&idx) = self.slots.get(name) {
            return Ok(idx);
        }
        let idx = self.next;
        if idx >= GLOBALS_SIZE {
            return Err(CompileError::TooManyGlobals { limit: GLOBALS_SIZE });
        }
        self.slots.insert(name.to_string(), idx);
        self.next += 1;
        Ok(idx)
    }

    /// Forgets every name whose slot fails `keep`.
    pub fn retain_slots(&mut self, mut keep: impl FnMut(usize) -> bool) {
        self.slots.retain(|_, slot| keep(*slot));
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
