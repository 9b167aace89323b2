//! Stack virtual machine for the byte-encoded instruction stream.
//!
//! Internals are split into:
//! - `error`: runtime error kinds and codes
//! - `config`: execution limits and tracing
//! - `host_trait` + `host`: output boundary for builtins
//! - `runner`: interpreter loop, operand stack and instruction handlers

mod config;
mod error;
mod host;
mod host_trait;
mod runner;

use crate::bytecode::{Bytecode, Instructions, Value};
pub use config::VmConfig;
pub use error::{VmError, VmErrorKind};
pub use host::{StdIoHost, TestHost};
pub use host_trait::BuiltinHost;

use runner::state::ValueStack;

/// Operand stack capacity.
pub const STACK_SIZE: usize = 2048;
/// Number of addressable global slots (2-byte operand).
pub const GLOBALS_SIZE: usize = 65536;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmState {
    Running,
    Halted,
    Faulted(VmError),
}

#[derive(Debug)]
pub struct Vm {
    instructions: Instructions,
    constants: Vec<Value>,
    stack: ValueStack,
    globals: Vec<Option<Value>>,
    ip: usize,
    state: VmState,
    config: VmConfig,
}

impl Vm {
    pub fn new(bytecode: Bytecode) -> Self {
        Self::with_globals(bytecode, Vec::new())
    }

    /// Starts with a pre-populated globals table, as carried between REPL
    /// evaluations. `None` marks a slot that was never assigned.
    pub fn with_globals(bytecode: Bytecode, globals: Vec<Option<Value>>) -> Self {
        Self {
            instructions: bytecode.instructions,
            constants: bytecode.constants,
            stack: ValueStack::new(),
            globals,
            ip: 0,
            state: VmState::Running,
            config: VmConfig::default(),
        }
    }

    pub fn with_config(mut self, config: VmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run(&mut self) -> Result<(), VmError> {
        let mut host = StdIoHost;
        self.run_with_host(&mut host)
    }

    /// Executes until the stream ends (`Halted`) or an instruction faults
    /// (`Faulted`). Calling again after either outcome replays it.
    pub fn run_with_host(&mut self, host: &mut dyn BuiltinHost) -> Result<(), VmError> {
        match &self.state {
            VmState::Halted => return Ok(()),
            VmState::Faulted(e) => return Err(e.clone()),
            VmState::Running => {}
        }
        log::debug!(
            "vm start: {} bytes, {} constants, {} globals",
            self.instructions.len(),
            self.constants.len(),
            self.globals.len()
        );
        match self.execute(host) {
            Ok(()) => {
                self.state = VmState::Halted;
                Ok(())
            }
            Err(e) => {
                log::debug!("vm fault [{}] {}", e.kind.code(), e);
                self.state = VmState::Faulted(e.clone());
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &VmState {
        &self.state
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn stack_top(&self) -> Option<&Value> {
        self.stack.top()
    }

    pub fn globals(&self) -> &[Option<Value>] {
        &self.globals
    }

    pub fn into_globals(self) -> Vec<Option<Value>> {
        self.globals
    }

    /// The single value a halted program leaves on the stack.
    pub fn result(&self) -> Result<Value, VmError> {
        match &self.state {
            VmState::Faulted(e) => Err(e.clone()),
            VmState::Running => Err(VmError::new(
                VmErrorKind::InternalConsistency,
                "vm has not halted",
            )),
            VmState::Halted => match (self.stack.len(), self.stack.top()) {
                (1, Some(v)) => Ok(v.clone()),
                (n, _) => Err(VmError::new(
                    VmErrorKind::InternalConsistency,
                    format!("expected exactly one residual value, found {n}"),
                )),
            },
        }
    }
}
