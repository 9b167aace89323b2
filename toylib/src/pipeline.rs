//! Source-to-value entry points: lex, parse, compile, execute.

use thiserror::Error;

use crate::ast::Program;
use crate::bytecode::{Bytecode, Value};
use crate::compiler::{CompileError, Compiler, SymbolTable};
use crate::diagnostic::DiagnosticBag;
use crate::parser::Parser;
use crate::vm::{BuiltinHost, StdIoHost, Vm, VmConfig, VmError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Parse(DiagnosticBag),
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("runtime error [{}]: {}", .0.kind.code(), .0)]
    Runtime(#[from] VmError),
}

pub fn parse_program(source: &str) -> Result<Program, PipelineError> {
    let (program, diags) = Parser::parse_source(source);
    if !diags.is_empty() {
        log::debug!("parse failed with {} diagnostics", diags.len());
        return Err(PipelineError::Parse(diags));
    }
    Ok(program)
}

pub fn compile_source(source: &str) -> Result<Bytecode, PipelineError> {
    let program = parse_program(source)?;
    Ok(crate::compiler::compile_program(&program)?)
}

pub fn run_source(source: &str) -> Result<Value, PipelineError> {
    let mut host = StdIoHost;
    run_source_with(source, VmConfig::default(), &mut host)
}

pub fn run_source_with(
    source: &str,
    config: VmConfig,
    host: &mut dyn BuiltinHost,
) -> Result<Value, PipelineError> {
    let bytecode = compile_source(source)?;
    Ok(run_bytecode(bytecode, config, host)?)
}

pub fn run_bytecode(
    bytecode: Bytecode,
    config: VmConfig,
    host: &mut dyn BuiltinHost,
) -> Result<Value, VmError> {
    let mut vm = Vm::new(bytecode).with_config(config);
    vm.run_with_host(host)?;
    vm.result()
}

/// Evaluation context that keeps globals alive between inputs.
#[derive(Debug, Default)]
pub struct Session {
    symbols: SymbolTable,
    globals: Vec<Option<Value>>,
    config: VmConfig,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: VmConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Evaluates one input. A failed compile leaves the session untouched;
    /// a runtime fault keeps any globals stored before the fault. Names whose
    /// `let` never ran (untaken branch, faulted initializer) are dropped, so
    /// later inputs see them as undefined.
    pub fn eval(
        &mut self,
        source: &str,
        host: &mut dyn BuiltinHost,
    ) -> Result<Value, PipelineError> {
        let program = parse_program(source)?;

        let mut compiler = Compiler::with_symbols(self.symbols.clone());
        compiler.compile_program(&program)?;
        let (bytecode, symbols) = compiler.into_parts();
        self.symbols = symbols;

        let mut vm = Vm::with_globals(bytecode, std::mem::take(&mut self.globals))
            .with_config(self.config);
        let outcome = vm.run_with_host(host).and_then(|()| vm.result());
        self.globals = vm.into_globals();
        let globals = &self.globals;
        self.symbols.retain_slots(|slot| globals.get(slot).is_some_and(Option::is_some));
        Ok(outcome?)
    }
}
