#![allow(dead_code)]

use toylib::ast::Program;
use toylib::bytecode::{Bytecode, Value};
use toylib::compiler::CompileError;
use toylib::diagnostic::DiagnosticBag;
use toylib::parser::Parser;
use toylib::pipeline::{self, PipelineError};
use toylib::vm::{TestHost, VmConfig, VmError};

pub fn parse_ok(src: &str) -> Program {
    let (program, diags) = Parser::parse_source(src);
    assert!(diags.is_empty(), "diagnostics: {:?}", diags.as_slice());
    program
}

pub fn parse_err(src: &str) -> DiagnosticBag {
    let (_program, diags) = Parser::parse_source(src);
    assert!(
        !diags.is_empty(),
        "expected parser diagnostics but got none for:\n{src}"
    );
    diags
}

pub fn compile_ok(src: &str) -> Bytecode {
    pipeline::compile_source(src).expect("compile should succeed")
}

pub fn compile_err(src: &str) -> CompileError {
    match pipeline::compile_source(src) {
        Err(PipelineError::Compile(e)) => e,
        other => panic!("expected compile error, got {other:?}"),
    }
}

pub fn run_ok(src: &str) -> Value {
    let mut host = TestHost::default();
    pipeline::run_source_with(src, VmConfig::default(), &mut host).expect("vm run")
}

pub fn run_with_output(src: &str) -> (Value, String) {
    let mut host = TestHost::default();
    let value = pipeline::run_source_with(src, VmConfig::default(), &mut host).expect("vm run");
    (value, host.output)
}

pub fn run_err(src: &str) -> VmError {
    let mut host = TestHost::default();
    match pipeline::run_source_with(src, VmConfig::default(), &mut host) {
        Err(PipelineError::Runtime(e)) => e,
        other => panic!("expected runtime error, got {other:?}"),
    }
}

pub fn assert_has_diag(diags: &DiagnosticBag, needle: &str) {
    assert!(
        diags.as_slice().iter().any(|d| d.message.contains(needle)),
        "missing diagnostic containing `{needle}` in {:?}",
        diags.as_slice()
    );
}
