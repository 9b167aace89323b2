mod repl;

use std::env;
use std::fs;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, bail};
use toylib::bytecode::{Bytecode, Value};
use toylib::diagnostic::Diagnostic;
use toylib::pipeline::{self, PipelineError};
use toylib::vm::{StdIoHost, VmConfig, VmError};

const EXIT_OK: u8 = 0;
const EXIT_USAGE: u8 = 2;
const EXIT_IO: u8 = 3;
const EXIT_PARSE: u8 = 10;
const EXIT_CODEGEN: u8 = 12;
const EXIT_DECODE: u8 = 13;
const EXIT_RUNTIME: u8 = 14;

const USAGE: &str = "Usage: toyrun [run <file.toy|file.toybc>]";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let mut args = env::args().skip(1);
    let Some(cmd) = args.next() else {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        repl::start(stdin.lock(), &mut stdout).context("REPL I/O failed")?;
        return Ok(ExitCode::from(EXIT_OK));
    };

    match cmd.as_str() {
        "run" => {
            let Some(path) = args.next() else {
                bail!(USAGE);
            };
            if args.next().is_some() {
                bail!(USAGE);
            }
            Ok(run_file(&path))
        }
        _ => bail!("Unknown command. Supported: run\n{USAGE}"),
    }
}

fn run_file(path: &str) -> ExitCode {
    let bytecode = if path.ends_with(".toybc") {
        let bytes = match fs::read(path).with_context(|| format!("Failed to read `{path}`")) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{e:#}");
                return ExitCode::from(EXIT_IO);
            }
        };
        match Bytecode::from_bytes(&bytes) {
            Ok(bc) => bc,
            Err(e) => {
                eprintln!("Failed to decode `{path}`: {e}");
                return ExitCode::from(EXIT_DECODE);
            }
        }
    } else {
        let source = match fs::read_to_string(path)
            .with_context(|| format!("Failed to read `{path}`"))
        {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{e:#}");
                return ExitCode::from(EXIT_IO);
            }
        };
        match pipeline::compile_source(&source) {
            Ok(bc) => bc,
            Err(PipelineError::Parse(diags)) => {
                for d in diags.iter() {
                    print_parse_diag(d);
                }
                return ExitCode::from(EXIT_PARSE);
            }
            Err(e) => {
                eprintln!("[E-CODEGEN][codegen] {e}");
                return ExitCode::from(EXIT_CODEGEN);
            }
        }
    };

    let mut host = StdIoHost;
    match pipeline::run_bytecode(bytecode, VmConfig::default(), &mut host) {
        Ok(Value::Null) => ExitCode::from(EXIT_OK),
        Ok(value) => {
            println!("{value}");
            ExitCode::from(EXIT_OK)
        }
        Err(e) => {
            print_runtime_error(&e);
            ExitCode::from(EXIT_RUNTIME)
        }
    }
}

fn print_parse_diag(d: &Diagnostic) {
    eprintln!("[E-PARSE][parse] {d}");
}

fn print_runtime_error(e: &VmError) {
    eprintln!("[{}][runtime] {}", e.kind.code(), e.message);
}
