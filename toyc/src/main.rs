use std::env;
use std::fs;
use std::process::ExitCode;

use anyhow::{Context, bail};
use toylib::bytecode::Bytecode;
use toylib::diagnostic::Diagnostic;
use toylib::pipeline::{self, PipelineError};

const EXIT_OK: u8 = 0;
const EXIT_USAGE: u8 = 2;
const EXIT_IO: u8 = 3;
const EXIT_PARSE: u8 = 10;
const EXIT_CODEGEN: u8 = 12;
const EXIT_DECODE: u8 = 13;

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
        bail!(
            "Usage: toyc check <file.toy> | toyc build <in.toy> <out.toybc> | toyc disasm <file.toy|file.toybc>"
        );
    };

    match cmd.as_str() {
        "check" => {
            let (Some(path), None) = (args.next(), args.next()) else {
                bail!("Usage: toyc check <file.toy>");
            };
            Ok(check_file(&path))
        }
        "build" => {
            let (Some(input), Some(output), None) = (args.next(), args.next(), args.next()) else {
                bail!("Usage: toyc build <in.toy> <out.toybc>");
            };
            Ok(build_file(&input, &output))
        }
        "disasm" => {
            let (Some(path), None) = (args.next(), args.next()) else {
                bail!("Usage: toyc disasm <file.toy|file.toybc>");
            };
            if !path.ends_with(".toy") && !path.ends_with(".toybc") {
                bail!("disasm supports only .toy and .toybc files");
            }
            Ok(disasm_file(&path))
        }
        _ => bail!("Unknown command. Supported: check, build, disasm"),
    }
}

fn check_file(path: &str) -> ExitCode {
    match compile_file(path) {
        Ok(_) => {
            println!("ok: {path}");
            ExitCode::from(EXIT_OK)
        }
        Err(code) => code,
    }
}

fn build_file(input: &str, output: &str) -> ExitCode {
    let bytecode = match compile_file(input) {
        Ok(bc) => bc,
        Err(code) => return code,
    };
    if let Err(e) = fs::write(output, bytecode.to_bytes())
        .with_context(|| format!("Failed to write `{output}`"))
    {
        eprintln!("{e:#}");
        return ExitCode::from(EXIT_IO);
    }
    log::debug!("wrote {} instruction bytes to {output}", bytecode.instructions.len());
    println!("built: {output}");
    ExitCode::from(EXIT_OK)
}

fn disasm_file(path: &str) -> ExitCode {
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
        match compile_file(path) {
            Ok(bc) => bc,
            Err(code) => return code,
        }
    };
    print!("{}", bytecode.disassemble());
    ExitCode::from(EXIT_OK)
}

/// Reads and compiles a source file, reporting failures on stderr. The
/// error side is the exit code to return.
fn compile_file(path: &str) -> Result<Bytecode, ExitCode> {
    let source = match fs::read_to_string(path)
        .with_context(|| format!("Failed to read `{path}`"))
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e:#}");
            return Err(ExitCode::from(EXIT_IO));
        }
    };
    match pipeline::compile_source(&source) {
        Ok(bc) => Ok(bc),
        Err(PipelineError::Parse(diags)) => {
            for d in diags.iter() {
                print_diag(d);
            }
            Err(ExitCode::from(EXIT_PARSE))
        }
        Err(e) => {
            eprintln!("[E-CODEGEN][codegen] {e}");
            Err(ExitCode::from(EXIT_CODEGEN))
        }
    }
}

fn print_diag(d: &Diagnostic) {
    eprintln!("[E-PARSE][parse] {d}");
}
