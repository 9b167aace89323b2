use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn check_valid_program_returns_zero() {
    let tmp = make_temp_dir("toyc_ok");
    let file = tmp.join("ok.toy");
    fs::write(&file, "let x = 1;\nwhile (x < 10) { x = x * 2; }\nx\n").expect("write fixture");

    let output = Command::new(toyc_bin())
        .arg("check")
        .arg(&file)
        .output()
        .expect("run toyc");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok:"));
}

#[test]
fn check_parse_error_returns_parse_exit_code() {
    let tmp = make_temp_dir("toyc_bad");
    let file = tmp.join("bad.toy");
    fs::write(&file, "let x = (1 + 2;\n").expect("write fixture");

    let output = Command::new(toyc_bin())
        .arg("check")
        .arg(&file)
        .output()
        .expect("run toyc");
    assert_eq!(output.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("[E-PARSE][parse] error at 1:15: Expected `)` after grouped expression")
    );
}

#[test]
fn check_compile_error_returns_codegen_exit_code() {
    let tmp = make_temp_dir("toyc_codegen");
    let file = tmp.join("fn.toy");
    fs::write(&file, "let f = fn(a) { a; };\n").expect("write fixture");

    let output = Command::new(toyc_bin())
        .arg("check")
        .arg(&file)
        .output()
        .expect("run toyc");
    assert_eq!(output.status.code(), Some(12));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[E-CODEGEN][codegen]"));
    assert!(stderr.contains("function literals"));
}

#[test]
fn build_then_disasm_artifact() {
    let tmp = make_temp_dir("toyc_build");
    let src = tmp.join("main.toy");
    let out = tmp.join("main.toybc");
    fs::write(&src, "1 + 2").expect("write fixture");

    let output = Command::new(toyc_bin())
        .arg("build")
        .arg(&src)
        .arg(&out)
        .output()
        .expect("run toyc");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("built:"));
    let bytes = fs::read(&out).expect("artifact written");
    assert_eq!(&bytes[..4], b"TOYB");

    let output = Command::new(toyc_bin())
        .arg("disasm")
        .arg(&out)
        .output()
        .expect("run toyc");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "instructions (7 bytes)\n\
         0000 OpConstant 0\n\
         0003 OpConstant 1\n\
         0006 OpAdd\n\
         constants (2)\n  0000 Int(1)\n  0001 Int(2)\n"
    );
}

#[test]
fn disasm_source_file_directly() {
    let tmp = make_temp_dir("toyc_disasm_src");
    let src = tmp.join("cond.toy");
    fs::write(&src, "if (true) { 1; }").expect("write fixture");

    let output = Command::new(toyc_bin())
        .arg("disasm")
        .arg(&src)
        .output()
        .expect("run toyc");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0001 OpJumpNotTrue 8\n"));
    assert!(stdout.contains("0008 OpNull\n"));
}

#[test]
fn disasm_rejects_corrupt_artifact() {
    let tmp = make_temp_dir("toyc_corrupt");
    let bc = tmp.join("bad.toybc");
    fs::write(&bc, b"TOYB\x07\x00\x00\x00").expect("write fixture");

    let output = Command::new(toyc_bin())
        .arg("disasm")
        .arg(&bc)
        .output()
        .expect("run toyc");
    assert_eq!(output.status.code(), Some(13));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported bytecode version 7"));
}

#[test]
fn without_arguments_shows_usage_and_fails() {
    let output = Command::new(toyc_bin()).output().expect("run toyc");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: toyc check <file.toy>"));
}

#[test]
fn unknown_command_fails() {
    let output = Command::new(toyc_bin())
        .arg("wat")
        .output()
        .expect("run toyc");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown command"));
}

#[test]
fn missing_file_fails() {
    let output = Command::new(toyc_bin())
        .arg("check")
        .arg("does_not_exist.toy")
        .output()
        .expect("run toyc");
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read"));
}

fn toyc_bin() -> &'static str {
    env!("CARGO_BIN_EXE_toyc")
}

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
