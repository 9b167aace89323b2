#![allow(dead_code)]

use toylib::bytecode::{Bytecode, Value};
use toylib::parser::Parser;
use toylib::pipeline::{compile_source, run_bytecode};
use toylib::vm::{TestHost, VmConfig};

pub fn src_loop_accumulate(iters: usize) -> String {
    format!(
        r#"
let i = 0;
let acc = 0;
while (i < {iters}) {{
  acc = acc + i;
  i = i + 1;
}}
acc
"#
    )
}

pub fn src_branchy_loop(iters: usize) -> String {
    format!(
        r#"
let i = 0;
let evens = 0;
let odds = 0;
while (i < {iters}) {{
  if (i / 2 * 2 == i) {{
    evens = evens + 1;
  }} else {{
    odds = odds + 1;
  }}
  i = i + 1;
}}
evens - odds
"#
    )
}

pub fn src_builtin_calls(iters: usize) -> String {
    format!(
        r#"
let i = 0;
let n = 0;
while (i < {iters}) {{
  n = n + len("benchmark");
  i = i + 1;
}}
n
"#
    )
}

/// One long expression: `1 + 2 * 3 - 4 / 5 + ...`.
pub fn src_arith_chain(terms: usize) -> String {
    let ops = [" + ", " * ", " - ", " / "];
    let mut out = String::from("1");
    for i in 0..terms {
        out.push_str(ops[i % ops.len()]);
        out.push_str(&((i % 9) + 1).to_string());
    }
    out
}

pub fn compile_module(src: &str) -> Bytecode {
    compile_source(src).expect("compile benchmark source")
}

pub fn run_vm(bytecode: &Bytecode) -> Value {
    let mut host = TestHost::default();
    run_bytecode(bytecode.clone(), VmConfig::default(), &mut host).expect("run benchmark program")
}

pub fn parse_only(src: &str) {
    let (_p, diags) = Parser::parse_source(src);
    assert!(diags.is_empty(), "parser diags: {:?}", diags.as_slice());
}
