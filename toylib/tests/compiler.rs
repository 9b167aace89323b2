mod common;

use common::{compile_err, compile_ok, parse_ok};
use toylib::bytecode::{Bytecode, Instructions, Opcode, Value, make_instruction};
use toylib::compiler::{self, CompileError, Compiler, SymbolTable};
use toylib::parser::Parser;

fn concat(parts: Vec<Vec<u8>>) -> Instructions {
    parts.into_iter().collect()
}

fn assert_instructions(bc: &Bytecode, want: Vec<Vec<u8>>) {
    let want = concat(want);
    assert_eq!(
        bc.instructions, want,
        "\nwant:\n{want}\ngot:\n{}",
        bc.instructions
    );
}

#[test]
fn compiles_integer_arithmetic() {
    let bc = compile_ok("1 + 2");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Constant, &[1]),
            make_instruction(Opcode::Add, &[]),
        ],
    );
    assert_eq!(bc.constants, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn compiles_operands_in_post_order() {
    let bc = compile_ok("2 + 3 * 4");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Constant, &[1]),
            make_instruction(Opcode::Constant, &[2]),
            make_instruction(Opcode::Mul, &[]),
            make_instruction(Opcode::Add, &[]),
        ],
    );
    assert_eq!(
        bc.constants,
        vec![Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn pops_every_expression_statement_but_the_last() {
    let bc = compile_ok("1; 2");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Pop, &[]),
            make_instruction(Opcode::Constant, &[1]),
        ],
    );
}

#[test]
fn less_than_swaps_operands() {
    let bc = compile_ok("1 < 2");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Constant, &[1]),
            make_instruction(Opcode::GreaterThan, &[]),
        ],
    );
    assert_eq!(bc.constants, vec![Value::Int(2), Value::Int(1)]);
}

#[test]
fn compiles_booleans_prefix_and_equality() {
    let bc = compile_ok("!true != -5 == false");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::True, &[]),
            make_instruction(Opcode::Bang, &[]),
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Minus, &[]),
            make_instruction(Opcode::NotEqual, &[]),
            make_instruction(Opcode::False, &[]),
            make_instruction(Opcode::Equal, &[]),
        ],
    );
}

#[test]
fn let_binds_globals_and_non_expression_tail_pushes_null() {
    let bc = compile_ok("let x = 5; let y = x; let x = 7;");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::SetGlobal, &[0]),
            make_instruction(Opcode::GetGlobal, &[0]),
            make_instruction(Opcode::SetGlobal, &[1]),
            make_instruction(Opcode::Constant, &[1]),
            make_instruction(Opcode::SetGlobal, &[0]),
            make_instruction(Opcode::Null, &[]),
        ],
    );
}

#[test]
fn empty_program_leaves_null() {
    let bc = compile_ok("");
    assert_instructions(&bc, vec![make_instruction(Opcode::Null, &[])]);
}

#[test]
fn back_patches_if_without_else() {
    let bc = compile_ok("if (true) { 10; }");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::True, &[]),
            make_instruction(Opcode::JumpNotTrue, &[8]),
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Pop, &[]),
            make_instruction(Opcode::Null, &[]),
        ],
    );
}

#[test]
fn back_patches_if_else() {
    let bc = compile_ok("if (true) { 10; } else { 20; }");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::True, &[]),
            make_instruction(Opcode::JumpNotTrue, &[11]),
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Pop, &[]),
            make_instruction(Opcode::Jump, &[15]),
            make_instruction(Opcode::Constant, &[1]),
            make_instruction(Opcode::Pop, &[]),
            make_instruction(Opcode::Null, &[]),
        ],
    );
}

#[test]
fn back_patches_while_loop() {
    let bc = compile_ok("let i = 0; while (i < 3) { i = i + 1; }");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::SetGlobal, &[0]),
            make_instruction(Opcode::Constant, &[1]),
            make_instruction(Opcode::GetGlobal, &[0]),
            make_instruction(Opcode::GreaterThan, &[]),
            make_instruction(Opcode::JumpNotTrue, &[29]),
            make_instruction(Opcode::GetGlobal, &[0]),
            make_instruction(Opcode::Constant, &[2]),
            make_instruction(Opcode::Add, &[]),
            make_instruction(Opcode::SetGlobal, &[0]),
            make_instruction(Opcode::Jump, &[6]),
            make_instruction(Opcode::Null, &[]),
        ],
    );
    assert_eq!(
        bc.constants,
        vec![Value::Int(0), Value::Int(3), Value::Int(1)]
    );
}

#[test]
fn return_jumps_to_program_end() {
    let bc = compile_ok("return 1; 2");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Jump, &[9]),
            make_instruction(Opcode::Constant, &[1]),
        ],
    );
}

#[test]
fn bare_return_pushes_null() {
    let bc = compile_ok("return;");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Null, &[]),
            make_instruction(Opcode::Jump, &[5]),
            make_instruction(Opcode::Null, &[]),
        ],
    );
}

#[test]
fn compiles_builtin_calls() {
    let bc = compile_ok("print(len(\"ab\"), 1)");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::CallBuiltin, &[0, 1]),
            make_instruction(Opcode::Constant, &[1]),
            make_instruction(Opcode::CallBuiltin, &[2, 2]),
        ],
    );
    assert_eq!(bc.constants, vec![Value::Str("ab".into()), Value::Int(1)]);
}

#[test]
fn compile_expression_handles_lone_subtree() {
    let (expr, diags) = Parser::parse_expression_source("20 / 5 - 1");
    assert!(diags.is_empty());
    let bc = compiler::compile_expression(&expr.expect("expression")).expect("compile");
    assert_instructions(
        &bc,
        vec![
            make_instruction(Opcode::Constant, &[0]),
            make_instruction(Opcode::Constant, &[1]),
            make_instruction(Opcode::Div, &[]),
            make_instruction(Opcode::Constant, &[2]),
            make_instruction(Opcode::Sub, &[]),
        ],
    );
}

#[test]
fn compilation_is_deterministic() {
    let src = "let a = 1; while (a < 10) { a = a * 2; } if (a > 8) { print(\"big\"); } a";
    let first = compile_ok(src);
    let second = compile_ok(src);
    assert_eq!(first, second);
    assert_eq!(first.to_bytes(), second.to_bytes());
}

#[test]
fn rejects_undefined_variables() {
    assert_eq!(
        compile_err("x + 1"),
        CompileError::UndefinedVariable("x".into())
    );
    assert_eq!(
        compile_err("y = 1;"),
        CompileError::UndefinedVariable("y".into())
    );
}

#[test]
fn rejects_functions_and_non_builtin_calls() {
    assert!(matches!(
        compile_err("fn(a) { a; }"),
        CompileError::UnsupportedConstruct(_)
    ));
    assert!(matches!(
        compile_err("let f = 1; f(2)"),
        CompileError::UnsupportedConstruct(msg) if msg.contains("`f`")
    ));
    assert!(matches!(
        compile_err("(1 + 2)(3)"),
        CompileError::UnsupportedConstruct(_)
    ));
}

#[test]
fn rejects_too_many_builtin_arguments() {
    let args = vec!["0"; 256].join(", ");
    let err = compile_err(&format!("print({args})"));
    assert_eq!(
        err,
        CompileError::TooManyArguments {
            name: "print".into(),
            count: 256
        }
    );
}

#[test]
fn rejects_constant_pool_overflow() {
    let src = "1;".repeat(65_537);
    assert_eq!(
        compile_err(&src),
        CompileError::TooManyConstants { limit: 65_536 }
    );
}

#[test]
fn rejects_jump_targets_beyond_two_bytes() {
    let src = format!("let x = 1; return x; {}", "x;".repeat(20_000));
    assert!(matches!(
        compile_err(&src),
        CompileError::JumpOutOfRange(target) if target > 65_535
    ));
}

#[test]
fn emit_returns_offsets_and_change_operand_patches_in_place() {
    let mut c = Compiler::new();
    assert_eq!(c.emit(Opcode::Jump, &[0xFFFF]), 0);
    assert_eq!(c.emit(Opcode::Pop, &[]), 3);
    c.change_operand(0, 4).expect("patch jump");
    assert_eq!(c.change_operand(3, 1), Err(CompileError::InvalidPatch(3)));
    assert_eq!(c.change_operand(0, 70_000), Err(CompileError::JumpOutOfRange(70_000)));
    let bc = c.bytecode();
    assert_eq!(
        bc.instructions.as_bytes(),
        &[Opcode::Jump as u8, 0, 4, Opcode::Pop as u8]
    );
}

#[test]
fn symbol_table_reuses_slots() {
    let mut symbols = SymbolTable::new();
    assert_eq!(symbols.define("a"), Ok(0));
    assert_eq!(symbols.define("b"), Ok(1));
    assert_eq!(symbols.define("a"), Ok(0));
    assert_eq!(symbols.resolve("b"), Some(1));
    assert_eq!(symbols.resolve("c"), None);
    assert_eq!(symbols.len(), 2);
}

#[test]
fn retained_symbols_never_reuse_dropped_slots() {
    let mut symbols = SymbolTable::new();
    assert_eq!(symbols.define("a"), Ok(0));
    assert_eq!(symbols.define("b"), Ok(1));
    assert_eq!(symbols.define("c"), Ok(2));
    symbols.retain_slots(|slot| slot != 1);
    assert_eq!(symbols.resolve("b"), None);
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols.define("d"), Ok(3));
    assert_eq!(symbols.define("b"), Ok(4));
}

#[test]
fn compiler_continues_symbol_numbering() {
    let mut first = Compiler::new();
    first
        .compile_program(&parse_ok("let a = 1;"))
        .expect("compile");
    let (_bc, symbols) = first.into_parts();

    let mut second = Compiler::with_symbols(symbols);
    second
        .compile_program(&parse_ok("let b = a;"))
        .expect("compile");
    assert_eq!(second.symbols().resolve("b"), Some(1));
    assert_instructions(
        &second.bytecode(),
        vec![
            make_instruction(Opcode::GetGlobal, &[0]),
            make_instruction(Opcode::SetGlobal, &[1]),
            make_instruction(Opcode::Null, &[]),
        ],
    );
}
