//! Lowers the syntax tree to byte-encoded instructions.

mod symbols;

use thiserror::Error;

use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::builtins;
use crate::bytecode::{Bytecode, Instructions, Opcode, Value, make_instruction};

pub use symbols::SymbolTable;

const MAX_U16_OPERAND: usize = u16::MAX as usize;
const JUMP_PLACEHOLDER: usize = 0xFFFF;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("constant pool is full (limit {limit})")]
    TooManyConstants { limit: usize },
    #[error("too many globals (limit {limit})")]
    TooManyGlobals { limit: usize },
    #[error("jump target {0} does not fit in a 2-byte operand")]
    JumpOutOfRange(usize),
    #[error("call to `{name}` passes {count} arguments (limit 255)")]
    TooManyArguments { name: String, count: usize },
    #[error("no single-operand instruction at offset {0}")]
    InvalidPatch(usize),
}

#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Vec<u8>,
    constants: Vec<Value>,
    symbols: SymbolTable,
    return_jumps: Vec<usize>,
}

/// Compiles a whole program with a fresh symbol table.
pub fn compile_program(program: &Program) -> Result<Bytecode, CompileError> {
    let mut compiler = Compiler::new();
    compiler.compile_program(program)?;
    Ok(compiler.bytecode())
}

/// Compiles a single expression; its value is the one residual stack slot.
pub fn compile_expression(expr: &Expr) -> Result<Bytecode, CompileError> {
    let mut compiler = Compiler::new();
    compiler.compile_expression(expr)?;
    Ok(compiler.bytecode())
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues numbering globals from an earlier compilation.
    pub fn with_symbols(symbols: SymbolTable) -> Self {
        Self {
            symbols,
            ..Self::default()
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn bytecode(self) -> Bytecode {
        self.into_parts().0
    }

    pub fn into_parts(self) -> (Bytecode, SymbolTable) {
        let bytecode = Bytecode {
            instructions: Instructions::from(self.instructions),
            constants: self.constants,
        };
        (bytecode, self.symbols)
    }

    pub fn compile_program(&mut self, program: &Program) -> Result<(), CompileError> {
        let count = program.statements.len();
        for (i, stmt) in program.statements.iter().enumerate() {
            match stmt {
                Stmt::Expr(expr) if i + 1 == count => self.compile_expression(expr)?,
                _ => self.compile_stmt(stmt)?,
            }
        }
        if !matches!(program.statements.last(), Some(Stmt::Expr(_))) {
            self.emit(Opcode::Null, &[]);
        }

        let end = self.instructions.len();
        for pos in std::mem::take(&mut self.return_jumps) {
            self.change_operand(pos, end)?;
        }
        log::debug!(
            "compiled {} statements into {} bytes, {} constants",
            count,
            self.instructions.len(),
            self.constants.len()
        );
        Ok(())
    }

    pub fn compile_expression(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Int(v) => {
                let idx = self.add_constant(Value::Int(*v))?;
                self.emit(Opcode::Constant, &[idx]);
            }
            Expr::Str(s) => {
                let idx = self.add_constant(Value::Str(s.clone()))?;
                self.emit(Opcode::Constant, &[idx]);
            }
            Expr::Bool(true) => {
                self.emit(Opcode::True, &[]);
            }
            Expr::Bool(false) => {
                self.emit(Opcode::False, &[]);
            }
            Expr::Ident(name) => {
                let idx = self
                    .symbols
                    .resolve(name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                self.emit(Opcode::GetGlobal, &[idx]);
            }
            Expr::Prefix { op, right } => {
                self.compile_expression(right)?;
                let opcode = match op {
                    PrefixOp::Neg => Opcode::Minus,
                    PrefixOp::Not => Opcode::Bang,
                };
                self.emit(opcode, &[]);
            }
            Expr::Infix { left, op, right } => {
                // `a < b` is `b > a`.
                let (first, second) = match op {
                    InfixOp::Lt => (right, left),
                    _ => (left, right),
                };
                self.compile_expression(first)?;
                self.compile_expression(second)?;
                let opcode = match op {
                    InfixOp::Add => Opcode::Add,
                    InfixOp::Sub => Opcode::Sub,
                    InfixOp::Mul => Opcode::Mul,
                    InfixOp::Div => Opcode::Div,
                    InfixOp::Eq => Opcode::Equal,
                    InfixOp::NotEq => Opcode::NotEqual,
                    InfixOp::Gt | InfixOp::Lt => Opcode::GreaterThan,
                };
                self.emit(opcode, &[]);
            }
            Expr::Call { callee, args } => self.compile_call(callee, args)?,
            Expr::Function { .. } => {
                return Err(CompileError::UnsupportedConstruct(
                    "function literals".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn compile_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<(), CompileError> {
        let Expr::Ident(name) = callee else {
            return Err(CompileError::UnsupportedConstruct(format!(
                "call to non-builtin `{callee}`"
            )));
        };
        let Some(id) = builtins::lookup(name) else {
            return Err(CompileError::UnsupportedConstruct(format!(
                "call to non-builtin `{name}`"
            )));
        };
        if args.len() > u8::MAX as usize {
            return Err(CompileError::TooManyArguments {
                name: name.clone(),
                count: args.len(),
            });
        }
        for arg in args {
            self.compile_expression(arg)?;
        }
        self.emit(Opcode::CallBuiltin, &[id as usize, args.len()]);
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.compile_expression(expr)?;
                self.emit(Opcode::Pop, &[]);
            }
            Stmt::Let { name, value } => {
                self.compile_expression(value)?;
                let idx = self.symbols.define(name)?;
                self.emit(Opcode::SetGlobal, &[idx]);
            }
            Stmt::Assign { name, value } => {
                let idx = self
                    .symbols
                    .resolve(name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                self.compile_expression(value)?;
                self.emit(Opcode::SetGlobal, &[idx]);
            }
            Stmt::Return(value) => {
                match value {
                    Some(expr) => self.compile_expression(expr)?,
                    None => {
                        self.emit(Opcode::Null, &[]);
                    }
                }
                let at = self.emit(Opcode::Jump, &[JUMP_PLACEHOLDER]);
                self.return_jumps.push(at);
            }
            Stmt::While { cond, body } => {
                let loop_start = self.instructions.len();
                self.compile_expression(cond)?;
                let exit_jump = self.emit(Opcode::JumpNotTrue, &[JUMP_PLACEHOLDER]);
                self.compile_block(body)?;
                self.emit_jump_to(loop_start)?;
                let loop_end = self.instructions.len();
                self.change_operand(exit_jump, loop_end)?;
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                self.compile_expression(cond)?;
                let else_jump = self.emit(Opcode::JumpNotTrue, &[JUMP_PLACEHOLDER]);
                self.compile_block(then_block)?;
                match else_block {
                    Some(block) => {
                        let end_jump = self.emit(Opcode::Jump, &[JUMP_PLACEHOLDER]);
                        let else_start = self.instructions.len();
                        self.change_operand(else_jump, else_start)?;
                        self.compile_block(block)?;
                        let end = self.instructions.len();
                        self.change_operand(end_jump, end)?;
                    }
                    None => {
                        let end = self.instructions.len();
                        self.change_operand(else_jump, end)?;
                    }
                }
            }
            Stmt::Block(block) => self.compile_block(block)?,
        }
        Ok(())
    }

    fn compile_block(&mut self, block: &Block) -> Result<(), CompileError> {
        for stmt in &block.statements {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_jump_to(&mut self, target: usize) -> Result<usize, CompileError> {
        if target > MAX_U16_OPERAND {
            return Err(CompileError::JumpOutOfRange(target));
        }
        Ok(self.emit(Opcode::Jump, &[target]))
    }

    /// Appends one instruction and returns its starting offset.
    pub fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let pos = self.instructions.len();
        self.instructions.extend(make_instruction(op, operands));
        pos
    }

    /// Re-encodes the instruction at `pos` with a new single operand.
    pub fn change_operand(&mut self, pos: usize, operand: usize) -> Result<(), CompileError> {
        if operand > MAX_U16_OPERAND {
            return Err(CompileError::JumpOutOfRange(operand));
        }
        let op = self
            .instructions
            .get(pos)
            .and_then(|&byte| Opcode::from_byte(byte).ok())
            .filter(|op| op.definition().operand_widths.len() == 1)
            .ok_or(CompileError::InvalidPatch(pos))?;
        let patched = make_instruction(op, &[operand]);
        let Some(slot) = self.instructions.get_mut(pos..pos + patched.len()) else {
            return Err(CompileError::InvalidPatch(pos));
        };
        slot.copy_from_slice(&patched);
        Ok(())
    }

    fn add_constant(&mut self, value: Value) -> Result<usize, CompileError> {
        let idx = self.constants.len();
        if idx > MAX_U16_OPERAND {
            return Err(CompileError::TooManyConstants {
                limit: MAX_U16_OPERAND + 1,
            });
        }
        self.constants.push(value);
        Ok(idx)
    }
}
