//! Typed-instruction machine for integer arithmetic trees.
//!
//! Used as an oracle for the byte-encoded path: both must agree on every
//! arithmetic expression they accept.

use thiserror::Error;

use crate::ast::{Expr, InfixOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    Push(i64),
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported expression: {0}")]
    Unsupported(String),
    #[error("invalid program state: {0} values left on the stack")]
    InvalidProgramState(usize),
}

/// Post-order lowering of integer literals and `+ - * /`.
pub fn lower(expr: &Expr) -> Result<Vec<Instr>, ReferenceError> {
    let mut out = Vec::new();
    lower_into(expr, &mut out)?;
    Ok(out)
}

fn lower_into(expr: &Expr, out: &mut Vec<Instr>) -> Result<(), ReferenceError> {
    match expr {
        Expr::Int(v) => out.push(Instr::Push(*v)),
        Expr::Infix { left, op, right } => {
            let instr = match op {
                InfixOp::Add => Instr::Add,
                InfixOp::Sub => Instr::Sub,
                InfixOp::Mul => Instr::Mul,
                InfixOp::Div => Instr::Div,
                other => return Err(ReferenceError::Unsupported(other.symbol().to_string())),
            };
            lower_into(left, out)?;
            lower_into(right, out)?;
            out.push(instr);
        }
        other => return Err(ReferenceError::Unsupported(other.kind_name().to_string())),
    }
    Ok(())
}

pub fn run(code: &[Instr]) -> Result<i64, ReferenceError> {
    let mut stack: Vec<i64> = Vec::new();
    for instr in code {
        match *instr {
            Instr::Push(v) => stack.push(v),
            Instr::Add => binary(&mut stack, |l, r| Ok(l.wrapping_add(r)))?,
            Instr::Sub => binary(&mut stack, |l, r| Ok(l.wrapping_sub(r)))?,
            Instr::Mul => binary(&mut stack, |l, r| Ok(l.wrapping_mul(r)))?,
            Instr::Div => binary(&mut stack, |l, r| {
                if r == 0 {
                    return Err(ReferenceError::DivisionByZero);
                }
                Ok(l.wrapping_div(r))
            })?,
        }
    }
    match stack.as_slice() {
        [v] => Ok(*v),
        rest => Err(ReferenceError::InvalidProgramState(rest.len())),
    }
}

fn binary(
    stack: &mut Vec<i64>,
    f: impl FnOnce(i64, i64) -> Result<i64, ReferenceError>,
) -> Result<(), ReferenceError> {
    let r = stack.pop().ok_or(ReferenceError::StackUnderflow)?;
    let l = stack.pop().ok_or(ReferenceError::StackUnderflow)?;
    stack.push(f(l, r)?);
    Ok(())
}
