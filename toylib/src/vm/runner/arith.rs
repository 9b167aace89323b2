use crate::bytecode::{Opcode, Value};
use crate::vm::{VmError, VmErrorKind};

use super::state::ValueStack;

fn pop_pair(stack: &mut ValueStack, name: &str, ip: usize) -> Result<(Value, Value), VmError> {
    let r = stack.pop(&format!("{name} rhs"), ip)?;
    let l = stack.pop(&format!("{name} lhs"), ip)?;
    Ok((l, r))
}

pub(super) fn binary(stack: &mut ValueStack, op: Opcode, ip: usize) -> Result<(), VmError> {
    let name = op.definition().name;
    let (l, r) = pop_pair(stack, name, ip)?;
    let (Value::Int(a), Value::Int(b)) = (&l, &r) else {
        return Err(super::err_at(
            VmErrorKind::TypeMismatch,
            format!(
                "{name} expects int operands, got {} and {}",
                l.type_name(),
                r.type_name()
            ),
            ip,
        ));
    };
    let (a, b) = (*a, *b);
    let v = match op {
        Opcode::Add => a.wrapping_add(b),
        Opcode::Sub => a.wrapping_sub(b),
        Opcode::Mul => a.wrapping_mul(b),
        Opcode::Div => {
            if b == 0 {
                return Err(super::err_at(
                    VmErrorKind::DivisionByZero,
                    "division by zero",
                    ip,
                ));
            }
            a.wrapping_div(b)
        }
        _ => {
            return Err(super::err_at(
                VmErrorKind::InternalConsistency,
                format!("{name} is not an arithmetic opcode"),
                ip,
            ));
        }
    };
    stack.push(Value::Int(v), ip)
}

pub(super) fn equality(stack: &mut ValueStack, negate: bool, ip: usize) -> Result<(), VmError> {
    let name = if negate { "OpNotEqual" } else { "OpEqual" };
    let (l, r) = pop_pair(stack, name, ip)?;
    if std::mem::discriminant(&l) != std::mem::discriminant(&r) {
        return Err(super::err_at(
            VmErrorKind::TypeMismatch,
            format!(
                "{name} cannot compare {} with {}",
                l.type_name(),
                r.type_name()
            ),
            ip,
        ));
    }
    stack.push(Value::Bool((l == r) != negate), ip)
}

pub(super) fn greater_than(stack: &mut ValueStack, ip: usize) -> Result<(), VmError> {
    let (l, r) = pop_pair(stack, "OpGreaterThan", ip)?;
    let (Value::Int(a), Value::Int(b)) = (&l, &r) else {
        return Err(super::err_at(
            VmErrorKind::TypeMismatch,
            format!(
                "OpGreaterThan expects int operands, got {} and {}",
                l.type_name(),
                r.type_name()
            ),
            ip,
        ));
    };
    let gt = a > b;
    stack.push(Value::Bool(gt), ip)
}

pub(super) fn neg(stack: &mut ValueStack, ip: usize) -> Result<(), VmError> {
    match stack.pop("OpMinus", ip)? {
        Value::Int(v) => stack.push(Value::Int(v.wrapping_neg()), ip),
        other => Err(super::err_at(
            VmErrorKind::TypeMismatch,
            format!("OpMinus expects int, got {}", other.type_name()),
            ip,
        )),
    }
}

pub(super) fn not_bool(stack: &mut ValueStack, ip: usize) -> Result<(), VmError> {
    match stack.pop("OpBang", ip)? {
        Value::Bool(v) => stack.push(Value::Bool(!v), ip),
        other => Err(super::err_at(
            VmErrorKind::TypeMismatch,
            format!("OpBang expects bool, got {}", other.type_name()),
            ip,
        )),
    }
}
