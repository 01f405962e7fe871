//! Binary operator evaluation.

use hoist_ir::BinaryOp;
use hoist_runtime::Value;

use crate::errors::{type_mismatch, EvalError, EvalResult};

/// Evaluate `left op right`.
///
/// `==` compares any two values; everything else requires integers.
/// Arithmetic is checked and reports [`EvalError::IntegerOverflow`].
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if op == BinaryOp::Eq {
        return Ok(Value::Bool(left == right));
    }

    let Value::Int(a) = *left else {
        return Err(type_mismatch("int", left));
    };
    let Value::Int(b) = *right else {
        return Err(type_mismatch("int", right));
    };

    let checked = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Lt => return Ok(Value::Bool(a < b)),
        BinaryOp::Eq => return Ok(Value::Bool(a == b)),
    };
    checked
        .map(Value::Int)
        .ok_or(EvalError::IntegerOverflow {
            op: op.as_symbol(),
        })
}
