//! Evaluation errors.
//!
//! A `throw` that escapes every enclosing `try` surfaces as
//! [`EvalError::Thrown`]; `try` handlers only ever intercept that variant.

use hoist_runtime::{RuntimeError, Value};
use thiserror::Error;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value of type {type_name} is not callable")]
    NotCallable { type_name: &'static str },

    #[error("expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget,

    #[error("integer overflow in `{op}`")]
    IntegerOverflow { op: &'static str },

    #[error("maximum call depth of {limit} exceeded")]
    StackOverflow { limit: usize },

    #[error("uncaught exception: {0:?}")]
    Thrown(Value),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

#[cold]
pub fn type_mismatch(expected: &'static str, found: &Value) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}
