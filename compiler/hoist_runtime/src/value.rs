//! Runtime values.

use std::fmt;
use std::sync::Arc;

use hoist_ir::{ExprId, VarId};
use rustc_hash::FxHashMap;

use crate::{StrongBox, VariableList};

/// Runtime value produced by evaluating a fragment.
///
/// Scalars and routing tables compare by content. Cells, functions, and
/// variable lists compare by identity: two lists with the same contents are
/// still different lists if they are backed by different cells.
#[derive(Clone, Debug)]
pub enum Value {
    Unit,
    Int(i64),
    Bool(bool),
    Function(Arc<FunctionValue>),
    /// A storage cell as a first-class value (what `Constant` wraps after quoting).
    Cell(StrongBox),
    Variables(VariableList),
    /// Routing table for [`merge_runtime_variables`](crate::merge_runtime_variables).
    Routing(Arc<[i64]>),
    Builtin(Builtin),
}

impl Value {
    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Function(_) => "function",
            Value::Cell(_) => "cell",
            Value::Variables(_) => "runtime variables",
            Value::Routing(_) => "routing table",
            Value::Builtin(_) => "builtin",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Cell(a), Value::Cell(b)) => a.ptr_eq(b),
            (Value::Variables(a), Value::Variables(b)) => Arc::ptr_eq(a, b),
            (Value::Routing(a), Value::Routing(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A closure: parameters, body, and the cells it captured.
///
/// Captures are cells, not values, so a closure and the scope that created it
/// keep observing each other's writes.
#[derive(Debug)]
pub struct FunctionValue {
    pub name: Option<VarId>,
    pub params: Arc<[VarId]>,
    pub body: ExprId,
    pub captures: FxHashMap<VarId, StrongBox>,
}

/// Operations a fragment can call through a `Constant` callee.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Builtin {
    /// `(first, second, routing) -> merged list`
    MergeRuntimeVariables,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::MergeRuntimeVariables => "merge_runtime_variables",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::MergeRuntimeVariables => 3,
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
