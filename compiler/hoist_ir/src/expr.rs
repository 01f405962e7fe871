//! Expression kinds.
//!
//! `ExprKind` is `Copy`: every child is an index, so a pass can read a node's
//! kind out of the arena and then allocate into the same arena without
//! holding a borrow.

use crate::{CatchRange, ConstantId, ExprId, ExprRange, VarId, VarRange};

/// Binary operators.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Lt,
    Eq,
}

impl BinaryOp {
    /// Source spelling of the operator.
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Lt => "<",
            BinaryOp::Eq => "==",
        }
    }
}

/// Member selected by a [`ExprKind::Field`] access.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Member {
    /// The current contents of a storage cell.
    Value,
}

/// One `catch` clause of a [`ExprKind::Try`].
///
/// The bound variable (if any) is in scope for both `body` and `filter`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CatchHandler {
    pub variable: Option<VarId>,
    pub body: ExprId,
    /// Boolean guard evaluated before `body`; a handler without one always matches.
    pub filter: Option<ExprId>,
}

/// Expression variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ExprKind {
    Unit,
    Int(i64),
    Bool(bool),

    /// Reference to a declared variable.
    Var(VarId),

    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// `target = value`. The target is a `Var` or a `Field` of a cell.
    Assign {
        target: ExprId,
        value: ExprId,
    },

    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },

    /// Sequence of expressions with block-scoped locals.
    ///
    /// Locals are an ordered set: duplicates are removed at construction.
    Block {
        locals: VarRange,
        body: ExprRange,
    },

    Lambda {
        params: VarRange,
        body: ExprId,
        /// Self-name, for diagnostics only.
        name: Option<VarId>,
    },

    Call {
        callee: ExprId,
        args: ExprRange,
    },

    Try {
        body: ExprId,
        handlers: CatchRange,
    },

    Throw(ExprId),

    /// Reference to a value in the constant pool.
    Constant(ConstantId),

    /// Member access on a runtime object.
    Field {
        receiver: ExprId,
        member: Member,
    },

    /// Materialize the listed variables as one addressable, writable list.
    RuntimeVariables(VarRange),
}
