//! Hoist IR - expression trees for quoting.
//!
//! This crate holds the data structures shared by every hoist stage:
//! - Spans for source locations
//! - Index newtypes (`ExprId`, `VarId`, `ConstantId`) and flat ranges
//! - Expression kinds and the arena that owns them
//! - The [`Rewriter`] traversal used by tree-to-tree passes
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: No `Box<Expr>`, children are `ExprId` indices
//! - **Immutable Nodes**: A pass never edits a node in place. It allocates a
//!   replacement, or returns the original `ExprId` when nothing changed, so
//!   "unchanged" is a plain integer comparison.
//! - **Identity, not names**: a variable is its `VarId`. Declaring `x` twice
//!   yields two distinct variables.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod expr;
mod ids;
pub mod rewrite;
mod span;
mod stack;

pub use arena::ExprArena;
pub use expr::{BinaryOp, CatchHandler, ExprKind, Member};
pub use ids::{CatchRange, ConstantId, ExprId, ExprRange, VarId, VarRange};
pub use rewrite::{walk_catch, walk_expr, Rewriter};
pub use span::Span;
pub use stack::ensure_sufficient_stack;
