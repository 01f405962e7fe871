//! Tree-to-tree rewriting.
//!
//! A [`Rewriter`] maps an expression to a (possibly) new expression in the
//! same arena. The default methods call [`walk_expr`] / [`walk_catch`], which
//! rewrite every child and rebuild the parent only when some child changed.
//! An unchanged subtree comes back as the very same [`ExprId`], so callers
//! detect "no rewrite happened" with `==`.
//!
//! # Example
//!
//! ```text
//! struct Negate;
//!
//! impl Rewriter for Negate {
//!     fn rewrite_expr(&mut self, arena: &mut ExprArena, id: ExprId) -> ExprId {
//!         match *arena.kind(id) {
//!             ExprKind::Int(n) => arena.alloc(ExprKind::Int(-n), arena.span(id)),
//!             _ => walk_expr(self, arena, id),
//!         }
//!     }
//! }
//! ```

use smallvec::SmallVec;

use crate::{CatchHandler, CatchRange, ExprArena, ExprId, ExprKind, ExprRange};

/// Expression rewriter.
///
/// Override `rewrite_*` methods to replace specific nodes; call the matching
/// `walk_*` function to fall back to structural recursion.
pub trait Rewriter {
    /// Rewrite an expression.
    fn rewrite_expr(&mut self, arena: &mut ExprArena, id: ExprId) -> ExprId {
        walk_expr(self, arena, id)
    }

    /// Rewrite a catch handler.
    fn rewrite_catch(&mut self, arena: &mut ExprArena, handler: CatchHandler) -> CatchHandler {
        walk_catch(self, arena, handler)
    }
}

/// Rewrite the children of `id`, reallocating it only if a child changed.
///
/// Children are visited depth-first, left to right.
pub fn walk_expr<R: Rewriter + ?Sized>(rewriter: &mut R, arena: &mut ExprArena, id: ExprId) -> ExprId {
    let kind = *arena.kind(id);
    let rebuilt = match kind {
        ExprKind::Unit
        | ExprKind::Int(_)
        | ExprKind::Bool(_)
        | ExprKind::Var(_)
        | ExprKind::Constant(_)
        | ExprKind::RuntimeVariables(_) => None,

        ExprKind::Binary { op, left, right } => {
            let new_left = rewriter.rewrite_expr(arena, left);
            let new_right = rewriter.rewrite_expr(arena, right);
            (new_left != left || new_right != right).then_some(ExprKind::Binary {
                op,
                left: new_left,
                right: new_right,
            })
        }
        ExprKind::Assign { target, value } => {
            let new_target = rewriter.rewrite_expr(arena, target);
            let new_value = rewriter.rewrite_expr(arena, value);
            (new_target != target || new_value != value).then_some(ExprKind::Assign {
                target: new_target,
                value: new_value,
            })
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let new_cond = rewriter.rewrite_expr(arena, cond);
            let new_then = rewriter.rewrite_expr(arena, then_branch);
            let new_else = rewriter.rewrite_expr(arena, else_branch);
            (new_cond != cond || new_then != then_branch || new_else != else_branch).then_some(
                ExprKind::If {
                    cond: new_cond,
                    then_branch: new_then,
                    else_branch: new_else,
                },
            )
        }
        ExprKind::Block { locals, body } => {
            walk_expr_list(rewriter, arena, body).map(|body| ExprKind::Block { locals, body })
        }
        ExprKind::Lambda { params, body, name } => {
            let new_body = rewriter.rewrite_expr(arena, body);
            (new_body != body).then_some(ExprKind::Lambda {
                params,
                body: new_body,
                name,
            })
        }
        ExprKind::Call { callee, args } => {
            let new_callee = rewriter.rewrite_expr(arena, callee);
            let new_args = walk_expr_list(rewriter, arena, args);
            if new_callee == callee && new_args.is_none() {
                None
            } else {
                Some(ExprKind::Call {
                    callee: new_callee,
                    args: new_args.unwrap_or(args),
                })
            }
        }
        ExprKind::Try { body, handlers } => {
            let new_body = rewriter.rewrite_expr(arena, body);
            let new_handlers = walk_catch_list(rewriter, arena, handlers);
            if new_body == body && new_handlers.is_none() {
                None
            } else {
                Some(ExprKind::Try {
                    body: new_body,
                    handlers: new_handlers.unwrap_or(handlers),
                })
            }
        }
        ExprKind::Throw(value) => {
            let new_value = rewriter.rewrite_expr(arena, value);
            (new_value != value).then_some(ExprKind::Throw(new_value))
        }
        ExprKind::Field { receiver, member } => {
            let new_receiver = rewriter.rewrite_expr(arena, receiver);
            (new_receiver != receiver).then_some(ExprKind::Field {
                receiver: new_receiver,
                member,
            })
        }
    };

    match rebuilt {
        Some(kind) => {
            let span = arena.span(id);
            arena.alloc(kind, span)
        }
        None => id,
    }
}

/// Rewrite a catch handler's body and filter. The bound variable is kept.
pub fn walk_catch<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    arena: &mut ExprArena,
    handler: CatchHandler,
) -> CatchHandler {
    let body = rewriter.rewrite_expr(arena, handler.body);
    let filter = handler.filter.map(|filter| rewriter.rewrite_expr(arena, filter));
    CatchHandler {
        variable: handler.variable,
        body,
        filter,
    }
}

/// Rewrite each element; `None` means every element came back unchanged.
fn walk_expr_list<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    arena: &mut ExprArena,
    range: ExprRange,
) -> Option<ExprRange> {
    let original: SmallVec<[ExprId; 8]> = arena.expr_list(range).iter().copied().collect();
    let mut changed = false;
    let mut rewritten: SmallVec<[ExprId; 8]> = SmallVec::with_capacity(original.len());
    for &child in &original {
        let new_child = rewriter.rewrite_expr(arena, child);
        changed |= new_child != child;
        rewritten.push(new_child);
    }
    changed.then(|| arena.alloc_expr_list(rewritten))
}

fn walk_catch_list<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    arena: &mut ExprArena,
    range: CatchRange,
) -> Option<CatchRange> {
    let original: SmallVec<[CatchHandler; 2]> = arena.catches(range).iter().copied().collect();
    let mut changed = false;
    let mut rewritten: SmallVec<[CatchHandler; 2]> = SmallVec::with_capacity(original.len());
    for &handler in &original {
        let new_handler = rewriter.rewrite_catch(arena, handler);
        changed |= new_handler != handler;
        rewritten.push(new_handler);
    }
    changed.then(|| arena.alloc_catches(rewritten))
}

#[cfg(test)]
mod tests;
