//! Debug-mode validation of quoted fragments.
//!
//! Walks every node reachable from a root and asserts that:
//! - All `ExprId` references resolve to allocated nodes
//! - All ranges lie within their side tables
//! - All `ConstantId` references resolve to pool entries
//! - All `VarId` references name declared variables
//!
//! `quote` calls this after rewriting in debug builds, so a bad index is
//! caught where it was produced rather than when the fragment is evaluated.

use hoist_ir::{CatchRange, ExprArena, ExprId, ExprKind, ExprRange, VarId, VarRange};
use hoist_runtime::ConstantPool;

/// Validate every node reachable from `root`.
///
/// # Panics
/// Panics with a descriptive message on the first broken reference.
pub fn validate(arena: &ExprArena, constants: &ConstantPool, root: ExprId) {
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        assert!(
            id.index() < arena.len(),
            "{id:?} out of bounds (arena has {} nodes)",
            arena.len()
        );
        match *arena.kind(id) {
            ExprKind::Unit | ExprKind::Int(_) | ExprKind::Bool(_) => {}
            ExprKind::Var(var) => check_var(arena, id, var),
            ExprKind::Constant(constant) => assert!(
                constant.index() < constants.len(),
                "{id:?} references {constant:?} but pool has {} entries",
                constants.len()
            ),
            ExprKind::RuntimeVariables(vars) => check_vars(arena, id, vars),
            ExprKind::Binary { left, right, .. } => pending.extend([left, right]),
            ExprKind::Assign { target, value } => pending.extend([target, value]),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => pending.extend([cond, then_branch, else_branch]),
            ExprKind::Block { locals, body } => {
                check_vars(arena, id, locals);
                check_exprs(arena, id, body);
                pending.extend_from_slice(arena.expr_list(body));
            }
            ExprKind::Lambda { params, body, .. } => {
                check_vars(arena, id, params);
                pending.push(body);
            }
            ExprKind::Call { callee, args } => {
                check_exprs(arena, id, args);
                pending.push(callee);
                pending.extend_from_slice(arena.expr_list(args));
            }
            ExprKind::Try { body, handlers } => {
                check_catches(arena, id, handlers);
                pending.push(body);
                for handler in arena.catches(handlers) {
                    if let Some(var) = handler.variable {
                        check_var(arena, id, var);
                    }
                    pending.push(handler.body);
                    pending.extend(handler.filter);
                }
            }
            ExprKind::Throw(value) => pending.push(value),
            ExprKind::Field { receiver, .. } => pending.push(receiver),
        }
    }
}

fn check_var(arena: &ExprArena, id: ExprId, var: VarId) {
    assert!(
        var.index() < arena.var_count(),
        "{id:?} references undeclared {var:?} ({} declared)",
        arena.var_count()
    );
}

fn check_vars(arena: &ExprArena, id: ExprId, range: VarRange) {
    assert!(
        range.start as usize + range.len() <= arena.var_list_len(),
        "{id:?} has {range:?} past the end of var_lists ({})",
        arena.var_list_len()
    );
    for &var in arena.var_list(range) {
        check_var(arena, id, var);
    }
}

fn check_exprs(arena: &ExprArena, id: ExprId, range: ExprRange) {
    assert!(
        range.start as usize + range.len() <= arena.expr_list_len(),
        "{id:?} has {range:?} past the end of expr_lists ({})",
        arena.expr_list_len()
    );
}

fn check_catches(arena: &ExprArena, id: ExprId, range: CatchRange) {
    assert!(
        range.start as usize + range.len() <= arena.catches_len(),
        "{id:?} has {range:?} past the end of catches ({})",
        arena.catches_len()
    );
}
