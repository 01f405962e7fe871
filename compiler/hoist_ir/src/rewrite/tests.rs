use super::*;
use crate::{BinaryOp, Span, VarId};
use pretty_assertions::assert_eq;

/// Rewriter that changes nothing.
struct Identity;

impl Rewriter for Identity {}

/// Replaces every `Int(n)` with `Int(n * 10)`.
struct ScaleInts;

impl Rewriter for ScaleInts {
    fn rewrite_expr(&mut self, arena: &mut ExprArena, id: ExprId) -> ExprId {
        match *arena.kind(id) {
            ExprKind::Int(n) => {
                let span = arena.span(id);
                arena.alloc(ExprKind::Int(n * 10), span)
            }
            _ => walk_expr(self, arena, id),
        }
    }
}

/// Replaces references to one variable with `Unit`.
struct EraseVar(VarId);

impl Rewriter for EraseVar {
    fn rewrite_expr(&mut self, arena: &mut ExprArena, id: ExprId) -> ExprId {
        match *arena.kind(id) {
            ExprKind::Var(var) if var == self.0 => arena.unit(),
            _ => walk_expr(self, arena, id),
        }
    }
}

fn sample_tree(arena: &mut ExprArena) -> (ExprId, VarId) {
    let x = arena.declare_var("x");
    let e = arena.declare_var("e");
    let one = arena.int(1);
    let x_ref = arena.var(x);
    let sum = arena.binary(BinaryOp::Add, x_ref, one);
    let lambda = arena.lambda(&[x], sum);
    let handler_body = arena.var(e);
    let filter = arena.bool(true);
    let thrown = arena.throw(lambda);
    let guarded = arena.try_catch(
        thrown,
        &[CatchHandler {
            variable: Some(e),
            body: handler_body,
            filter: Some(filter),
        }],
    );
    let root = arena.block(&[], &[guarded]);
    (root, x)
}

#[test]
fn identity_rewrite_returns_same_id_and_allocates_nothing() {
    let mut arena = ExprArena::new();
    let (root, _) = sample_tree(&mut arena);
    let before = arena.len();
    let result = Identity.rewrite_expr(&mut arena, root);
    assert_eq!(result, root);
    assert_eq!(arena.len(), before);
}

#[test]
fn changed_leaf_rebuilds_only_its_ancestors() {
    let mut arena = ExprArena::new();
    let left = arena.int(1);
    let unit = arena.unit();
    let right = arena.block(&[], &[unit]);
    let root = arena.binary(BinaryOp::Add, left, right);

    let result = ScaleInts.rewrite_expr(&mut arena, root);
    assert_ne!(result, root);
    let ExprKind::Binary {
        left: new_left,
        right: new_right,
        op,
    } = *arena.kind(result)
    else {
        panic!("expected Binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(*arena.kind(new_left), ExprKind::Int(10));
    // The untouched sibling subtree is shared, not copied.
    assert_eq!(new_right, right);
}

#[test]
fn rebuilt_node_inherits_span() {
    let mut arena = ExprArena::new();
    let value = arena.int(3);
    let root = arena.alloc(ExprKind::Throw(value), Span::new(2, 9));
    let result = ScaleInts.rewrite_expr(&mut arena, root);
    assert_ne!(result, root);
    assert_eq!(arena.span(result), Span::new(2, 9));
}

#[test]
fn rewrite_reaches_catch_bodies_and_filters() {
    let mut arena = ExprArena::new();
    let body = arena.unit();
    let handler_body = arena.int(1);
    let filter = arena.int(2);
    let root = arena.try_catch(
        body,
        &[CatchHandler {
            variable: None,
            body: handler_body,
            filter: Some(filter),
        }],
    );

    let result = ScaleInts.rewrite_expr(&mut arena, root);
    let ExprKind::Try { body: new_body, handlers } = *arena.kind(result) else {
        panic!("expected Try");
    };
    assert_eq!(new_body, body);
    let handler = arena.catches(handlers)[0];
    assert_eq!(*arena.kind(handler.body), ExprKind::Int(10));
    assert_eq!(handler.filter.map(|f| *arena.kind(f)), Some(ExprKind::Int(20)));
}

#[test]
fn lambda_keeps_parameters_when_body_changes() {
    let mut arena = ExprArena::new();
    let (root, x) = sample_tree(&mut arena);
    let result = EraseVar(x).rewrite_expr(&mut arena, root);
    assert_ne!(result, root);

    let ExprKind::Block { body, .. } = *arena.kind(result) else {
        panic!("expected Block");
    };
    let guarded = arena.expr_list(body)[0];
    let ExprKind::Try { body: thrown, .. } = *arena.kind(guarded) else {
        panic!("expected Try");
    };
    let ExprKind::Throw(lambda) = *arena.kind(thrown) else {
        panic!("expected Throw");
    };
    let ExprKind::Lambda { params, body, .. } = *arena.kind(lambda) else {
        panic!("expected Lambda");
    };
    assert_eq!(arena.var_list(params), &[x]);
    let ExprKind::Binary { left, .. } = *arena.kind(body) else {
        panic!("expected Binary");
    };
    assert_eq!(*arena.kind(left), ExprKind::Unit);
}
