//! The quoting rewriter.
//!
//! [`Quoter`] walks a fragment with the generic [`Rewriter`] traversal and
//! intervenes at four kinds of node:
//!
//! - **Scope nodes** (lambda, block with locals, catch with a variable): the
//!   declared variables are pushed on the [`ShadowStack`] for the duration of
//!   the node's children.
//! - **`Var`**: a shadowed variable is left alone; otherwise it is resolved
//!   through the hoisted scope chain and replaced by `Constant(cell).Value`.
//! - **`RuntimeVariables`**: split into variables still local to the fragment
//!   and cells resolved now, then stitched back together (see
//!   [`Quoter::rewrite_runtime_variables`]).
//!
//! Everything else goes through [`walk_expr`], which keeps unchanged
//! subtrees by identity.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use hoist_ir::{
    ensure_sufficient_stack, walk_catch, walk_expr, CatchHandler, ConstantId, ExprArena, ExprId,
    ExprKind, Member, Rewriter, VarId, VarRange,
};
use hoist_runtime::{
    encode_route, BoxedVariables, Builtin, ConstantPool, HoistedLocals, Route, Storage, StrongBox,
    Value, VariableList,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ShadowStack;

/// Outcome of looking up a variable during quoting.
#[derive(Debug)]
pub(crate) enum Resolution {
    /// Declared inside the fragment; stays a plain variable reference.
    Shadowed,
    /// Hoisted by an enclosing frame; lives in this cell.
    Cell(StrongBox),
}

pub(crate) struct Quoter<'a> {
    constants: &'a mut ConstantPool,
    scope: &'a HoistedLocals,
    storage: &'a Storage,
    shadowed: ShadowStack,
    /// One constant per captured variable, shared by all its references.
    cell_constants: FxHashMap<VarId, ConstantId>,
    merge_callee: Option<ConstantId>,
    rewritten: usize,
}

impl<'a> Quoter<'a> {
    pub(crate) fn new(
        constants: &'a mut ConstantPool,
        scope: &'a HoistedLocals,
        storage: &'a Storage,
    ) -> Self {
        Quoter {
            constants,
            scope,
            storage,
            shadowed: ShadowStack::new(),
            cell_constants: FxHashMap::default(),
            merge_callee: None,
            rewritten: 0,
        }
    }

    /// Number of variable references replaced so far.
    pub(crate) fn rewritten(&self) -> usize {
        self.rewritten
    }

    pub(crate) fn shadow_depth(&self) -> usize {
        self.shadowed.depth()
    }

    /// Shadow `vars` until the returned guard is dropped.
    fn enter_scope(&mut self, vars: &[VarId]) -> ShadowScope<'_, 'a> {
        self.shadowed.enter_scope(vars);
        ShadowScope { quoter: self }
    }

    /// Walk a lambda or block with its declared variables shadowed.
    fn walk_in_scope(&mut self, arena: &mut ExprArena, id: ExprId, declared: VarRange) -> ExprId {
        if declared.is_empty() {
            return walk_expr(self, arena, id);
        }
        let vars: SmallVec<[VarId; 8]> = arena.var_list(declared).iter().copied().collect();
        let mut scope = self.enter_scope(&vars);
        walk_expr(&mut *scope, arena, id)
    }

    /// Resolve `var` against the shadow stack, then the hoisted chain.
    ///
    /// The frame chain and the storage chain are walked in lockstep.
    ///
    /// # Panics
    /// Panics if a non-shadowed variable is not hoisted by any frame. The
    /// binder that produced the fragment guarantees this cannot happen.
    pub(crate) fn resolve(&self, arena: &ExprArena, var: VarId) -> Resolution {
        if self.shadowed.is_shadowed(var) {
            return Resolution::Shadowed;
        }

        let mut frame = self.scope;
        let mut storage = self.storage;
        loop {
            if let Some(slot) = frame.slot_of(var) {
                let Some(cell) = storage.cell(slot) else {
                    invariant_violated(arena, var, &format!("maps to slot {slot}, past the end of its storage"));
                };
                return Resolution::Cell(cell.clone());
            }
            let Some(parent) = frame.parent() else {
                invariant_violated(arena, var, "is not hoisted by any enclosing frame");
            };
            let Some(parent_storage) = storage.parent() else {
                invariant_violated(arena, var, "outlived the storage chain while walking parent frames");
            };
            frame = &**parent;
            storage = &**parent_storage;
        }
    }

    fn cell_constant(&mut self, var: VarId, cell: StrongBox) -> ConstantId {
        *self
            .cell_constants
            .entry(var)
            .or_insert_with(|| self.constants.push(Value::Cell(cell)))
    }

    fn merge_callee(&mut self) -> ConstantId {
        *self
            .merge_callee
            .get_or_insert_with(|| self.constants.push(Value::Builtin(Builtin::MergeRuntimeVariables)))
    }

    /// `x` → `Constant(cell_of_x).Value`, unless `x` is shadowed.
    fn rewrite_var(&mut self, arena: &mut ExprArena, id: ExprId, var: VarId) -> ExprId {
        let Resolution::Cell(cell) = self.resolve(arena, var) else {
            return id;
        };
        let constant = self.cell_constant(var, cell);
        let span = arena.span(id);
        let receiver = arena.alloc(ExprKind::Constant(constant), span);
        self.rewritten += 1;
        tracing::trace!(
            variable = arena.var_name(var),
            constant = constant.raw(),
            "rewrote captured variable"
        );
        arena.alloc(
            ExprKind::Field {
                receiver,
                member: Member::Value,
            },
            span,
        )
    }

    /// Rewrite a `RuntimeVariables` materialization.
    ///
    /// Each listed variable is either *free* (shadowed: still a variable of
    /// the fragment) or *bound* (resolved to a cell now). The routing table
    /// has one entry per original position: `Route::First(k)` for the `k`th
    /// free variable, `Route::Second(k)` for the `k`th bound cell.
    ///
    /// - no bound variables: the node is returned unchanged
    /// - no free variables: a constant list over the bound cells
    /// - otherwise: `merge_runtime_variables(RuntimeVariables(free),
    ///   Constant(bound), Constant(routing))`
    fn rewrite_runtime_variables(&mut self, arena: &mut ExprArena, id: ExprId, range: VarRange) -> ExprId {
        let vars: SmallVec<[VarId; 8]> = arena.var_list(range).iter().copied().collect();
        let mut free: SmallVec<[VarId; 8]> = SmallVec::new();
        let mut bound: Vec<StrongBox> = Vec::new();
        let mut routing: Vec<i64> = Vec::with_capacity(vars.len());

        for &var in &vars {
            match self.resolve(arena, var) {
                Resolution::Shadowed => {
                    routing.push(encode_route(Route::First(free.len())));
                    free.push(var);
                }
                Resolution::Cell(cell) => {
                    routing.push(encode_route(Route::Second(bound.len())));
                    bound.push(cell);
                }
            }
        }

        tracing::debug!(
            total = vars.len(),
            bound = bound.len(),
            free = free.len(),
            "quoting runtime variables"
        );

        if bound.is_empty() {
            return id;
        }
        self.rewritten += bound.len();

        let span = arena.span(id);
        let bound_list: VariableList = Arc::new(BoxedVariables::new(bound));
        let bound_constant = self.constants.push(Value::Variables(bound_list));
        let bound_expr = arena.alloc(ExprKind::Constant(bound_constant), span);
        if free.is_empty() {
            return bound_expr;
        }

        let free_vars = arena.alloc_var_list(free);
        let free_expr = arena.alloc(ExprKind::RuntimeVariables(free_vars), span);
        let routing_constant = self.constants.push(Value::Routing(Arc::from(routing)));
        let routing_expr = arena.alloc(ExprKind::Constant(routing_constant), span);
        let callee_constant = self.merge_callee();
        let callee = arena.alloc(ExprKind::Constant(callee_constant), span);
        let args = arena.alloc_expr_list([free_expr, bound_expr, routing_expr]);
        arena.alloc(ExprKind::Call { callee, args }, span)
    }
}

impl Rewriter for Quoter<'_> {
    fn rewrite_expr(&mut self, arena: &mut ExprArena, id: ExprId) -> ExprId {
        ensure_sufficient_stack(|| match *arena.kind(id) {
            ExprKind::Var(var) => self.rewrite_var(arena, id, var),
            ExprKind::RuntimeVariables(vars) => self.rewrite_runtime_variables(arena, id, vars),
            ExprKind::Lambda { params, .. } => self.walk_in_scope(arena, id, params),
            ExprKind::Block { locals, .. } => self.walk_in_scope(arena, id, locals),
            _ => walk_expr(self, arena, id),
        })
    }

    fn rewrite_catch(&mut self, arena: &mut ExprArena, handler: CatchHandler) -> CatchHandler {
        match handler.variable {
            Some(var) => {
                let mut scope = self.enter_scope(&[var]);
                walk_catch(&mut *scope, arena, handler)
            }
            None => walk_catch(self, arena, handler),
        }
    }
}

/// An open shadow scope. Dropping it pops the scope, on every exit path.
struct ShadowScope<'q, 'a> {
    quoter: &'q mut Quoter<'a>,
}

impl<'a> Deref for ShadowScope<'_, 'a> {
    type Target = Quoter<'a>;

    fn deref(&self) -> &Quoter<'a> {
        self.quoter
    }
}

impl<'a> DerefMut for ShadowScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Quoter<'a> {
        self.quoter
    }
}

impl Drop for ShadowScope<'_, '_> {
    fn drop(&mut self) {
        self.quoter.shadowed.exit_scope();
    }
}

/// Abort quoting: a free variable has no cell anywhere in the chain.
#[cold]
#[track_caller]
fn invariant_violated(arena: &ExprArena, var: VarId, detail: &str) -> ! {
    let name = arena.var_name(var);
    tracing::error!(variable = name, id = var.raw(), detail, "unresolvable captured variable");
    panic!("internal invariant violated: captured variable `{name}` ({var:?}) {detail}");
}
