//! Expression arena.
//!
//! [`ExprArena`] uses struct-of-arrays layout (parallel `kinds` and `spans`
//! arrays indexed by [`ExprId`]) plus flat side tables for child lists.
//! Nodes are append-only: rewriting passes allocate replacements next to the
//! originals, and the originals stay valid for as long as the arena lives.

use rustc_hash::FxHashSet;

use crate::{
    BinaryOp, CatchHandler, CatchRange, ConstantId, ExprId, ExprKind, ExprRange, Member, Span,
    VarId, VarRange,
};

/// Convert a table length to a `u32` index.
///
/// # Panics
/// Panics if the table has outgrown the `u32` index space.
#[inline]
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}

/// Convert a list length to a `u16` range length.
///
/// # Panics
/// Panics if the list is longer than a range can describe.
#[inline]
pub(crate) fn to_u16(len: usize, what: &str) -> u16 {
    u16::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u16::MAX"))
}

/// Arena for expressions and the variables they reference.
///
/// # Index Spaces
///
/// - `kinds`/`spans`: parallel arrays indexed by [`ExprId`]
/// - `expr_lists`: flat `Vec<ExprId>` indexed by [`ExprRange`]
/// - `var_lists`: flat `Vec<VarId>` indexed by [`VarRange`]
/// - `catches`: indexed by [`CatchRange`]
/// - `var_names`: indexed by [`VarId`]
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    kinds: Vec<ExprKind>,
    spans: Vec<Span>,
    expr_lists: Vec<ExprId>,
    var_lists: Vec<VarId>,
    catches: Vec<CatchHandler>,
    /// Declared variable names, for diagnostics. Identity is the index.
    var_names: Vec<Box<str>>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node, returning its ID.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId::new(to_u32(self.kinds.len(), "expressions"));
        self.kinds.push(kind);
        self.spans.push(span);
        id
    }

    /// Get the expression kind for a node.
    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.kinds[id.index()]
    }

    /// Get the source span for a node.
    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.spans[id.index()]
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if no nodes have been allocated.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    // Variables

    /// Declare a new variable. Every call yields a distinct identity, even
    /// for a name that was declared before.
    pub fn declare_var(&mut self, name: &str) -> VarId {
        let id = VarId::new(to_u32(self.var_names.len(), "variables"));
        self.var_names.push(name.into());
        id
    }

    /// Name a variable was declared with.
    #[inline]
    pub fn var_name(&self, var: VarId) -> &str {
        &self.var_names[var.index()]
    }

    /// Number of declared variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    // Side tables

    /// Store a list of expressions, returning its range.
    pub fn alloc_expr_list(&mut self, exprs: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expression list entries");
        self.expr_lists.extend(exprs);
        let len = self.expr_lists.len() - start as usize;
        ExprRange::new(start, to_u16(len, "list elements"))
    }

    #[inline]
    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.bounds()]
    }

    /// Store an ordered list of variables, returning its range.
    ///
    /// Duplicates are kept; use [`alloc_var_set`](Self::alloc_var_set) for
    /// declarations.
    pub fn alloc_var_list(&mut self, vars: impl IntoIterator<Item = VarId>) -> VarRange {
        let start = to_u32(self.var_lists.len(), "variable list entries");
        self.var_lists.extend(vars);
        let len = self.var_lists.len() - start as usize;
        VarRange::new(start, to_u16(len, "variables"))
    }

    /// Store an ordered, de-duplicated set of variables. The first
    /// occurrence of each variable keeps its position.
    pub fn alloc_var_set(&mut self, vars: impl IntoIterator<Item = VarId>) -> VarRange {
        let mut seen = FxHashSet::default();
        let unique: Vec<VarId> = vars.into_iter().filter(|var| seen.insert(*var)).collect();
        self.alloc_var_list(unique)
    }

    #[inline]
    pub fn var_list(&self, range: VarRange) -> &[VarId] {
        &self.var_lists[range.bounds()]
    }

    pub fn alloc_catches(&mut self, handlers: impl IntoIterator<Item = CatchHandler>) -> CatchRange {
        let start = to_u32(self.catches.len(), "catch handlers");
        self.catches.extend(handlers);
        let len = self.catches.len() - start as usize;
        CatchRange::new(start, to_u16(len, "catch handlers"))
    }

    #[inline]
    pub fn catches(&self, range: CatchRange) -> &[CatchHandler] {
        &self.catches[range.bounds()]
    }

    /// Total entries in the `expr_lists` table (for bounds validation).
    pub fn expr_list_len(&self) -> usize {
        self.expr_lists.len()
    }

    /// Total entries in the `var_lists` table (for bounds validation).
    pub fn var_list_len(&self) -> usize {
        self.var_lists.len()
    }

    /// Total entries in the `catches` table (for bounds validation).
    pub fn catches_len(&self) -> usize {
        self.catches.len()
    }

    // Construction helpers. All use `Span::DUMMY`; call `alloc` directly to
    // attach a real span.

    pub fn unit(&mut self) -> ExprId {
        self.alloc(ExprKind::Unit, Span::DUMMY)
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.alloc(ExprKind::Int(value), Span::DUMMY)
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.alloc(ExprKind::Bool(value), Span::DUMMY)
    }

    pub fn var(&mut self, var: VarId) -> ExprId {
        self.alloc(ExprKind::Var(var), Span::DUMMY)
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.alloc(ExprKind::Binary { op, left, right }, Span::DUMMY)
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.alloc(ExprKind::Assign { target, value }, Span::DUMMY)
    }

    pub fn if_else(&mut self, cond: ExprId, then_branch: ExprId, else_branch: ExprId) -> ExprId {
        self.alloc(
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            },
            Span::DUMMY,
        )
    }

    /// Block with the given locals (de-duplicated) and body expressions.
    pub fn block(&mut self, locals: &[VarId], body: &[ExprId]) -> ExprId {
        let locals = self.alloc_var_set(locals.iter().copied());
        let body = self.alloc_expr_list(body.iter().copied());
        self.alloc(ExprKind::Block { locals, body }, Span::DUMMY)
    }

    pub fn lambda(&mut self, params: &[VarId], body: ExprId) -> ExprId {
        let params = self.alloc_var_list(params.iter().copied());
        self.alloc(
            ExprKind::Lambda {
                params,
                body,
                name: None,
            },
            Span::DUMMY,
        )
    }

    pub fn call(&mut self, callee: ExprId, args: &[ExprId]) -> ExprId {
        let args = self.alloc_expr_list(args.iter().copied());
        self.alloc(ExprKind::Call { callee, args }, Span::DUMMY)
    }

    pub fn try_catch(&mut self, body: ExprId, handlers: &[CatchHandler]) -> ExprId {
        let handlers = self.alloc_catches(handlers.iter().copied());
        self.alloc(ExprKind::Try { body, handlers }, Span::DUMMY)
    }

    pub fn throw(&mut self, value: ExprId) -> ExprId {
        self.alloc(ExprKind::Throw(value), Span::DUMMY)
    }

    pub fn constant(&mut self, id: ConstantId) -> ExprId {
        self.alloc(ExprKind::Constant(id), Span::DUMMY)
    }

    /// `receiver.Value`
    pub fn cell_value(&mut self, receiver: ExprId) -> ExprId {
        self.alloc(
            ExprKind::Field {
                receiver,
                member: Member::Value,
            },
            Span::DUMMY,
        )
    }

    pub fn runtime_variables(&mut self, vars: &[VarId]) -> ExprId {
        let vars = self.alloc_var_list(vars.iter().copied());
        self.alloc(ExprKind::RuntimeVariables(vars), Span::DUMMY)
    }
}
