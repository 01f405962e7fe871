//! Environment for variable scoping in the evaluator.
//!
//! Every binding is a [`StrongBox`], never a bare value. Closures capture the
//! cells themselves and runtime variable lists are built over them, so all
//! three observe the same writes.

use hoist_ir::VarId;
use hoist_runtime::StrongBox;
use rustc_hash::FxHashMap;

/// Stack of scopes, innermost last. The bottom scope is never popped.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<FxHashMap<VarId, StrongBox>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Environment for a function body: the captured cells form the bottom
    /// scope.
    pub fn from_captures(captures: &FxHashMap<VarId, StrongBox>) -> Self {
        Environment {
            scopes: vec![captures.clone()],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `var` to `cell` in the innermost scope.
    #[inline]
    pub fn define(&mut self, var: VarId, cell: StrongBox) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(var, cell);
        }
    }

    /// Innermost cell bound to `var`.
    #[inline]
    pub fn lookup(&self, var: VarId) -> Option<&StrongBox> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&var))
    }

    /// Every visible binding, innermost first, for a closure to capture.
    pub fn capture(&self) -> FxHashMap<VarId, StrongBox> {
        let mut captures = FxHashMap::default();
        for scope in self.scopes.iter().rev() {
            for (&var, cell) in scope {
                captures.entry(var).or_insert_with(|| cell.clone());
            }
        }
        captures
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
