//! Shadowed-variable tracking.
//!
//! While quoting walks into a lambda, a block with locals, or a catch
//! handler with a bound variable, the variables that node declares hide any
//! hoisted variable of the same identity. [`ShadowStack`] records those
//! declarations, innermost scope last.

use hoist_ir::VarId;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Stack of variable sets, one per scope currently being visited.
#[derive(Debug, Default)]
pub struct ShadowStack {
    scopes: SmallVec<[FxHashSet<VarId>; 4]>,
}

impl ShadowStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a scope declaring exactly `vars`.
    pub fn enter_scope(&mut self, vars: &[VarId]) {
        self.scopes.push(vars.iter().copied().collect());
    }

    /// Pop the innermost scope.
    ///
    /// # Panics
    /// Panics if no scope is open; enter/exit must pair up.
    pub fn exit_scope(&mut self) {
        assert!(
            self.scopes.pop().is_some(),
            "exit_scope called with no open scope"
        );
    }

    /// Returns `true` if any open scope declares `var`.
    ///
    /// Searches innermost first and stops at the first hit.
    pub fn is_shadowed(&self, var: VarId) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(&var))
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
