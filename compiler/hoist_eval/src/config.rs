//! Evaluator configuration.

/// Limits applied while evaluating a fragment.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InterpreterConfig {
    /// Maximum number of nested function calls before evaluation fails with
    /// [`EvalError::StackOverflow`](crate::EvalError::StackOverflow).
    pub max_call_depth: usize,
}

impl InterpreterConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

    #[must_use]
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
