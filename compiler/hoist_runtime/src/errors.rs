//! Runtime addressing errors.

use thiserror::Error;

/// Misuse of a runtime variable list's addressing contract.
///
/// This is the only recoverable error the runtime layer reports. Failures to
/// resolve a captured variable are invariant breaches, not `RuntimeError`s.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("index {index} out of range for runtime variables of length {count}")]
    IndexOutOfRange { index: usize, count: usize },
}

impl RuntimeError {
    #[cold]
    pub fn index_out_of_range(index: usize, count: usize) -> Self {
        RuntimeError::IndexOutOfRange { index, count }
    }
}
