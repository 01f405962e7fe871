//! Stack growth for deeply nested trees.
//!
//! Rewriting and evaluation both recurse once per tree level. Wrapping each
//! level in [`ensure_sufficient_stack`] keeps 100k-deep fragments from
//! overflowing the native stack.

/// Run `f`, first growing the stack by 1MB if less than 100KB remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 100 * 1024;
    const GROWTH: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
