#![deny(clippy::arithmetic_side_effects)]
//! Hoist Eval - tree-walking evaluator for hoist fragments.
//!
//! Runs fragments before or after quoting. A quoted fragment reads and writes
//! captured variables through `Constant(cell).Value` and materializes mixed
//! variable lists through the `merge_runtime_variables` builtin; both are
//! ordinary expressions here.
//!
//! # Architecture
//!
//! - [`Environment`]: scope stack mapping variables to their cells
//! - [`Interpreter`]: the evaluator proper, bounded by [`InterpreterConfig`]
//! - [`evaluate_binary`]: integer arithmetic and comparisons
//! - [`EvalError`]: everything evaluation can fail with, including uncaught
//!   throws

mod config;
mod environment;
pub mod errors;
pub mod interpreter;
mod operators;

use std::sync::Once;

use hoist_ir::{ExprArena, ExprId};
use hoist_runtime::ConstantPool;

pub use config::InterpreterConfig;
pub use environment::Environment;
pub use errors::{EvalError, EvalResult};
pub use interpreter::Interpreter;
pub use operators::evaluate_binary;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debugging.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call repeatedly; only the
/// first call installs a subscriber.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Evaluate `root` in an empty environment with the default configuration.
pub fn evaluate(arena: &ExprArena, constants: &ConstantPool, root: ExprId) -> EvalResult {
    Interpreter::new(arena, constants).eval(root)
}
