//! Expression quoting.
//!
//! Quoting turns a fragment that closes over variables of already-running
//! scopes into a fragment that can be evaluated later, on its own, while
//! still reading and writing those variables. Every reference to a captured
//! variable becomes an access to the cell the variable is hoisted into.
//!
//! # Pipeline Position
//!
//! ```text
//! Bind → Hoist → **Quote** → Evaluate (hoist_eval) / Compile
//! ```
//!
//! # What Happens During Quoting
//!
//! 1. **Shadowing**: lambdas, blocks with locals, and catch handlers with a
//!    bound variable hide those variables for their subtree.
//! 2. **Resolution**: every other variable is looked up frame by frame along
//!    the hoisted chain ([`HoistedLocals`] + [`Storage`]).
//! 3. **Substitution**: `x` becomes `Constant(cell).Value`;
//!    `RuntimeVariables(..)` becomes a constant list or a call to
//!    [`merge_runtime_variables`].
//!
//! Input nodes are never modified. Rewritten nodes are appended to the same
//! arena and the result shares every unchanged subtree with the input. A
//! fragment with nothing to rewrite comes back as the same `ExprId`.

mod quoter;
mod shadow;
mod validate;

use hoist_ir::{ExprArena, ExprId, Rewriter};
use hoist_runtime::{ConstantPool, HoistedLocals, Storage};

pub use hoist_runtime::merge_runtime_variables;
pub use shadow::ShadowStack;
pub use validate::validate;

use quoter::Quoter;

/// Quote `root` against the hoisted chain starting at `scope` / `storage`.
///
/// New nodes go into `arena`, new constants (cells, variable lists, routing
/// tables) into `constants`. Returns the rewritten root, which is `root`
/// itself when no captured variable was referenced.
///
/// # Panics
/// Panics with an `internal invariant violated` message if a variable that is
/// neither declared inside the fragment nor hoisted by any frame of the
/// chain is referenced. Binding analysis upstream rules this out.
pub fn quote(
    arena: &mut ExprArena,
    constants: &mut ConstantPool,
    root: ExprId,
    scope: &HoistedLocals,
    storage: &Storage,
) -> ExprId {
    tracing::debug!(root = root.raw(), hoisted = scope.len(), "quoting fragment");

    let (result, rewritten) = {
        let mut quoter = Quoter::new(constants, scope, storage);
        let result = quoter.rewrite_expr(arena, root);
        debug_assert_eq!(quoter.shadow_depth(), 0, "shadow scopes left open");
        (result, quoter.rewritten())
    };

    tracing::debug!(rewritten, unchanged = (result == root), "quoted fragment");

    #[cfg(debug_assertions)]
    validate(arena, constants, result);

    result
}
