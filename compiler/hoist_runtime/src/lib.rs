//! Runtime support for quoted fragments.
//!
//! Everything a rewritten fragment touches when it is finally evaluated
//! lives here:
//!
//! - [`Value`] and [`StrongBox`], the shared mutable cell captured variables
//!   live in
//! - [`HoistedLocals`] / [`Storage`], the two parallel scope chains (frame
//!   metadata vs. per-activation cells) that quoting resolves against
//! - [`RuntimeVariables`] and its list types, including the merged list that
//!   [`merge_runtime_variables`] builds from inside a quoted fragment
//! - [`ConstantPool`], where quoting parks the cells it embeds
//!
//! # Thread Safety
//!
//! All values are `Send + Sync`. Cells use `parking_lot::Mutex`; the list
//! types add no locking of their own, so a caller that needs several
//! positions updated atomically must synchronize externally.

mod cell;
mod constants;
mod errors;
mod hoisted;
mod value;
mod variables;

pub use cell::StrongBox;
pub use constants::ConstantPool;
pub use errors::RuntimeError;
pub use hoisted::{HoistedLocals, Storage};
pub use value::{Builtin, FunctionValue, Value};
pub use variables::{
    decode_route, empty_runtime_variables, encode_route, merge_runtime_variables, BoxedVariables,
    MergedRuntimeVariables, Route, RuntimeVariables, VariableList,
};
