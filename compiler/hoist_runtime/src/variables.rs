//! Runtime variable lists.
//!
//! A [`RuntimeVariables`] is a fixed-length, index-addressable view of a set
//! of variables that reads and writes the variables' own cells. Two shapes
//! exist:
//!
//! - [`BoxedVariables`]: one cell per position.
//! - [`MergedRuntimeVariables`]: two lists behind one index space, stitched
//!   together by a routing table. Quoting emits a call to
//!   [`merge_runtime_variables`] when a materialized list mixes cells it
//!   resolved itself with variables local to the quoted fragment.

use std::fmt;
use std::sync::Arc;

use crate::{RuntimeError, StrongBox, Value};

/// Addressable, writable list of variables.
///
/// Indices must be in `0..count()`; anything else is
/// [`RuntimeError::IndexOutOfRange`].
pub trait RuntimeVariables: fmt::Debug + Send + Sync {
    fn count(&self) -> usize;

    fn get(&self, index: usize) -> Result<Value, RuntimeError>;

    fn set(&self, index: usize, value: Value) -> Result<(), RuntimeError>;
}

/// Shared handle to any runtime variable list.
pub type VariableList = Arc<dyn RuntimeVariables>;

/// A list with no variables.
pub fn empty_runtime_variables() -> VariableList {
    Arc::new(BoxedVariables::new(Vec::new()))
}

/// Runtime variables backed directly by cells.
#[derive(Debug)]
pub struct BoxedVariables {
    boxes: Box<[StrongBox]>,
}

impl BoxedVariables {
    pub fn new(boxes: Vec<StrongBox>) -> Self {
        BoxedVariables {
            boxes: boxes.into_boxed_slice(),
        }
    }

    pub fn boxes(&self) -> &[StrongBox] {
        &self.boxes
    }

    fn cell(&self, index: usize) -> Result<&StrongBox, RuntimeError> {
        self.boxes
            .get(index)
            .ok_or_else(|| RuntimeError::index_out_of_range(index, self.boxes.len()))
    }
}

impl RuntimeVariables for BoxedVariables {
    fn count(&self) -> usize {
        self.boxes.len()
    }

    fn get(&self, index: usize) -> Result<Value, RuntimeError> {
        Ok(self.cell(index)?.get())
    }

    fn set(&self, index: usize, value: Value) -> Result<(), RuntimeError> {
        self.cell(index)?.set(value);
        Ok(())
    }
}

/// Decoded routing-table entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Route {
    /// Position in the first list (encoded as the index itself).
    First(usize),
    /// Position in the second list (encoded as `-1 - index`).
    Second(usize),
}

/// Encode a route as a routing-table integer.
///
/// # Panics
/// Panics if the index does not fit in an `i64`.
pub fn encode_route(route: Route) -> i64 {
    let to_i64 = |index: usize| {
        i64::try_from(index).unwrap_or_else(|_| panic!("route index {index} exceeds i64::MAX"))
    };
    match route {
        Route::First(index) => to_i64(index),
        Route::Second(index) => -1 - to_i64(index),
    }
}

/// Decode a routing-table integer.
///
/// `-1 - raw` cannot overflow for any negative `raw`, and the result is
/// non-negative, so the conversions below never saturate on 64-bit targets.
pub fn decode_route(raw: i64) -> Route {
    if raw >= 0 {
        Route::First(usize::try_from(raw).unwrap_or(usize::MAX))
    } else {
        Route::Second(usize::try_from(-1 - raw).unwrap_or(usize::MAX))
    }
}

/// Two runtime variable lists behind one index space.
///
/// Position `i` reads and writes `first[r]` when `routing[i] = r >= 0`, and
/// `second[-1 - r]` otherwise. The routing table is fixed at construction.
#[derive(Debug)]
pub struct MergedRuntimeVariables {
    first: VariableList,
    second: VariableList,
    routing: Arc<[i64]>,
}

impl MergedRuntimeVariables {
    pub fn new(first: VariableList, second: VariableList, routing: Arc<[i64]>) -> Self {
        MergedRuntimeVariables {
            first,
            second,
            routing,
        }
    }

    pub fn routing(&self) -> &[i64] {
        &self.routing
    }

    fn route(&self, index: usize) -> Result<(&dyn RuntimeVariables, usize), RuntimeError> {
        let raw = *self
            .routing
            .get(index)
            .ok_or_else(|| RuntimeError::index_out_of_range(index, self.routing.len()))?;
        Ok(match decode_route(raw) {
            Route::First(at) => (&*self.first, at),
            Route::Second(at) => (&*self.second, at),
        })
    }
}

impl RuntimeVariables for MergedRuntimeVariables {
    fn count(&self) -> usize {
        self.routing.len()
    }

    fn get(&self, index: usize) -> Result<Value, RuntimeError> {
        let (list, at) = self.route(index)?;
        list.get(at)
    }

    fn set(&self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let (list, at) = self.route(index)?;
        list.set(at, value)
    }
}

/// Merge two variable lists into one addressable list.
///
/// Called from inside quoted fragments at evaluation time, with `first` the
/// fragment's own (unrewritten) variables and `second` the cells resolved
/// during quoting.
pub fn merge_runtime_variables(
    first: VariableList,
    second: VariableList,
    routing: Arc<[i64]>,
) -> VariableList {
    Arc::new(MergedRuntimeVariables::new(first, second, routing))
}
