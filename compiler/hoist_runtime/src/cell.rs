//! Storage cells.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::Value;

/// A shared, mutable box holding one [`Value`].
///
/// Cloning a `StrongBox` clones the handle, not the value: every clone reads
/// and writes the same slot. Identity is the allocation, compared with
/// [`StrongBox::ptr_eq`].
#[derive(Clone)]
pub struct StrongBox(Arc<Mutex<Value>>);

impl StrongBox {
    pub fn new(value: Value) -> Self {
        StrongBox(Arc::new(Mutex::new(value)))
    }

    /// Current contents (cloned out of the cell).
    pub fn get(&self) -> Value {
        self.0.lock().clone()
    }

    pub fn set(&self, value: Value) {
        *self.0.lock() = value;
    }

    /// Returns `true` if both handles refer to the same cell.
    #[inline]
    pub fn ptr_eq(&self, other: &StrongBox) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for StrongBox {
    fn default() -> Self {
        StrongBox::new(Value::Unit)
    }
}

impl fmt::Debug for StrongBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // try_lock: a cell that (indirectly) contains itself is already
        // locked further up this formatting call.
        match self.0.try_lock() {
            Some(value) => f.debug_tuple("StrongBox").field(&*value).finish(),
            None => f.write_str("StrongBox(<locked>)"),
        }
    }
}
