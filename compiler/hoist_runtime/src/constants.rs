//! Constant pool for runtime values embedded in fragments.

use hoist_ir::ConstantId;

use crate::Value;

/// Pool of constant values, indexed by [`ConstantId`].
///
/// Unlike a literal pool this does not deduplicate: a cell constant is an
/// identity, and two equal-looking lists can be backed by different cells.
#[derive(Clone, Debug, Default)]
pub struct ConstantPool {
    values: Vec<Value>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, returning its ID.
    ///
    /// # Panics
    /// Panics if the pool outgrows the `u32` index space.
    pub fn push(&mut self, value: Value) -> ConstantId {
        let index = u32::try_from(self.values.len())
            .unwrap_or_else(|_| panic!("too many constants: {} exceeds u32::MAX", self.values.len()));
        self.values.push(value);
        ConstantId::new(index)
    }

    #[inline]
    pub fn get(&self, id: ConstantId) -> &Value {
        &self.values[id.index()]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
