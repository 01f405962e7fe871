//! Hoisted scope chains.
//!
//! A scope that has variables captured by nested code keeps them in cells
//! rather than plain locals. Two chains describe those cells:
//!
//! - [`HoistedLocals`]: frame *metadata*, shared and immutable. Which
//!   variables the frame hoists and at which slot.
//! - [`Storage`]: frame *instances*, one per activation. The cells
//!   themselves.
//!
//! The chains are walked in lockstep: frame `n` of the metadata chain
//! describes frame `n` of the storage chain.

use std::sync::Arc;

use hoist_ir::VarId;
use rustc_hash::FxHashMap;

use crate::{StrongBox, Value};

/// Metadata for one hoisted frame.
#[derive(Debug)]
pub struct HoistedLocals {
    parent: Option<Arc<HoistedLocals>>,
    variables: Box<[VarId]>,
    indexes: FxHashMap<VarId, usize>,
}

impl HoistedLocals {
    /// Describe a frame hoisting `variables`, in slot order.
    ///
    /// A variable listed twice keeps its first slot.
    pub fn new(variables: &[VarId], parent: Option<Arc<HoistedLocals>>) -> Self {
        let mut indexes = FxHashMap::default();
        for (slot, &var) in variables.iter().enumerate() {
            indexes.entry(var).or_insert(slot);
        }
        HoistedLocals {
            parent,
            variables: variables.into(),
            indexes,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<&Arc<HoistedLocals>> {
        self.parent.as_ref()
    }

    /// Slot of `var` in this frame only (parents are not searched).
    #[inline]
    pub fn slot_of(&self, var: VarId) -> Option<usize> {
        self.indexes.get(&var).copied()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Cells for one activation of a hoisted frame.
#[derive(Debug)]
pub struct Storage {
    cells: Box<[StrongBox]>,
    parent: Option<Arc<Storage>>,
}

impl Storage {
    /// Allocate one fresh cell (holding `Unit`) per variable of `frame`.
    pub fn new(frame: &HoistedLocals, parent: Option<Arc<Storage>>) -> Self {
        let cells = (0..frame.len()).map(|_| StrongBox::new(Value::Unit)).collect();
        Storage { cells, parent }
    }

    /// Wrap existing cells, e.g. ones already shared with a running scope.
    pub fn from_cells(cells: Vec<StrongBox>, parent: Option<Arc<Storage>>) -> Self {
        Storage {
            cells: cells.into_boxed_slice(),
            parent,
        }
    }

    /// Cell at `slot`, if the slot exists.
    #[inline]
    pub fn cell(&self, slot: usize) -> Option<&StrongBox> {
        self.cells.get(slot)
    }

    pub fn cells(&self) -> &[StrongBox] {
        &self.cells
    }

    /// Storage of the enclosing activation.
    #[inline]
    pub fn parent(&self) -> Option<&Arc<Storage>> {
        self.parent.as_ref()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
