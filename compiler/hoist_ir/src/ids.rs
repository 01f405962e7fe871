//! Index and range newtypes for the expression arena.
//!
//! Every reference between nodes is a `u32` index into one of the
//! [`ExprArena`](crate::ExprArena) tables. Ranges are `(start: u32, len: u16)`
//! views into the flat side tables (`expr_lists`, `var_lists`, `catches`).

use std::fmt;

/// Index into the expression arena.
///
/// Two `ExprId`s are equal exactly when they name the same node, which is
/// what rewriting passes compare to detect "no change".
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Create a new `ExprId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// Identity of a declared variable.
///
/// Variables are keyed by declaration, never by name: the arena hands out a
/// fresh `VarId` for every declaration, so an inner `x` and an outer `x`
/// never compare equal.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        VarId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

/// Index into a constant pool. The pool itself lives with the runtime values.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ConstantId(u32);

impl ConstantId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ConstantId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ConstantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConstantId({})", self.0)
    }
}

macro_rules! define_range {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
        #[repr(C)]
        pub struct $name {
            pub start: u32,
            pub len: u16,
        }

        impl $name {
            /// Empty range.
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            /// Create a new range.
            #[inline]
            pub const fn new(start: u32, len: u16) -> Self {
                $name { start, len }
            }

            /// Check if the range is empty.
            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            /// Number of entries in the range.
            #[inline]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            /// Slice bounds into the backing table.
            #[inline]
            pub(crate) fn bounds(&self) -> std::ops::Range<usize> {
                let start = self.start as usize;
                start..start + self.len()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}..{})"),
                    self.start,
                    self.start + u32::from(self.len)
                )
            }
        }
    };
}

define_range!(
    /// Range of expressions in the arena's flat `expr_lists` table.
    ExprRange
);

define_range!(
    /// Range of variables in the arena's flat `var_lists` table.
    ///
    /// Used for lambda parameters, block locals, and variable-list
    /// materialization.
    VarRange
);

define_range!(
    /// Range of exception handlers in the arena's `catches` table.
    CatchRange
);

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ExprId, ExprRange, VarId};
    crate::static_assert_size!(ExprId, 4);
    crate::static_assert_size!(VarId, 4);
    crate::static_assert_size!(ExprRange, 8);
}
