use core::fmt;
use core::num::NonZeroU32;

use crate::{CoreError, CoreResult};

/// Compact, stable identifier used across the network arena.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
///
/// Input files number nodes and elements from 1; `from_one_based` /
/// `one_based` carry that convention across the parsing boundary while the
/// arenas index from 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based arena index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Create an Id from a 1-based input-file id.
    pub fn from_one_based(id: u32) -> CoreResult<Self> {
        NonZeroU32::new(id)
            .map(Self)
            .ok_or(CoreError::InvalidArg { what: "id must be >= 1" })
    }

    /// Recover the 0-based arena index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Recover the 1-based input-file id.
    pub fn one_based(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.one_based())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.one_based())
    }
}

/// Domain-specific ID aliases for clarity (no runtime cost).
pub type NodeId = Id;
pub type ElemId = Id;
pub type LoopId = Id;
