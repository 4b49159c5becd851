//! ID types for live world objects and authored data.

use serde::{Deserialize, Serialize};

/// Unique identifier for a live block in the streamed world.
///
/// Ids are handed out by a [`BlockIdAllocator`] owned by the streamer, so two
/// streamers never share a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u64);

impl BlockId {
    /// Creates a block ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid block ID.
    pub const NULL: Self = Self(0);

    /// Checks if this is a valid (non-null) block ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block#{}", self.0)
    }
}

/// Monotonic allocator for [`BlockId`]s.
#[derive(Debug, Clone)]
pub struct BlockIdAllocator {
    next: u64,
}

impl Default for BlockIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl BlockIdAllocator {
    /// Allocates the next id.
    pub fn next_id(&mut self) -> BlockId {
        let id = BlockId(self.next);
        self.next += 1;
        id
    }
}

/// Index of a block type in the level's block catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockKindId(u16);

impl BlockKindId {
    /// Creates a block kind ID from a raw value.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns the catalog index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
