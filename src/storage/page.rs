//! Page size and record identifiers.

/// 4KB page size. Upper bound for every encoded tuple and operator buffer.
pub const PAGE_SIZE: usize = 4096;

/// Position of a tuple within a [`MemoryTable`](super::MemoryTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub usize);

impl RecordId {
    /// Creates a new RecordId from a slot number.
    pub const fn new(slot: usize) -> Self {
        Self(slot)
    }

    /// Returns the slot number.
    pub const fn slot(&self) -> usize {
        self.0
    }
}
