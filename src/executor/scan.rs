//! Leaf iterators over a [`MemoryTable`].

use crate::datum::Attribute;
use crate::storage::{KeyRange, MemoryTable, RecordId};

use super::error::ExecutorError;
use super::iterator::{IndexIterator, TupleIterator};

/// Full scan in insertion order.
pub struct TableScan {
    table: MemoryTable,
    cursor: usize,
}

impl TableScan {
    /// Creates a scan positioned before the first tuple of `table`.
    pub fn new(table: MemoryTable) -> Self {
        Self { table, cursor: 0 }
    }
}

impl TupleIterator for TableScan {
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError> {
        if self.cursor >= self.table.len() {
            return Ok(None);
        }
        let len = self.table.read(RecordId::new(self.cursor), buf)?;
        self.cursor += 1;
        Ok(Some(len))
    }

    fn attributes(&self) -> &[Attribute] {
        self.table.schema()
    }
}

impl IndexIterator for TableScan {
    fn reset_scan(&mut self) -> Result<(), ExecutorError> {
        self.cursor = 0;
        Ok(())
    }
}

/// Key-ordered scan over a secondary index.
///
/// The qualifying record ids are looked up on the first pull after
/// construction, [`reset_scan`](IndexIterator::reset_scan) or
/// [`set_range`](Self::set_range), so a rescan sees tuples inserted since
/// the previous pass.
pub struct IndexScan {
    table: MemoryTable,
    attribute: String,
    range: KeyRange,
    rids: Option<Vec<RecordId>>,
    cursor: usize,
    rescans: usize,
}

impl IndexScan {
    /// Creates a scan of `table` over the index on `attribute`, restricted to `range`.
    ///
    /// A missing index is reported by the first pull.
    pub fn new(table: MemoryTable, attribute: impl Into<String>, range: KeyRange) -> Self {
        Self {
            table,
            attribute: attribute.into(),
            range,
            rids: None,
            cursor: 0,
            rescans: 0,
        }
    }

    /// Returns the current key range.
    pub fn range(&self) -> &KeyRange {
        &self.range
    }

    /// Replaces the key range and rewinds.
    pub fn set_range(&mut self, range: KeyRange) {
        self.range = range;
        self.rewind();
    }

    /// Returns how many times the scan has been reset.
    pub fn rescans(&self) -> usize {
        self.rescans
    }

    fn rewind(&mut self) {
        self.rids = None;
        self.cursor = 0;
    }
}

impl TupleIterator for IndexScan {
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError> {
        if self.rids.is_none() {
            let found = self.table.index_range(&self.attribute, &self.range)?;
            tracing::trace!(
                table = self.table.name(),
                attribute = %self.attribute,
                matches = found.len(),
                "index scan positioned"
            );
            self.rids = Some(found);
        }
        let Some(rid) = self
            .rids
            .as_ref()
            .and_then(|rids| rids.get(self.cursor).copied())
        else {
            return Ok(None);
        };
        let len = self.table.read(rid, buf)?;
        self.cursor += 1;
        Ok(Some(len))
    }

    fn attributes(&self) -> &[Attribute] {
        self.table.schema()
    }
}

impl IndexIterator for IndexScan {
    fn reset_scan(&mut self) -> Result<(), ExecutorError> {
        self.rescans += 1;
        self.rewind();
        Ok(())
    }
}
