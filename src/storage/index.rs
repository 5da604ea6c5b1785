//! Sorted secondary index over one attribute of a [`MemoryTable`](super::MemoryTable).

use std::cmp::Ordering;

use bytes::Bytes;

use crate::datum::{Type, Value};
use crate::executor::compare_typed;

use super::error::StorageError;
use super::page::RecordId;

/// Key range for an index scan.
///
/// A `None` bound leaves that side open. Bounds must have the indexed
/// attribute's type.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRange {
    /// Lower bound, or `None` for unbounded.
    pub low: Option<Value>,
    /// Upper bound, or `None` for unbounded.
    pub high: Option<Value>,
    /// Whether keys equal to `low` are included.
    pub low_inclusive: bool,
    /// Whether keys equal to `high` are included.
    pub high_inclusive: bool,
}

impl KeyRange {
    /// The full key range.
    pub fn all() -> Self {
        Self {
            low: None,
            high: None,
            low_inclusive: true,
            high_inclusive: true,
        }
    }

    /// Keys equal to `key`.
    pub fn point(key: Value) -> Self {
        Self::between(key.clone(), key)
    }

    /// Keys in `[low, high]`.
    pub fn between(low: Value, high: Value) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
            low_inclusive: true,
            high_inclusive: true,
        }
    }

    /// Keys `>= low` (or `> low` when not inclusive).
    pub fn above(low: Value, inclusive: bool) -> Self {
        Self {
            low: Some(low),
            high: None,
            low_inclusive: inclusive,
            high_inclusive: true,
        }
    }

    /// Keys `<= high` (or `< high` when not inclusive).
    pub fn below(high: Value, inclusive: bool) -> Self {
        Self {
            low: None,
            high: Some(high),
            low_inclusive: true,
            high_inclusive: inclusive,
        }
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone)]
struct IndexEntry {
    key: Bytes,
    rid: RecordId,
}

/// Index entries kept sorted by key, then by insertion order.
///
/// NULL keys are not indexed.
#[derive(Debug, Clone)]
pub(crate) struct SecondaryIndex {
    position: usize,
    ty: Type,
    entries: Vec<IndexEntry>,
}

impl SecondaryIndex {
    pub(crate) fn new(position: usize, ty: Type) -> Self {
        Self {
            position,
            ty,
            entries: Vec::new(),
        }
    }

    /// Schema position of the indexed attribute.
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts an encoded key, after any entries with an equal key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if `key` is not a complete
    /// encoding of the indexed type. The index is left unchanged.
    pub(crate) fn insert(&mut self, key: &[u8], rid: RecordId) -> Result<(), StorageError> {
        compare_typed(self.ty, key, key)?;
        let pos = self
            .entries
            .partition_point(|e| self.order(&e.key, key) != Ordering::Greater);
        self.entries.insert(
            pos,
            IndexEntry {
                key: Bytes::copy_from_slice(key),
                rid,
            },
        );
        Ok(())
    }

    /// Returns the record ids whose key lies in `range`, in key order.
    pub(crate) fn range(&self, range: &KeyRange) -> Result<Vec<RecordId>, StorageError> {
        let low = self.encode_bound(range.low.as_ref())?;
        let high = self.encode_bound(range.high.as_ref())?;

        let start = match &low {
            Some(low) => self.entries.partition_point(|e| {
                match self.order(&e.key, low) {
                    Ordering::Less => true,
                    Ordering::Equal => !range.low_inclusive,
                    Ordering::Greater => false,
                }
            }),
            None => 0,
        };
        let end = match &high {
            Some(high) => self.entries.partition_point(|e| {
                match self.order(&e.key, high) {
                    Ordering::Less => true,
                    Ordering::Equal => range.high_inclusive,
                    Ordering::Greater => false,
                }
            }),
            None => self.entries.len(),
        };

        if start >= end {
            return Ok(Vec::new());
        }
        Ok(self.entries[start..end].iter().map(|e| e.rid).collect())
    }

    fn encode_bound(&self, bound: Option<&Value>) -> Result<Option<Vec<u8>>, StorageError> {
        let Some(value) = bound else {
            return Ok(None);
        };
        match value.data_type() {
            Some(ty) if ty == self.ty => Ok(Some(value.to_bytes())),
            Some(found) => Err(StorageError::KeyTypeMismatch {
                expected: self.ty,
                found,
            }),
            None => Err(StorageError::SchemaMismatch(
                "index range bound cannot be NULL".to_string(),
            )),
        }
    }

    fn order(&self, a: &[u8], b: &[u8]) -> Ordering {
        // Stored keys are checked by insert and bounds come from
        // encode_bound, so both sides are complete encodings of `ty`.
        match compare_typed(self.ty, a, b) {
            Ok(ordering) => ordering,
            Err(err) => {
                debug_assert!(false, "malformed index key: {err}");
                Ordering::Equal
            }
        }
    }
}
