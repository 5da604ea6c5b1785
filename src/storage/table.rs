//! In-memory table of encoded tuples.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::datum::{Attribute, SerializationError, Type, Value, position_of};
use crate::tuple::{FieldValue, Record, decode_tuple, null_bitmap};

use super::error::StorageError;
use super::index::{KeyRange, SecondaryIndex};
use super::page::{PAGE_SIZE, RecordId};

/// An in-memory table: a schema plus tuples in wire format.
///
/// `MemoryTable` is a cheap handle; clones share the same tuples and
/// indexes through an `Arc<RwLock<..>>`, so several scans (for example
/// both sides of a self-join) can read one table.
///
/// Tuples are append-only and addressed by [`RecordId`] in insertion order.
#[derive(Clone)]
pub struct MemoryTable {
    name: Arc<str>,
    schema: Arc<[Attribute]>,
    inner: Arc<RwLock<TableData>>,
}

#[derive(Default)]
struct TableData {
    tuples: Vec<Bytes>,
    /// Secondary indexes keyed by attribute name.
    indexes: HashMap<String, SecondaryIndex>,
}

impl MemoryTable {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>, schema: Vec<Attribute>) -> Self {
        let name: String = name.into();
        Self {
            name: name.into(),
            schema: schema.into(),
            inner: Arc::new(RwLock::new(TableData::default())),
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    /// Returns the number of stored tuples.
    pub fn len(&self) -> usize {
        self.inner.read().tuples.len()
    }

    /// Returns true if the table holds no tuples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encodes and appends a record.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the values do not match the schema's
    /// types or exceed a VarChar's declared length, and `TupleTooLarge` if
    /// the encoded tuple exceeds `PAGE_SIZE`.
    pub fn insert(&self, record: &Record) -> Result<RecordId, StorageError> {
        if !record.matches_schema(&self.schema) {
            return Err(StorageError::SchemaMismatch(format!(
                "record {} does not match schema of \"{}\"",
                record, self.name
            )));
        }
        for (value, attr) in record.values.iter().zip(self.schema.iter()) {
            if let Value::VarChar(s) = value
                && s.len() > attr.length as usize
            {
                return Err(StorageError::SchemaMismatch(format!(
                    "value for \"{}\" is {} bytes, declared length is {}",
                    attr.name,
                    s.len(),
                    attr.length
                )));
            }
        }

        let size = record.serialized_size();
        if size > PAGE_SIZE {
            return Err(StorageError::TupleTooLarge {
                size,
                max: PAGE_SIZE,
            });
        }
        let mut buf = vec![0u8; size];
        record.serialize(&mut buf)?;
        self.insert_tuple(&buf)
    }

    /// Appends an already-encoded tuple.
    ///
    /// The tuple is decoded against the schema to validate it and to feed
    /// the indexes; only the bytes that belong to the tuple are stored.
    pub fn insert_tuple(&self, data: &[u8]) -> Result<RecordId, StorageError> {
        let fields = decode_tuple(&self.schema, data)?;
        let size = null_bitmap::bitmap_len(fields.len())
            + fields.iter().map(FieldValue::encoded_len).sum::<usize>();
        if size > PAGE_SIZE {
            return Err(StorageError::TupleTooLarge {
                size,
                max: PAGE_SIZE,
            });
        }

        let mut inner = self.inner.write();
        let rid = RecordId::new(inner.tuples.len());
        for index in inner.indexes.values_mut() {
            if let Some(key) = fields[index.position()].data {
                index.insert(key, rid)?;
            }
        }
        inner.tuples.push(Bytes::copy_from_slice(&data[..size]));
        Ok(rid)
    }

    /// Copies the tuple at `rid` into `buf` and returns its length.
    pub fn read(&self, rid: RecordId, buf: &mut [u8]) -> Result<usize, StorageError> {
        let inner = self.inner.read();
        let tuple = inner
            .tuples
            .get(rid.slot())
            .ok_or(StorageError::RecordNotFound(rid))?;
        let available = buf.len();
        let dest = buf
            .get_mut(..tuple.len())
            .ok_or(SerializationError::BufferTooSmall {
                required: tuple.len(),
                available,
            })?;
        dest.copy_from_slice(tuple);
        Ok(tuple.len())
    }

    /// Returns the tuple at `rid` decoded into a [`Record`].
    pub fn get(&self, rid: RecordId) -> Result<Record, StorageError> {
        let inner = self.inner.read();
        let tuple = inner
            .tuples
            .get(rid.slot())
            .ok_or(StorageError::RecordNotFound(rid))?;
        Ok(Record::deserialize(tuple, &self.schema)?)
    }

    /// Builds a secondary index on `attr_name` over the current tuples.
    ///
    /// Later inserts keep the index up to date. NULL keys are skipped.
    pub fn create_index(&self, attr_name: &str) -> Result<(), StorageError> {
        let position = position_of(&self.schema, attr_name)
            .ok_or_else(|| StorageError::UnknownAttribute(attr_name.to_string()))?;

        let mut inner = self.inner.write();
        if inner.indexes.contains_key(attr_name) {
            return Err(StorageError::IndexExists(attr_name.to_string()));
        }

        let mut index = SecondaryIndex::new(position, self.schema[position].ty);
        for (slot, tuple) in inner.tuples.iter().enumerate() {
            let fields = decode_tuple(&self.schema, tuple)?;
            if let Some(key) = fields[position].data {
                index.insert(key, RecordId::new(slot))?;
            }
        }
        tracing::debug!(
            table = %self.name,
            attribute = attr_name,
            entries = index.len(),
            "created secondary index"
        );
        inner.indexes.insert(attr_name.to_string(), index);
        Ok(())
    }

    /// Returns true if an index exists on `attr_name`.
    pub fn has_index(&self, attr_name: &str) -> bool {
        self.inner.read().indexes.contains_key(attr_name)
    }

    /// Returns the type of the indexed attribute, if an index exists.
    pub fn index_type(&self, attr_name: &str) -> Option<Type> {
        let inner = self.inner.read();
        let index = inner.indexes.get(attr_name)?;
        Some(self.schema[index.position()].ty)
    }

    /// Returns the ids of records whose `attr_name` lies in `range`, in key order.
    pub fn index_range(
        &self,
        attr_name: &str,
        range: &KeyRange,
    ) -> Result<Vec<RecordId>, StorageError> {
        let inner = self.inner.read();
        let index = inner
            .indexes
            .get(attr_name)
            .ok_or_else(|| StorageError::IndexNotFound(attr_name.to_string()))?;
        index.range(range)
    }
}

impl std::fmt::Debug for MemoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTable")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("len", &self.len())
            .finish()
    }
}
