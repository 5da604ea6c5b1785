//! Storage layer errors.

use crate::datum::{SerializationError, Type};
use crate::storage::RecordId;

/// Storage layer errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Encoded tuple does not fit in a page.
    TupleTooLarge {
        /// Encoded size of the tuple.
        size: usize,
        /// Maximum size (PAGE_SIZE).
        max: usize,
    },

    /// Record values do not line up with the table schema.
    SchemaMismatch(String),

    /// Attribute name not present in the table schema.
    UnknownAttribute(String),

    /// An index already exists on the attribute.
    IndexExists(String),

    /// No index exists on the attribute.
    IndexNotFound(String),

    /// Index range bound has a different type than the indexed attribute.
    KeyTypeMismatch {
        /// Type of the indexed attribute.
        expected: Type,
        /// Type of the supplied bound.
        found: Type,
    },

    /// Record not found in the table.
    RecordNotFound(RecordId),

    /// Tuple bytes could not be encoded or decoded.
    Serialization(SerializationError),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::TupleTooLarge { size, max } => {
                write!(f, "tuple too large: {} bytes exceeds page size {}", size, max)
            }
            StorageError::SchemaMismatch(msg) => write!(f, "schema mismatch: {}", msg),
            StorageError::UnknownAttribute(name) => {
                write!(f, "attribute \"{}\" does not exist", name)
            }
            StorageError::IndexExists(name) => {
                write!(f, "index on \"{}\" already exists", name)
            }
            StorageError::IndexNotFound(name) => {
                write!(f, "no index on \"{}\"", name)
            }
            StorageError::KeyTypeMismatch { expected, found } => {
                write!(f, "index key type mismatch: expected {}, found {}", expected, found)
            }
            StorageError::RecordNotFound(rid) => write!(f, "record not found: {:?}", rid),
            StorageError::Serialization(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SerializationError> for StorageError {
    fn from(e: SerializationError) -> Self {
        StorageError::Serialization(e)
    }
}
