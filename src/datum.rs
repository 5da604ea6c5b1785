//! Attribute types and owned values.
//!
//! This module defines the three value kinds understood by the executor
//! ([`Type`]), the schema metadata attached to every tuple column
//! ([`Attribute`]), and an owned, typed [`Value`] with wire-format
//! serialization support.

use std::fmt;

/// Encoded size of an [`Type::Int`] value.
pub const INT_SIZE: usize = 4;

/// Encoded size of a [`Type::Real`] value.
pub const REAL_SIZE: usize = 4;

/// Size of the length prefix in front of every [`Type::VarChar`] payload.
pub const VARCHAR_LENGTH_SIZE: usize = 4;

/// Errors from data serialization/deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Buffer too small for the operation.
    BufferTooSmall {
        /// Bytes required.
        required: usize,
        /// Bytes available.
        available: usize,
    },
    /// Invalid data format.
    InvalidFormat(String),
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::BufferTooSmall {
                required,
                available,
            } => {
                write!(
                    f,
                    "buffer too small: need {} bytes, have {}",
                    required, available
                )
            }
            SerializationError::InvalidFormat(msg) => {
                write!(f, "invalid format: {}", msg)
            }
        }
    }
}

impl std::error::Error for SerializationError {}

/// Returns `SerializationError::BufferTooSmall` if the buffer is too small.
#[macro_export]
macro_rules! ensure_buf_len {
    ($buf:expr, $required:expr) => {
        if $buf.len() < $required {
            return Err($crate::datum::SerializationError::BufferTooSmall {
                required: $required,
                available: $buf.len(),
            });
        }
    };
}

/// Reads the 4-byte little-endian length prefix of a VarChar field.
///
/// The caller must have checked that `buf` holds at least
/// [`VARCHAR_LENGTH_SIZE`] bytes.
pub(crate) fn varchar_len(buf: &[u8]) -> usize {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize
}

/// Attribute data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// 32-bit signed integer.
    Int,
    /// 32-bit IEEE-754 floating point.
    Real,
    /// Length-prefixed variable-length string.
    VarChar,
}

impl Type {
    /// Returns the fixed byte size for fixed-length types, or `None` for VarChar.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Type::Int => Some(INT_SIZE),
            Type::Real => Some(REAL_SIZE),
            Type::VarChar => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Int => "integer",
            Type::Real => "real",
            Type::VarChar => "varchar",
        };
        write!(f, "{}", name)
    }
}

/// Schema metadata for one tuple column.
///
/// Attributes never carry values; they describe how to interpret the bytes
/// of a tuple encoded against the schema they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Column name, unique within a schema.
    pub name: String,
    /// Data type.
    pub ty: Type,
    /// Declared length in bytes (maximum payload length for VarChar).
    pub length: u32,
}

impl Attribute {
    /// Creates a new attribute.
    pub fn new(name: impl Into<String>, ty: Type, length: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            length,
        }
    }

    /// Creates an integer attribute with the natural 4-byte length.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, Type::Int, INT_SIZE as u32)
    }

    /// Creates a real attribute with the natural 4-byte length.
    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, Type::Real, REAL_SIZE as u32)
    }

    /// Creates a VarChar attribute holding at most `length` bytes.
    pub fn varchar(name: impl Into<String>, length: u32) -> Self {
        Self::new(name, Type::VarChar, length)
    }
}

/// Returns the position of the attribute named `name` in `schema`.
///
/// Join output can repeat a name; the last attribute with that name wins,
/// so a name refers to the inner side of a join.
pub fn position_of(schema: &[Attribute], name: &str) -> Option<usize> {
    schema.iter().rposition(|attr| attr.name == name)
}

/// A typed value.
///
/// Used to build tuples and literals. The operators themselves work on
/// encoded bytes and only materialize a `Value` for literals and display.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL (type is unknown/any).
    Null,
    /// 32-bit signed integer.
    Int(i32),
    /// 32-bit floating point.
    Real(f32),
    /// Variable-length string.
    VarChar(String),
}

impl Value {
    /// Returns the data type for this value, or `None` for Null.
    pub fn data_type(&self) -> Option<Type> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(Type::Int),
            Value::Real(_) => Some(Type::Real),
            Value::VarChar(_) => Some(Type::VarChar),
        }
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the serialized size in bytes.
    ///
    /// For NULL, this returns 0 (NULL values are indicated by the null bitmap).
    /// For VarChar, this includes the 4-byte length prefix.
    pub fn serialized_size(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Int(_) => INT_SIZE,
            Value::Real(_) => REAL_SIZE,
            Value::VarChar(s) => VARCHAR_LENGTH_SIZE + s.len(),
        }
    }

    /// Serializes this value to a buffer.
    ///
    /// Returns the number of bytes written. NULL writes 0 bytes.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError::BufferTooSmall` if the buffer is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializationError> {
        match self {
            Value::Null => Ok(0),
            Value::Int(n) => {
                ensure_buf_len!(buf, INT_SIZE);
                buf[0..INT_SIZE].copy_from_slice(&n.to_le_bytes());
                Ok(INT_SIZE)
            }
            Value::Real(n) => {
                ensure_buf_len!(buf, REAL_SIZE);
                buf[0..REAL_SIZE].copy_from_slice(&n.to_le_bytes());
                Ok(REAL_SIZE)
            }
            Value::VarChar(s) => {
                let data = s.as_bytes();
                let required = VARCHAR_LENGTH_SIZE + data.len();
                ensure_buf_len!(buf, required);
                buf[0..VARCHAR_LENGTH_SIZE].copy_from_slice(&(data.len() as u32).to_le_bytes());
                buf[VARCHAR_LENGTH_SIZE..required].copy_from_slice(data);
                Ok(required)
            }
        }
    }

    /// Returns the encoded bytes of this value.
    ///
    /// NULL encodes to an empty vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.serialized_size()];
        // Cannot fail: the buffer is sized from serialized_size().
        let _ = self.serialize(&mut buf);
        buf
    }

    /// Deserializes a value from a buffer given its data type.
    ///
    /// Returns the value and the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError::BufferTooSmall` if the buffer is too small.
    /// Returns `SerializationError::InvalidFormat` for malformed data.
    pub fn deserialize(buf: &[u8], ty: Type) -> Result<(Self, usize), SerializationError> {
        match ty {
            Type::Int => {
                ensure_buf_len!(buf, INT_SIZE);
                let n = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
                Ok((Value::Int(n), INT_SIZE))
            }
            Type::Real => {
                ensure_buf_len!(buf, REAL_SIZE);
                let n = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
                Ok((Value::Real(n), REAL_SIZE))
            }
            Type::VarChar => {
                ensure_buf_len!(buf, VARCHAR_LENGTH_SIZE);
                let len = varchar_len(buf);
                let required = VARCHAR_LENGTH_SIZE + len;
                ensure_buf_len!(buf, required);
                let s = String::from_utf8(buf[VARCHAR_LENGTH_SIZE..required].to_vec())
                    .map_err(|e| SerializationError::InvalidFormat(e.to_string()))?;
                Ok((Value::VarChar(s), required))
            }
        }
    }

    /// Converts this value to its text representation.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Real(n) => format_real(*n),
            Value::VarChar(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Formats a real value, spelling out the special values.
fn format_real(n: f32) -> String {
    if n.is_infinite() {
        if n.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.is_nan() {
        "NaN".to_string()
    } else {
        format!("{}", n)
    }
}
