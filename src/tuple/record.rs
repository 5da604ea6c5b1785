//! Record (tuple) representation and serialization.
//!
//! [`decode_tuple`] is the zero-copy decode path used by the operators.
//! A [`Record`] is the owned counterpart, used to build tuples from typed
//! values and to turn encoded tuples back into values for display.

use std::fmt;

use crate::datum::{Attribute, SerializationError, VARCHAR_LENGTH_SIZE, Value, varchar_len};
use crate::ensure_buf_len;

use super::field::FieldValue;
use super::null_bitmap;

/// Decodes a tuple into one borrowed [`FieldValue`] per schema attribute.
///
/// The returned fields borrow both `schema` and `buf`. Trailing bytes past
/// the last field are ignored, so `buf` may be a whole page.
///
/// # Errors
///
/// Returns `SerializationError::BufferTooSmall` if the buffer ends before
/// the bitmap or a field does.
pub fn decode_tuple<'a>(
    schema: &'a [Attribute],
    buf: &'a [u8],
) -> Result<Vec<FieldValue<'a>>, SerializationError> {
    let bitmap_len = null_bitmap::bitmap_len(schema.len());
    ensure_buf_len!(buf, bitmap_len);
    let bitmap = &buf[..bitmap_len];

    let mut offset = bitmap_len;
    let mut fields = Vec::with_capacity(schema.len());
    for (i, attribute) in schema.iter().enumerate() {
        if null_bitmap::is_null(bitmap, i) {
            fields.push(FieldValue {
                attribute,
                data: None,
            });
            continue;
        }
        let rest = &buf[offset..];
        let size = match attribute.ty.fixed_size() {
            Some(size) => size,
            None => {
                ensure_buf_len!(rest, VARCHAR_LENGTH_SIZE);
                VARCHAR_LENGTH_SIZE + varchar_len(rest)
            }
        };
        ensure_buf_len!(rest, size);
        fields.push(FieldValue {
            attribute,
            data: Some(&rest[..size]),
        });
        offset += size;
    }

    Ok(fields)
}

/// A record (tuple/row) consisting of multiple values.
///
/// This is the logical representation of a row in memory.
/// Use [`serialize`](Self::serialize) to convert to the tuple format.
///
/// # Example
///
/// ```
/// use relexec::datum::{Attribute, Value};
/// use relexec::tuple::Record;
///
/// let schema = [Attribute::int("id"), Attribute::varchar("name", 10)];
/// let record = Record::new(vec![Value::Int(42), Value::Null]);
///
/// let mut buf = vec![0u8; record.serialized_size()];
/// record.serialize(&mut buf).unwrap();
///
/// let parsed = Record::deserialize(&buf, &schema).unwrap();
/// assert_eq!(parsed, record);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Column values in order.
    pub values: Vec<Value>,
}

impl Record {
    /// Creates a new record with the given values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the serialized size of this record in bytes.
    ///
    /// This includes the null bitmap and all non-null values.
    pub fn serialized_size(&self) -> usize {
        let values_size: usize = self.values.iter().map(Value::serialized_size).sum();
        null_bitmap::bitmap_len(self.values.len()) + values_size
    }

    /// Serializes this record to a buffer.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError::BufferTooSmall` if the buffer is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializationError> {
        let required = self.serialized_size();
        ensure_buf_len!(buf, required);

        let bitmap_len = null_bitmap::bitmap_len(self.values.len());
        buf[..bitmap_len].fill(0);

        let mut offset = bitmap_len;
        for (i, value) in self.values.iter().enumerate() {
            if value.is_null() {
                null_bitmap::set_null(&mut buf[..bitmap_len], i);
            } else {
                offset += value.serialize(&mut buf[offset..])?;
            }
        }

        Ok(offset)
    }

    /// Deserializes a record from a buffer encoded against `schema`.
    ///
    /// # Errors
    ///
    /// Returns error if buffer is malformed or too small.
    pub fn deserialize(buf: &[u8], schema: &[Attribute]) -> Result<Self, SerializationError> {
        let values = decode_tuple(schema, buf)?
            .iter()
            .map(FieldValue::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Record { values })
    }

    /// Returns true if every non-null value has the type of the matching
    /// schema attribute.
    pub fn matches_schema(&self, schema: &[Attribute]) -> bool {
        self.values.len() == schema.len()
            && self
                .values
                .iter()
                .zip(schema)
                .all(|(value, attr)| value.data_type().is_none_or(|ty| ty == attr.ty))
    }

    /// Formats the record as `name: value` pairs using `schema` for names.
    pub fn format_with(&self, schema: &[Attribute]) -> String {
        self.values
            .iter()
            .zip(schema)
            .map(|(value, attr)| format!("{}: {}", attr.name, value))
            .collect::<Vec<_>>()
            .join("    ")
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Value::VarChar(s) => write!(f, "{:?}", s)?,
                other => write!(f, "{}", other)?,
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<Attribute> {
        vec![
            Attribute::int("id"),
            Attribute::varchar("name", 20),
            Attribute::real("score"),
        ]
    }

    #[test]
    fn test_empty_record() {
        let record = Record::new(vec![]);
        assert!(record.is_empty());
        assert_eq!(record.len(), 0);
        assert_eq!(record.serialized_size(), 0);

        let mut buf = vec![0u8; 0];
        let written = record.serialize(&mut buf).unwrap();
        assert_eq!(written, 0);

        let parsed = Record::deserialize(&buf, &[]).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_single_value_record() {
        let record = Record::new(vec![Value::Int(42)]);
        // 1 byte null bitmap + 4 bytes int
        assert_eq!(record.serialized_size(), 1 + 4);

        let mut buf = vec![0u8; record.serialized_size()];
        let written = record.serialize(&mut buf).unwrap();
        assert_eq!(written, 5);
        assert_eq!(buf, vec![0x00, 42, 0, 0, 0]);

        let parsed = Record::deserialize(&buf, &[Attribute::int("a")]).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_record_with_nulls_layout() {
        let record = Record::new(vec![
            Value::Null,
            Value::VarChar("ab".into()),
            Value::Null,
        ]);
        let mut buf = vec![0u8; record.serialized_size()];
        record.serialize(&mut buf).unwrap();
        // Attributes 0 and 2 null: bits 7 and 5 of byte 0.
        assert_eq!(buf, vec![0b1010_0000, 2, 0, 0, 0, b'a', b'b']);

        let parsed = Record::deserialize(&buf, &schema()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_serialize_clears_stale_bitmap() {
        let record = Record::new(vec![Value::Int(1)]);
        let mut buf = vec![0xFFu8; 8];
        record.serialize(&mut buf).unwrap();
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn test_null_bitmap_multiple_bytes() {
        let values: Vec<Value> = (0..9)
            .map(|i| if i % 2 == 1 { Value::Null } else { Value::Int(i) })
            .collect();
        let record = Record::new(values);
        // 2 bytes bitmap + 5 non-null ints
        assert_eq!(record.serialized_size(), 2 + 20);

        let mut buf = vec![0u8; record.serialized_size()];
        record.serialize(&mut buf).unwrap();
        assert_eq!(&buf[..2], &[0b0101_0101, 0b0000_0000]);

        let schema: Vec<Attribute> = (0..9).map(|i| Attribute::int(format!("c{i}"))).collect();
        let parsed = Record::deserialize(&buf, &schema).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_decode_tuple_borrows_exact_bytes() {
        let record = Record::new(vec![
            Value::Int(7),
            Value::VarChar("xyz".into()),
            Value::Real(2.5),
        ]);
        let mut buf = vec![0u8; 64];
        record.serialize(&mut buf).unwrap();

        let schema = schema();
        let fields = decode_tuple(&schema, &buf).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].data, Some(&7i32.to_le_bytes()[..]));
        assert_eq!(fields[1].data.map(<[u8]>::len), Some(7));
        assert_eq!(&fields[1].data.unwrap()[VARCHAR_LENGTH_SIZE..], b"xyz");
        assert_eq!(fields[2].data, Some(&2.5f32.to_le_bytes()[..]));
        assert_eq!(fields[2].attribute.name, "score");
    }

    #[test]
    fn test_decode_truncated() {
        let schema = schema();
        let result = decode_tuple(&schema, &[]);
        assert!(matches!(
            result,
            Err(SerializationError::BufferTooSmall {
                required: 1,
                available: 0
            })
        ));

        // Bitmap says nothing is null, but only the int is present.
        let buf = [0u8, 1, 0, 0, 0];
        assert!(matches!(
            decode_tuple(&schema, &buf),
            Err(SerializationError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_matches_schema() {
        let schema = schema();
        let ok = Record::new(vec![Value::Int(1), Value::Null, Value::Real(1.0)]);
        assert!(ok.matches_schema(&schema));
        let wrong_type = Record::new(vec![Value::Real(1.0), Value::Null, Value::Null]);
        assert!(!wrong_type.matches_schema(&schema));
        let wrong_len = Record::new(vec![Value::Int(1)]);
        assert!(!wrong_len.matches_schema(&schema));
    }

    #[test]
    fn test_display() {
        let record = Record::new(vec![Value::Int(1), Value::VarChar("x".into()), Value::Null]);
        assert_eq!(record.to_string(), "(1, \"x\", NULL)");
        assert_eq!(
            record.format_with(&schema()),
            "id: 1    name: x    score: NULL"
        );
    }
}
