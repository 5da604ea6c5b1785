//! Bounds-checked tuple encoder.

use crate::datum::SerializationError;
use crate::ensure_buf_len;
use crate::storage::PAGE_SIZE;

use super::field::FieldValue;
use super::null_bitmap;

/// Encodes fields into a destination buffer in tuple format.
///
/// The writer owns the null bitmap at the start of the buffer and appends
/// field bytes after it in call order. Callers decide the output position
/// of each field, which lets the same writer serve projection (reordered
/// subset) and join (concatenated schemas).
///
/// Writes never go past `PAGE_SIZE`, even when the destination is larger.
pub struct TupleWriter<'a> {
    buf: &'a mut [u8],
    field_count: usize,
    offset: usize,
}

impl<'a> TupleWriter<'a> {
    /// Starts a new tuple of `field_count` attributes with an all-clear bitmap.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError::BufferTooSmall` if the bitmap does not fit.
    pub fn new(buf: &'a mut [u8], field_count: usize) -> Result<Self, SerializationError> {
        let buf = page_bounded(buf);
        let bitmap_len = null_bitmap::bitmap_len(field_count);
        ensure_buf_len!(buf, bitmap_len);
        buf[..bitmap_len].fill(0);
        Ok(Self {
            buf,
            field_count,
            offset: bitmap_len,
        })
    }

    /// Continues a partially written tuple whose field bytes end at `offset`.
    ///
    /// The bitmap already present in `buf` is kept as is.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError::BufferTooSmall` if `buf` is shorter than
    /// `offset`, or `InvalidFormat` if `offset` lies inside the bitmap.
    pub fn resume(
        buf: &'a mut [u8],
        field_count: usize,
        offset: usize,
    ) -> Result<Self, SerializationError> {
        let buf = page_bounded(buf);
        ensure_buf_len!(buf, offset);
        let bitmap_len = null_bitmap::bitmap_len(field_count);
        if offset < bitmap_len {
            return Err(SerializationError::InvalidFormat(format!(
                "resume offset {} overlaps {}-byte null bitmap",
                offset, bitmap_len
            )));
        }
        Ok(Self {
            buf,
            field_count,
            offset,
        })
    }

    /// Writes the field at output position `index`.
    ///
    /// `None` sets the null bit and writes no bytes; `Some(data)` appends the
    /// already-encoded field bytes verbatim.
    ///
    /// # Errors
    ///
    /// Returns `SerializationError::BufferTooSmall` if the bytes do not fit,
    /// or `InvalidFormat` if `index` is outside the tuple's attribute range.
    pub fn put(&mut self, index: usize, data: Option<&[u8]>) -> Result<(), SerializationError> {
        if index >= self.field_count {
            return Err(SerializationError::InvalidFormat(format!(
                "field index {} out of range for {} attributes",
                index, self.field_count
            )));
        }
        match data {
            None => {
                let bitmap_len = null_bitmap::bitmap_len(self.field_count);
                null_bitmap::set_null(&mut self.buf[..bitmap_len], index);
            }
            Some(data) => {
                let end = self.offset + data.len();
                ensure_buf_len!(self.buf, end);
                self.buf[self.offset..end].copy_from_slice(data);
                self.offset = end;
            }
        }
        Ok(())
    }

    /// Writes a decoded field at output position `index`.
    pub fn put_field(
        &mut self,
        index: usize,
        field: &FieldValue<'_>,
    ) -> Result<(), SerializationError> {
        self.put(index, field.data)
    }

    /// Returns the number of bytes written so far, bitmap included.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Finishes the tuple and returns its encoded length.
    pub fn finish(self) -> usize {
        self.offset
    }
}

fn page_bounded(buf: &mut [u8]) -> &mut [u8] {
    let limit = buf.len().min(PAGE_SIZE);
    &mut buf[..limit]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::{Attribute, Value};
    use crate::tuple::{Record, decode_tuple};

    #[test]
    fn test_write_reordered_subset() {
        let schema = vec![
            Attribute::int("a"),
            Attribute::varchar("b", 10),
            Attribute::real("c"),
        ];
        let source = Record::new(vec![
            Value::Int(1),
            Value::VarChar("skip".into()),
            Value::Real(0.5),
        ]);
        let mut src = vec![0u8; PAGE_SIZE];
        source.serialize(&mut src).unwrap();
        let fields = decode_tuple(&schema, &src).unwrap();

        let mut out = vec![0u8; PAGE_SIZE];
        let mut writer = TupleWriter::new(&mut out, 2).unwrap();
        writer.put_field(0, &fields[2]).unwrap();
        writer.put_field(1, &fields[0]).unwrap();
        let len = writer.finish();
        assert_eq!(len, 1 + 4 + 4);

        let out_schema = vec![schema[2].clone(), schema[0].clone()];
        let parsed = Record::deserialize(&out[..len], &out_schema).unwrap();
        assert_eq!(parsed.values, vec![Value::Real(0.5), Value::Int(1)]);
    }

    #[test]
    fn test_roundtrip_with_null_subsets() {
        let schema = vec![
            Attribute::int("i"),
            Attribute::real("r"),
            Attribute::varchar("empty", 10),
            Attribute::varchar("text", 10),
        ];
        let full = [
            Value::Int(-7),
            Value::Real(3.25),
            Value::VarChar(String::new()),
            Value::VarChar("hello".into()),
        ];
        // Every subset of nulls over the four attributes.
        for mask in 0u32..16 {
            let values: Vec<Value> = full
                .iter()
                .enumerate()
                .map(|(i, v)| if mask & (1 << i) != 0 { Value::Null } else { v.clone() })
                .collect();

            let mut out = vec![0u8; PAGE_SIZE];
            let mut writer = TupleWriter::new(&mut out, schema.len()).unwrap();
            for (i, value) in values.iter().enumerate() {
                let bytes = value.to_bytes();
                let data = (!value.is_null()).then_some(bytes.as_slice());
                writer.put(i, data).unwrap();
            }
            let len = writer.finish();

            let parsed = Record::deserialize(&out[..len], &schema).unwrap();
            assert_eq!(parsed.values, values, "null mask {:04b}", mask);
        }
    }

    #[test]
    fn test_new_clears_bitmap() {
        let mut out = vec![0xFFu8; 16];
        let writer = TupleWriter::new(&mut out, 9).unwrap();
        assert_eq!(writer.offset(), 2);
        assert_eq!(&out[..2], &[0, 0]);
    }

    #[test]
    fn test_resume_keeps_prefix() {
        let mut out = vec![0u8; 32];
        let prefix_len = {
            let mut writer = TupleWriter::new(&mut out, 3).unwrap();
            writer.put(0, None).unwrap();
            writer.put(1, Some(&5i32.to_le_bytes())).unwrap();
            writer.finish()
        };
        let mut writer = TupleWriter::resume(&mut out, 3, prefix_len).unwrap();
        writer.put(2, None).unwrap();
        let len = writer.finish();
        assert_eq!(len, 5);
        assert_eq!(out[0], 0b1010_0000);
    }

    #[test]
    fn test_resume_rejects_offset_in_bitmap() {
        let mut out = vec![0u8; 8];
        assert!(matches!(
            TupleWriter::resume(&mut out, 16, 1),
            Err(SerializationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut out = vec![0u8; 8];
        let mut writer = TupleWriter::new(&mut out, 1).unwrap();
        assert!(matches!(
            writer.put(1, None),
            Err(SerializationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_never_writes_past_page() {
        let mut out = vec![0u8; PAGE_SIZE * 2];
        let payload = vec![7u8; PAGE_SIZE];
        let mut writer = TupleWriter::new(&mut out, 1).unwrap();
        let result = writer.put(0, Some(&payload));
        assert!(matches!(
            result,
            Err(SerializationError::BufferTooSmall {
                available,
                ..
            }) if available == PAGE_SIZE
        ));
        assert!(out[PAGE_SIZE..].iter().all(|&b| b == 0));
    }
}
