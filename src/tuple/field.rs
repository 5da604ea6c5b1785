//! Decoded field views.

use bytes::Bytes;

use crate::datum::{Attribute, SerializationError, Type, Value};

/// A single decoded field borrowed from a tuple buffer.
///
/// `data` holds the field's exact encoded bytes (including the length
/// prefix for VarChar), or `None` when the field is null. The borrow is
/// only valid until the source buffer is refilled; use
/// [`to_owned_field`](Self::to_owned_field) to keep a value across pulls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldValue<'a> {
    /// Schema attribute this field was decoded against.
    pub attribute: &'a Attribute,
    /// Encoded bytes, or `None` for NULL.
    pub data: Option<&'a [u8]>,
}

impl<'a> FieldValue<'a> {
    /// Returns true if this field is NULL.
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Returns the attribute type.
    pub fn ty(&self) -> Type {
        self.attribute.ty
    }

    /// Returns the number of bytes this field occupies after the null bitmap.
    pub fn encoded_len(&self) -> usize {
        self.data.map_or(0, <[u8]>::len)
    }

    /// Materializes the field as an owned [`Value`].
    pub fn to_value(&self) -> Result<Value, SerializationError> {
        match self.data {
            None => Ok(Value::Null),
            Some(data) => Value::deserialize(data, self.attribute.ty).map(|(value, _)| value),
        }
    }

    /// Copies the field out of its source buffer.
    pub fn to_owned_field(&self) -> OwnedField {
        OwnedField {
            ty: self.attribute.ty,
            data: self.data.map(Bytes::copy_from_slice),
        }
    }
}

/// An owned copy of a decoded field.
///
/// Used where a field must outlive the buffer it was decoded from, such as
/// the join key cached for the current outer tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedField {
    /// Attribute type.
    pub ty: Type,
    /// Encoded bytes, or `None` for NULL.
    pub data: Option<Bytes>,
}

impl OwnedField {
    /// Returns true if this field is NULL.
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Returns the encoded bytes, or `None` for NULL.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_field() {
        let attr = Attribute::int("a");
        let field = FieldValue {
            attribute: &attr,
            data: None,
        };
        assert!(field.is_null());
        assert_eq!(field.encoded_len(), 0);
        assert_eq!(field.to_value().unwrap(), Value::Null);
        assert!(field.to_owned_field().is_null());
    }

    #[test]
    fn test_owned_copy_outlives_buffer() {
        let attr = Attribute::varchar("s", 10);
        let owned = {
            let buf = Value::VarChar("abc".into()).to_bytes();
            let field = FieldValue {
                attribute: &attr,
                data: Some(&buf),
            };
            assert_eq!(field.encoded_len(), 7);
            field.to_owned_field()
        };
        assert_eq!(owned.ty, Type::VarChar);
        assert_eq!(owned.bytes(), Some(&[3, 0, 0, 0, b'a', b'b', b'c'][..]));
    }
}
