//! Tuple encoding and decoding.
//!
//! This module provides:
//! - [`null_bitmap`]: helpers for the leading null bitmap
//! - [`decode_tuple`]: the record-layer decode service producing borrowed [`FieldValue`]s
//! - [`TupleWriter`]: bounds-checked encoder used by the operators
//! - [`Record`]: an owned row of [`Value`](crate::datum::Value)s
//!
//! # Tuple Layout
//!
//! Tuples are encoded against an ordered attribute list (the schema):
//!
//! ```text
//! +---------------------------+
//! | Null Bitmap (ceil(n/8) B) |  MSB-first, bit=1: NULL
//! +---------------------------+
//! | Field[0] (if not null)    |  Int/Real: 4 bytes
//! | Field[1] (if not null)    |  VarChar: u32 length + payload
//! | ...                       |
//! +---------------------------+
//! ```
//!
//! All integers, lengths and reals are little-endian. A null field
//! contributes no bytes after the bitmap.

pub mod null_bitmap;

mod field;
mod record;
mod writer;

pub use field::{FieldValue, OwnedField};
pub use record::{Record, decode_tuple};
pub use writer::TupleWriter;
