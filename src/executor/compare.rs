//! Typed comparison over encoded field values.
//!
//! Values are compared in their tuple encoding (see [`crate::tuple`]), so
//! operators never materialize a [`Value`](crate::datum::Value) per row.
//! Null handling is the caller's job: both operands must be non-null.

use std::cmp::Ordering;
use std::fmt;

use crate::datum::{
    INT_SIZE, REAL_SIZE, SerializationError, Type, VARCHAR_LENGTH_SIZE, varchar_len,
};
use crate::ensure_buf_len;

/// Relational comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompOp {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<>`
    Ne,
    /// No comparison; always true.
    NoOp,
}

impl CompOp {
    /// Returns true if a comparison outcome satisfies this operator.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompOp::Eq => ordering == Ordering::Equal,
            CompOp::Lt => ordering == Ordering::Less,
            CompOp::Gt => ordering == Ordering::Greater,
            CompOp::Le => ordering != Ordering::Greater,
            CompOp::Ge => ordering != Ordering::Less,
            CompOp::Ne => ordering != Ordering::Equal,
            CompOp::NoOp => true,
        }
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompOp::Eq => "=",
            CompOp::Lt => "<",
            CompOp::Gt => ">",
            CompOp::Le => "<=",
            CompOp::Ge => ">=",
            CompOp::Ne => "<>",
            CompOp::NoOp => "no-op",
        };
        f.write_str(symbol)
    }
}

/// Compares two encoded, non-null values of type `ty` under a total order.
///
/// This is the sort order of secondary indexes. Predicates go through
/// [`evaluate`] instead, which treats NaN as unordered.
///
/// - Int: signed ordering.
/// - Real: IEEE ordering, with NaN greater than every non-NaN value and
///   equal to itself.
/// - VarChar: bytewise over the payloads (length prefix excluded); when one
///   payload is a prefix of the other, the shorter one sorts first.
///
/// # Errors
///
/// Returns `SerializationError::BufferTooSmall` if either value is shorter
/// than its encoding requires.
pub fn compare_typed(ty: Type, a: &[u8], b: &[u8]) -> Result<Ordering, SerializationError> {
    match ty {
        Type::Int => Ok(read_i32(a)?.cmp(&read_i32(b)?)),
        Type::Real => Ok(compare_f32(read_f32(a)?, read_f32(b)?)),
        Type::VarChar => Ok(varchar_payload(a)?.cmp(varchar_payload(b)?)),
    }
}

/// Compares two encoded values and applies `op` to the outcome.
///
/// `NoOp` is true without inspecting the operands. Reals follow IEEE: when
/// either side is NaN the operands are unordered and only `Ne` holds.
pub fn evaluate(op: CompOp, ty: Type, a: &[u8], b: &[u8]) -> Result<bool, SerializationError> {
    if op == CompOp::NoOp {
        return Ok(true);
    }
    let ordering = match ty {
        Type::Real => read_f32(a)?.partial_cmp(&read_f32(b)?),
        Type::Int | Type::VarChar => Some(compare_typed(ty, a, b)?),
    };
    Ok(match ordering {
        Some(ordering) => op.holds(ordering),
        None => op == CompOp::Ne,
    })
}

fn read_i32(data: &[u8]) -> Result<i32, SerializationError> {
    ensure_buf_len!(data, INT_SIZE);
    Ok(i32::from_le_bytes([data[0], data[1], data[2], data[3]]))
}

fn read_f32(data: &[u8]) -> Result<f32, SerializationError> {
    ensure_buf_len!(data, REAL_SIZE);
    Ok(f32::from_le_bytes([data[0], data[1], data[2], data[3]]))
}

fn varchar_payload(data: &[u8]) -> Result<&[u8], SerializationError> {
    ensure_buf_len!(data, VARCHAR_LENGTH_SIZE);
    let end = VARCHAR_LENGTH_SIZE + varchar_len(data);
    ensure_buf_len!(data, end);
    Ok(&data[VARCHAR_LENGTH_SIZE..end])
}

/// Total order over f32 for index keys: NaN is greater than all non-NaN
/// values, and NaN == NaN.
fn compare_f32(a: f32, b: f32) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ord) => ord,
        None => match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => unreachable!(),
        },
    }
}
