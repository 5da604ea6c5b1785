//! Equality index-nested-loop join.
//!
//! For every outer tuple the join walks the inner scan from the start,
//! emitting `outer ++ inner` for each inner tuple whose key equals the outer
//! key, then rewinds the inner scan with
//! [`reset_scan`](super::IndexIterator::reset_scan).
//!
//! The outer side is decoded and encoded once per outer tuple. Its key and
//! its share of the output (combined null bitmap plus field bytes) are
//! copied out of the outer buffer, so matching inner tuples only append
//! their own fields.
//!
//! ```text
//! NeedOuterTuple --(outer tuple)--> ScanningInner --(match)--> emit
//!   |      ^                            |
//!   |      +--(inner EOF, reset_scan)---+
//!   +--(outer EOF)--> end of stream
//! ```

use crate::datum::{Attribute, SerializationError};
use crate::tuple::{OwnedField, TupleWriter, decode_tuple};

use super::compare::{CompOp, evaluate};
use super::condition::{Condition, JoinBinding};
use super::error::{ConditionError, ExecutorError};
use super::iterator::{IndexIterator, TupleIterator, page_buffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinState {
    NeedOuterTuple,
    ScanningInner,
}

/// Joins an outer iterator with a rescannable inner scan on `outer.a = inner.b`.
///
/// Output tuples follow the outer schema then the inner schema, in
/// outer-major order. Null keys never match.
pub struct IndexNestedLoopJoin<O, I> {
    outer: O,
    inner: I,
    condition: Condition,
    binding: Result<JoinBinding, ConditionError>,
    output: Vec<Attribute>,
    state: JoinState,
    outer_buf: Box<[u8]>,
    inner_buf: Box<[u8]>,
    /// Outer contribution to the current output tuple.
    prefix: Box<[u8]>,
    prefix_len: usize,
    /// Join key of the current outer tuple.
    current_key: Option<OwnedField>,
}

impl<O: TupleIterator, I: IndexIterator> IndexNestedLoopJoin<O, I> {
    /// Creates a join of `outer` and `inner` on `condition`.
    ///
    /// The condition's left attribute is looked up in the outer schema and
    /// its right attribute in the inner schema. An invalid condition is
    /// reported by the first pull that reads an outer tuple.
    pub fn new(outer: O, inner: I, condition: Condition) -> Self {
        let binding = condition.bind_join(outer.attributes(), inner.attributes());
        let output: Vec<Attribute> = outer
            .attributes()
            .iter()
            .chain(inner.attributes())
            .cloned()
            .collect();
        match &binding {
            Ok(b) => tracing::debug!(
                condition = %condition,
                outer_position = b.outer_position,
                inner_position = b.inner_position,
                attributes = output.len(),
                "join bound"
            ),
            Err(e) => tracing::debug!(condition = %condition, error = %e, "join unbound"),
        }
        Self {
            outer,
            inner,
            condition,
            binding,
            output,
            state: JoinState::NeedOuterTuple,
            outer_buf: page_buffer(),
            inner_buf: page_buffer(),
            prefix: page_buffer(),
            prefix_len: 0,
            current_key: None,
        }
    }

    /// Returns the join predicate.
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Returns the outer iterator.
    pub fn outer(&self) -> &O {
        &self.outer
    }

    /// Returns the inner scan.
    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Consumes the join, returning the outer and inner iterators.
    pub fn into_parts(self) -> (O, I) {
        (self.outer, self.inner)
    }

    fn bound(&self) -> Result<JoinBinding, ExecutorError> {
        match &self.binding {
            Ok(binding) => Ok(*binding),
            Err(e) => {
                tracing::warn!(condition = %self.condition, error = %e, "bad join condition");
                Err(ExecutorError::BadCondition(e.clone()))
            }
        }
    }

    /// Pulls outer tuples until one has a non-null key, caching its key and
    /// output prefix. Returns false once the outer side is exhausted.
    fn advance_outer(&mut self) -> Result<bool, ExecutorError> {
        loop {
            let Some(len) = self.outer.next_tuple(&mut self.outer_buf)? else {
                return Ok(false);
            };
            let binding = self.bound()?;
            let fields = decode_tuple(self.outer.attributes(), &self.outer_buf[..len])?;
            let key = &fields[binding.outer_position];
            if key.is_null() {
                tracing::trace!(condition = %self.condition, "outer key is null, skipping");
                continue;
            }

            let mut writer = TupleWriter::new(&mut self.prefix, self.output.len())?;
            for (i, field) in fields.iter().enumerate() {
                writer.put_field(i, field)?;
            }
            self.prefix_len = writer.finish();
            self.current_key = Some(key.to_owned_field());
            return Ok(true);
        }
    }
}

impl<O: TupleIterator, I: IndexIterator> TupleIterator for IndexNestedLoopJoin<O, I> {
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError> {
        loop {
            if self.state == JoinState::NeedOuterTuple {
                if !self.advance_outer()? {
                    return Ok(None);
                }
                self.state = JoinState::ScanningInner;
            }

            let Some(len) = self.inner.next_tuple(&mut self.inner_buf)? else {
                self.inner.reset_scan()?;
                tracing::debug!(condition = %self.condition, "inner exhausted, rescanning");
                self.current_key = None;
                self.state = JoinState::NeedOuterTuple;
                continue;
            };
            let binding = self.bound()?;
            let fields = decode_tuple(self.inner.attributes(), &self.inner_buf[..len])?;
            let (Some(outer_key), Some(inner_key)) = (
                self.current_key.as_ref().and_then(OwnedField::bytes),
                fields[binding.inner_position].data,
            ) else {
                continue;
            };
            if !evaluate(CompOp::Eq, binding.ty, outer_key, inner_key)? {
                continue;
            }

            let available = buf.len();
            let dest = buf
                .get_mut(..self.prefix_len)
                .ok_or(SerializationError::BufferTooSmall {
                    required: self.prefix_len,
                    available,
                })?;
            dest.copy_from_slice(&self.prefix[..self.prefix_len]);
            let mut writer = TupleWriter::resume(buf, self.output.len(), self.prefix_len)?;
            let outer_len = self.outer.attributes().len();
            for (i, field) in fields.iter().enumerate() {
                writer.put_field(outer_len + i, field)?;
            }
            return Ok(Some(writer.finish()));
        }
    }

    fn attributes(&self) -> &[Attribute] {
        &self.output
    }
}
