//! Selection by one scalar predicate.

use crate::datum::Attribute;
use crate::tuple::decode_tuple;

use super::compare::{CompOp, evaluate};
use super::condition::{Condition, LiteralBinding};
use super::error::{ConditionError, ExecutorError};
use super::iterator::TupleIterator;

/// Re-emits the upstream tuples that satisfy `attr op literal`.
///
/// Tuples are pulled straight into the caller's buffer and returned as is,
/// so a `Filter` changes cardinality but never shape. A null field passes
/// only a [`CompOp::NoOp`] predicate.
///
/// The condition is bound against the upstream schema when the filter is
/// built. If binding fails, the first pull that sees an upstream tuple
/// returns [`ExecutorError::BadCondition`].
pub struct Filter<I> {
    input: I,
    condition: Condition,
    binding: Result<LiteralBinding, ConditionError>,
}

impl<I: TupleIterator> Filter<I> {
    /// Creates a filter over `input`.
    pub fn new(input: I, condition: Condition) -> Self {
        let binding = condition.bind_literal(input.attributes());
        match &binding {
            Ok(b) => tracing::debug!(
                condition = %condition,
                position = b.position,
                "filter bound"
            ),
            Err(e) => tracing::debug!(condition = %condition, error = %e, "filter unbound"),
        }
        Self {
            input,
            condition,
            binding,
        }
    }

    /// Returns the predicate.
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Consumes the filter, returning the upstream iterator.
    pub fn into_inner(self) -> I {
        self.input
    }
}

impl<I: TupleIterator> TupleIterator for Filter<I> {
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError> {
        loop {
            let Some(len) = self.input.next_tuple(buf)? else {
                return Ok(None);
            };
            let binding = match &self.binding {
                Ok(binding) => binding,
                Err(e) => {
                    tracing::warn!(condition = %self.condition, error = %e, "bad filter condition");
                    return Err(ExecutorError::BadCondition(e.clone()));
                }
            };

            let fields = decode_tuple(self.input.attributes(), &buf[..len])?;
            let passes = match fields[binding.position].data {
                None => binding.op == CompOp::NoOp,
                Some(data) => evaluate(binding.op, binding.ty, data, &binding.literal)?,
            };
            tracing::trace!(condition = %self.condition, passes, "filter predicate");
            if passes {
                return Ok(Some(len));
            }
        }
    }

    fn attributes(&self) -> &[Attribute] {
        self.input.attributes()
    }
}
