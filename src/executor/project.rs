//! Projection onto an ordered list of attributes.

use crate::datum::{Attribute, position_of};
use crate::tuple::{TupleWriter, decode_tuple};

use super::error::ExecutorError;
use super::iterator::{TupleIterator, page_buffer};

/// Restricts and reorders upstream tuples to the requested attributes.
///
/// Requested names that the upstream schema lacks are skipped. The output
/// schema is resolved once, at construction.
pub struct Project<I> {
    input: I,
    output: Vec<Attribute>,
    /// Upstream position of each output attribute.
    positions: Vec<usize>,
    scratch: Box<[u8]>,
}

impl<I: TupleIterator> Project<I> {
    /// Creates a projection of `input` onto `names`, in that order.
    pub fn new<S: AsRef<str>>(input: I, names: &[S]) -> Self {
        let schema = input.attributes();
        let mut output = Vec::with_capacity(names.len());
        let mut positions = Vec::with_capacity(names.len());
        for name in names {
            match position_of(schema, name.as_ref()) {
                Some(position) => {
                    output.push(schema[position].clone());
                    positions.push(position);
                }
                None => tracing::debug!(attribute = name.as_ref(), "projection skips unknown"),
            }
        }
        tracing::debug!(
            output = ?output.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            "projection bound"
        );
        Self {
            input,
            output,
            positions,
            scratch: page_buffer(),
        }
    }

    /// Consumes the projection, returning the upstream iterator.
    pub fn into_inner(self) -> I {
        self.input
    }
}

impl<I: TupleIterator> TupleIterator for Project<I> {
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError> {
        let Some(len) = self.input.next_tuple(&mut self.scratch)? else {
            return Ok(None);
        };
        let fields = decode_tuple(self.input.attributes(), &self.scratch[..len])?;

        let mut writer = TupleWriter::new(buf, self.output.len())?;
        for (i, &position) in self.positions.iter().enumerate() {
            writer.put_field(i, &fields[position])?;
        }
        Ok(Some(writer.finish()))
    }

    fn attributes(&self) -> &[Attribute] {
        &self.output
    }
}
