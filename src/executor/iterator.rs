//! The pull-based iterator protocol shared by all operators and scans.

use crate::datum::Attribute;
use crate::storage::PAGE_SIZE;
use crate::tuple::Record;

use super::error::ExecutorError;

/// A source of encoded tuples.
///
/// Operators own their children and pull from them one tuple at a time,
/// so any operator tree is itself a `TupleIterator`.
pub trait TupleIterator {
    /// Writes the next tuple into `buf` and returns its encoded length.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. A [`PAGE_SIZE`]
    /// buffer always suffices; a smaller one fails with `BufferTooSmall`
    /// when a tuple does not fit. Its contents are only valid until the
    /// next call.
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError>;

    /// Returns the ordered schema of the tuples this iterator produces.
    fn attributes(&self) -> &[Attribute];

    /// Pulls every remaining tuple and decodes it into [`Record`]s.
    fn collect_records(&mut self) -> Result<Vec<Record>, ExecutorError> {
        let mut buf = page_buffer();
        let mut records = Vec::new();
        while let Some(len) = self.next_tuple(&mut buf)? {
            records.push(Record::deserialize(&buf[..len], self.attributes())?);
        }
        Ok(records)
    }
}

/// A rewindable scan, as required by the inner side of an index join.
pub trait IndexIterator: TupleIterator {
    /// Rewinds the scan to the start of its key range.
    fn reset_scan(&mut self) -> Result<(), ExecutorError>;
}

/// Allocates a zeroed page-sized buffer for one tuple.
pub fn page_buffer() -> Box<[u8]> {
    vec![0u8; PAGE_SIZE].into_boxed_slice()
}

impl<T: TupleIterator + ?Sized> TupleIterator for Box<T> {
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError> {
        (**self).next_tuple(buf)
    }

    fn attributes(&self) -> &[Attribute] {
        (**self).attributes()
    }
}

impl<T: IndexIterator + ?Sized> IndexIterator for Box<T> {
    fn reset_scan(&mut self) -> Result<(), ExecutorError> {
        (**self).reset_scan()
    }
}

impl<T: TupleIterator + ?Sized> TupleIterator for &mut T {
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError> {
        (**self).next_tuple(buf)
    }

    fn attributes(&self) -> &[Attribute] {
        (**self).attributes()
    }
}

impl<T: IndexIterator + ?Sized> IndexIterator for &mut T {
    fn reset_scan(&mut self) -> Result<(), ExecutorError> {
        (**self).reset_scan()
    }
}

/// In-memory iterator over pre-encoded tuples for unit testing operators
/// without a table.
#[cfg(test)]
pub(crate) struct MockIterator {
    pub schema: Vec<Attribute>,
    pub tuples: Vec<Vec<u8>>,
    pub position: usize,
    /// Number of `reset_scan` calls observed.
    pub resets: usize,
    /// Number of `next_tuple` calls observed.
    pub pulls: usize,
}

#[cfg(test)]
impl MockIterator {
    pub fn new(schema: Vec<Attribute>, records: Vec<Record>) -> Self {
        let tuples = records
            .iter()
            .map(|record| {
                let mut buf = vec![0u8; record.serialized_size()];
                record.serialize(&mut buf).unwrap();
                buf
            })
            .collect();
        Self {
            schema,
            tuples,
            position: 0,
            resets: 0,
            pulls: 0,
        }
    }
}

#[cfg(test)]
impl TupleIterator for MockIterator {
    fn next_tuple(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ExecutorError> {
        self.pulls += 1;
        let Some(tuple) = self.tuples.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        buf[..tuple.len()].copy_from_slice(tuple);
        Ok(Some(tuple.len()))
    }

    fn attributes(&self) -> &[Attribute] {
        &self.schema
    }
}

#[cfg(test)]
impl IndexIterator for MockIterator {
    fn reset_scan(&mut self) -> Result<(), ExecutorError> {
        self.resets += 1;
        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::Value;

    fn mock() -> MockIterator {
        MockIterator::new(
            vec![Attribute::int("a")],
            vec![
                Record::new(vec![Value::Int(1)]),
                Record::new(vec![Value::Int(2)]),
            ],
        )
    }

    #[test]
    fn test_collect_records() {
        let mut iter = mock();
        let records = iter.collect_records().unwrap();
        assert_eq!(
            records,
            vec![
                Record::new(vec![Value::Int(1)]),
                Record::new(vec![Value::Int(2)]),
            ]
        );
        // Exhausted iterators stay exhausted.
        assert!(iter.collect_records().unwrap().is_empty());
    }

    #[test]
    fn test_boxed_dyn_iterator() {
        let mut iter: Box<dyn IndexIterator> = Box::new(mock());
        assert_eq!(iter.attributes()[0].name, "a");
        assert_eq!(iter.collect_records().unwrap().len(), 2);
        iter.reset_scan().unwrap();
        assert_eq!(iter.collect_records().unwrap().len(), 2);
    }

    #[test]
    fn test_page_buffer() {
        let buf = page_buffer();
        assert_eq!(buf.len(), PAGE_SIZE);
        assert!(buf.iter().all(|&b| b == 0));
    }
}
