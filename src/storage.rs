//! In-memory record storage backing the scan operators.
//!
//! The executor only needs a source of encoded tuples and an ordered index
//! over one attribute. [`MemoryTable`] provides both, keeping tuples in the
//! same wire format the operators produce.
//!
//! # Architecture
//!
//! ```text
//! +----------------------+
//! | TableScan/IndexScan  |  <- executor::scan
//! +----------------------+
//!           |
//!           v
//! +----------------------+
//! | MemoryTable          |  tuples (Bytes) + sorted secondary indexes
//! +----------------------+
//! ```

pub mod error;
pub mod index;
pub mod page;
pub mod table;

pub use error::StorageError;
pub use index::KeyRange;
pub use page::{PAGE_SIZE, RecordId};
pub use table::MemoryTable;
