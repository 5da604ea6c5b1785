//! Pull-based relational operators.
//!
//! Every operator is a [`TupleIterator`]: each call to
//! [`next_tuple`](TupleIterator::next_tuple) writes one encoded tuple into a
//! caller-supplied buffer, so operators compose into trees where each parent
//! pulls from its children.
//!
//! # Architecture
//!
//! ```text
//! Project
//!   └── Filter
//!         └── IndexNestedLoopJoin
//!               ├── TableScan (outer)
//!               └── IndexScan (inner, rescanned per outer tuple)
//! ```
//!
//! # Components
//!
//! - [`Filter`]: selection by one `attr op literal` predicate
//! - [`Project`]: restricts and reorders attributes
//! - [`IndexNestedLoopJoin`]: equality join against a rescannable inner scan
//! - [`scan`]: leaf iterators over a [`MemoryTable`](crate::storage::MemoryTable)
//! - [`compare_typed`] / [`evaluate`]: typed comparison over encoded values
//!
//! Output buffers are reused between calls. A caller must consume or copy a
//! tuple before pulling the next one.

mod compare;
mod condition;
mod error;
mod filter;
mod iterator;
mod join;
mod project;
pub mod scan;

pub use compare::{CompOp, compare_typed, evaluate};
pub use condition::{Condition, Operand};
pub use error::{ConditionError, ExecutorError, result_code};
pub use filter::Filter;
pub use iterator::{IndexIterator, TupleIterator, page_buffer};
pub use join::IndexNestedLoopJoin;
pub use project::Project;
pub use scan::{IndexScan, TableScan};
