//! Pull-based selection, projection and index-nested-loop join over packed
//! binary tuples.
//!
//! ```
//! use relexec::datum::{Attribute, Value};
//! use relexec::executor::{CompOp, Condition, Filter, Project, TableScan, TupleIterator};
//! use relexec::storage::MemoryTable;
//! use relexec::tuple::Record;
//!
//! let table = MemoryTable::new("t", vec![Attribute::int("a"), Attribute::varchar("b", 8)]);
//! for (a, b) in [(1, "one"), (2, "two"), (3, "three")] {
//!     table.insert(&Record::new(vec![Value::Int(a), Value::VarChar(b.into())])).unwrap();
//! }
//!
//! let filter = Filter::new(
//!     TableScan::new(table),
//!     Condition::with_literal("a", CompOp::Ge, Value::Int(2)),
//! );
//! let mut project = Project::new(filter, &["b"]);
//! let rows = project.collect_records().unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].to_string(), "(\"two\")");
//! ```

pub mod datum;
pub mod executor;
pub mod storage;
pub mod tuple;
