//! heapdb - an embeddable page-cached heap-file record manager.
//!
//! Tables persist as fixed-size page files on disk. Records of a
//! schema-defined fixed width are stored slotted inside pages; a
//! fixed-capacity buffer pool caches pages in memory and mediates all
//! disk traffic. Clients insert, update, delete, fetch by record
//! identifier, and scan with an optional predicate.
//!
//! # Example
//!
//! ```no_run
//! use heapdb::{Attribute, DataType, Record, Schema, Table, Value};
//!
//! # fn main() -> heapdb::Result<()> {
//! let schema = Schema::new(
//!     vec![
//!         Attribute::new("id", DataType::Int, 0),
//!         Attribute::new("name", DataType::String, 10),
//!     ],
//!     vec![0],
//! )?;
//!
//! let path = std::path::Path::new("people.tbl");
//! Table::create(path, &schema)?;
//! let mut table = Table::open(path)?;
//!
//! let mut record = Record::new(&schema);
//! record.set_attr(&schema, 0, &Value::Int(1))?;
//! record.set_attr(&schema, 1, &Value::String("ada".into()))?;
//! let rid = table.insert(&mut record)?;
//!
//! assert_eq!(table.get(rid)?.data(), record.data());
//! table.close()?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod expr;
pub mod storage;
pub mod types;

pub use catalog::{Attribute, Schema};
pub use error::{HeapDbError, Result};
pub use expr::{CmpOp, Expr};
pub use storage::{
    BufferPool, PageFile, PageHandle, PageNum, ReplacementPolicy, Table, TableOptions, TableScan,
    PAGE_SIZE,
};
pub use types::{DataType, Record, Rid, Value};
