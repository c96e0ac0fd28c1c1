//! Error types for heapdb operations.

use thiserror::Error;

use crate::types::Rid;

/// Result type alias using [`HeapDbError`].
pub type Result<T> = std::result::Result<T, HeapDbError>;

/// Error types for heapdb operations.
#[derive(Debug, Error)]
pub enum HeapDbError {
    /// A named page file could not be found on disk.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// General storage/I/O error (failed read, write, extend, or sync).
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Buffer pool misuse (bad capacity, unknown page number, etc.).
    #[error("Buffer pool error: {0}")]
    BufferPoolError(String),

    /// Every frame is pinned; no replacement victim can be chosen.
    #[error("All buffer frames are pinned")]
    AllFramesPinned,

    /// Shutdown was requested while clients still hold pins.
    #[error("Buffer pool has pinned pages")]
    PoolHasPinnedPages,

    /// Schema-related errors (empty schema, duplicate attribute, bad key).
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Catalog page parse/encode errors.
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// Type mismatch errors.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeError { expected: String, actual: String },

    /// Predicate evaluation errors.
    #[error("Expression error: {0}")]
    ExpressionError(String),

    /// Read of a record identifier whose slot is free.
    #[error("No record at {0}")]
    RecordNotFound(Rid),

    /// Update of a record identifier whose slot is free.
    #[error("Cannot update non-existing record at {0}")]
    NonExistingRecord(Rid),
}
