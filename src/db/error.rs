//! Storage error types.

use thiserror::Error;

/// Convenience alias for fallible storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by stores, batches, and iterators.
///
/// The variants fall into three kinds: engine failures (`Engine`, `Io`),
/// caller misuse (`InvalidIterator`, `Closed`), and deliberate stubs
/// (`Unsupported`). None of them are retried inside this crate; callers
/// decide whether to abort or log per kind.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying engine failed (open, transaction begin, commit, or
    /// storage-level I/O inside the engine).
    #[error("storage engine failure: {0}")]
    Engine(String),

    /// An I/O error occurred outside the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `key`, `value`, or `next` was called on an iterator that is no
    /// longer valid.
    #[error("iterator is invalid")]
    InvalidIterator,

    /// The store or batch was closed before this call.
    #[error("store is closed")]
    Closed,

    /// The backend deliberately does not implement this operation.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// No backend is registered under the requested name.
    #[error("unknown backend: {0}")]
    UnknownBackend(String),
}

impl StoreError {
    /// True for errors that indicate caller misuse rather than a storage
    /// failure.
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidIterator | Self::Closed)
    }

    /// True when the backend stubs out the requested operation.
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(e: redb::DatabaseError) -> Self {
        Self::Engine(e.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Engine(e.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(e: redb::TableError) -> Self {
        Self::Engine(e.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(e: redb::StorageError) -> Self {
        Self::Engine(e.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(e: redb::CommitError) -> Self {
        Self::Engine(e.to_string())
    }
}
