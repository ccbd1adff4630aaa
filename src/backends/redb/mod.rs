//! Redb storage backend.
//!
//! Binds the storage contract to redb, a pure-Rust transactional
//! single-file embedded database, consumed only through its transaction,
//! table, and range primitives.

mod batch;
mod iter;
mod store;

use std::path::Path;

use crate::db::{Database, StoreResult};

pub use batch::RedbBatch;
pub use iter::RedbIterator;
pub use store::{RedbOptions, RedbStore};

/// Registry constructor for the `redb` backend.
pub(crate) fn create(name: &str, dir: &Path) -> StoreResult<Box<dyn Database>> {
    Ok(Box::new(RedbStore::open(name, dir)?))
}
