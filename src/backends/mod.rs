//! Concrete backend implementations.
//!
//! # Available Backends
//!
//! - [`redb`] - Transactional single-file embedded database (the default
//!   on-disk backend)
//! - [`memory`] - `BTreeMap`-backed store for tests and ephemeral workloads

pub mod memory;
pub mod redb;

pub use memory::MemStore;
pub use self::redb::{RedbBatch, RedbIterator, RedbOptions, RedbStore};
