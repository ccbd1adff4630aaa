//! Redb-backed store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database as Engine, TableDefinition};
use tracing::debug;

use crate::db::{Batch, Database, DbIterator, Direction, StoreError, StoreResult};

use super::batch::RedbBatch;
use super::iter::RedbIterator;

/// The fixed namespace all keys live under. Created once at open time;
/// there is no dynamic namespace switching.
pub(crate) const STORE_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("kv");

/// Configuration options for the redb backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedbOptions {
    /// Engine cache size in bytes. If not set, uses redb's default.
    pub cache_size: Option<usize>,
}

impl RedbOptions {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine cache size.
    #[must_use]
    pub const fn cache_size(mut self, bytes: usize) -> Self {
        self.cache_size = Some(bytes);
        self
    }
}

/// A store backed by a single redb database file.
///
/// Every direct read or write wraps one engine transaction; redb's default
/// commit durability is already fsync-equivalent, so the `*_sync` variants
/// alias their plain counterparts.
pub struct RedbStore {
    /// The engine handle; `None` once the store is closed. Shared with
    /// batches so they can flush after the store handle moved elsewhere.
    engine: Option<Arc<Engine>>,
    path: PathBuf,
}

impl RedbStore {
    /// Open or create the store `name` in `dir` (file `<dir>/<name>.redb`)
    /// with default options.
    pub fn open(name: &str, dir: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_opts(name, dir, RedbOptions::default())
    }

    /// Open or create the store with custom options.
    pub fn open_with_opts(
        name: &str,
        dir: impl AsRef<Path>,
        opts: RedbOptions,
    ) -> StoreResult<Self> {
        let path = dir.as_ref().join(format!("{name}.redb"));

        let mut builder = Engine::builder();
        if let Some(cache_size) = opts.cache_size {
            builder.set_cache_size(cache_size);
        }
        let engine = builder.create(&path)?;

        Self::with_engine(engine, path)
    }

    /// Create an in-memory store for testing. Contents are lost on drop.
    pub fn in_memory() -> StoreResult<Self> {
        let engine =
            Engine::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::with_engine(engine, PathBuf::new())
    }

    fn with_engine(engine: Engine, path: PathBuf) -> StoreResult<Self> {
        // The namespace must exist before any get/set/delete/iterator call
        // succeeds; opening the table is create-if-absent and idempotent.
        let tx = engine.begin_write()?;
        tx.open_table(STORE_TABLE)?;
        tx.commit()?;

        debug!(path = %path.display(), "opened redb store");
        Ok(Self { engine: Some(Arc::new(engine)), path })
    }

    /// The database file path; empty for in-memory stores.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn engine(&self) -> StoreResult<&Arc<Engine>> {
        self.engine.as_ref().ok_or(StoreError::Closed)
    }
}

impl Database for RedbStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let tx = self.engine()?.begin_read()?;
        let table = tx.open_table(STORE_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let tx = self.engine()?.begin_write()?;
        {
            let mut table = tx.open_table(STORE_TABLE)?;
            table.insert(key, value)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        let tx = self.engine()?.begin_write()?;
        {
            let mut table = tx.open_table(STORE_TABLE)?;
            table.remove(key)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn batch(&self) -> StoreResult<Box<dyn Batch>> {
        Ok(Box::new(RedbBatch::new(Arc::clone(self.engine()?))))
    }

    fn iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> StoreResult<Box<dyn DbIterator>> {
        Ok(Box::new(RedbIterator::new(self.engine()?, start, end, Direction::Forward)?))
    }

    fn reverse_iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> StoreResult<Box<dyn DbIterator>> {
        Ok(Box::new(RedbIterator::new(self.engine()?, start, end, Direction::Reverse)?))
    }

    fn close(&mut self) -> StoreResult<()> {
        if self.engine.take().is_some() {
            debug!(path = %self.path.display(), "closed redb store");
        }
        Ok(())
    }

    fn print(&self) -> StoreResult<()> {
        Err(StoreError::Unsupported("print"))
    }

    fn stats(&self) -> StoreResult<BTreeMap<String, String>> {
        Err(StoreError::Unsupported("stats"))
    }
}
