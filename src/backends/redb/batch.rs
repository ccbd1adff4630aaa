//! Batch implementation for the redb backend.

use std::sync::Arc;

use redb::Database as Engine;
use tracing::trace;

use crate::db::{Batch, PendingOp, StagingBuffer, StoreResult};

use super::store::STORE_TABLE;

/// A staged group of writes and deletes flushed inside one redb write
/// transaction.
///
/// The buffer holds no engine transaction between creation and flush; the
/// engine may coalesce concurrently flushing batches into one underlying
/// commit, but each batch's own operations always apply together.
pub struct RedbBatch {
    engine: Arc<Engine>,
    staged: StagingBuffer,
}

impl RedbBatch {
    pub(crate) fn new(engine: Arc<Engine>) -> Self {
        Self { engine, staged: StagingBuffer::new() }
    }
}

impl Batch for RedbBatch {
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.staged.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.staged.delete(key)
    }

    fn write(&self) -> StoreResult<()> {
        let ops = self.staged.drain()?;

        let tx = self.engine.begin_write()?;
        {
            let mut table = tx.open_table(STORE_TABLE)?;
            for (key, op) in &ops {
                match op {
                    PendingOp::Put(value) => {
                        table.insert(key.as_slice(), value.as_slice())?;
                    }
                    PendingOp::Delete => {
                        table.remove(key.as_slice())?;
                    }
                }
            }
        }
        tx.commit()?;

        trace!(ops = ops.len(), "flushed batch");
        Ok(())
    }

    fn close(&self) {
        self.staged.close();
    }
}
