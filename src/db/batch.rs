//! Batch staging buffer shared by backend batch implementations.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::{StoreError, StoreResult};

/// A staged mutation for one key.
///
/// A deletion is its own marker rather than the absence of an entry, so
/// `set` followed by `delete` on the same key survives deduplication
/// instead of collapsing to a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOp {
    /// Write this value on flush.
    Put(Vec<u8>),
    /// Remove the key on flush.
    Delete,
}

/// Key-deduplicating staging map with last-write-wins semantics.
///
/// Safe for concurrent staging from multiple threads; each backend wraps
/// one of these and replays the drained operations inside a single engine
/// transaction. After [`close`](StagingBuffer::close) every call fails
/// with [`StoreError::Closed`].
#[derive(Debug)]
pub struct StagingBuffer {
    ops: Mutex<Option<BTreeMap<Vec<u8>, PendingOp>>>,
}

impl StagingBuffer {
    /// Create an empty, open buffer.
    pub fn new() -> Self {
        Self { ops: Mutex::new(Some(BTreeMap::new())) }
    }

    /// Stage an upsert, replacing any prior operation for `key`.
    pub fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut guard = self.ops.lock();
        let ops = guard.as_mut().ok_or(StoreError::Closed)?;
        ops.insert(key.to_vec(), PendingOp::Put(value.to_vec()));
        Ok(())
    }

    /// Stage a deletion, replacing any prior operation for `key`.
    pub fn delete(&self, key: &[u8]) -> StoreResult<()> {
        let mut guard = self.ops.lock();
        let ops = guard.as_mut().ok_or(StoreError::Closed)?;
        ops.insert(key.to_vec(), PendingOp::Delete);
        Ok(())
    }

    /// Take all staged operations for a flush, leaving the buffer empty
    /// and open for further staging.
    pub fn drain(&self) -> StoreResult<BTreeMap<Vec<u8>, PendingOp>> {
        let mut guard = self.ops.lock();
        let ops = guard.as_mut().ok_or(StoreError::Closed)?;
        Ok(std::mem::take(ops))
    }

    /// Number of staged operations.
    pub fn len(&self) -> usize {
        self.ops.lock().as_ref().map_or(0, BTreeMap::len)
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the buffer. Idempotent.
    pub fn close(&self) {
        *self.ops.lock() = None;
    }
}

impl Default for StagingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
