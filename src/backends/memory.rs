//! In-memory storage backend.
//!
//! A `BTreeMap` behind a read-write lock. Iterators snapshot their bounded
//! range at construction, which stands in for the read transaction an
//! on-disk backend would hold. Useful for tests and ephemeral workloads;
//! contents are lost on drop.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::db::{
    Batch, Database, DbIterator, Direction, PendingOp, StagingBuffer, StoreError, StoreResult,
};

type SharedMap = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

/// Registry constructor for the `memory` backend. The name and directory
/// are ignored; every store starts empty.
pub(crate) fn create(_name: &str, _dir: &Path) -> StoreResult<Box<dyn Database>> {
    Ok(Box::new(MemStore::new()))
}

/// An in-memory store with the same contract semantics as the on-disk
/// backends.
pub struct MemStore {
    map: Option<SharedMap>,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { map: Some(Arc::new(RwLock::new(BTreeMap::new()))) }
    }

    fn map(&self) -> StoreResult<&SharedMap> {
        self.map.as_ref().ok_or(StoreError::Closed)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for MemStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.map()?.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.map()?.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.map()?.write().remove(key);
        Ok(())
    }

    fn batch(&self) -> StoreResult<Box<dyn Batch>> {
        Ok(Box::new(MemBatch { map: Arc::clone(self.map()?), staged: StagingBuffer::new() }))
    }

    fn iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> StoreResult<Box<dyn DbIterator>> {
        Ok(Box::new(MemIterator::new(self.map()?, start, end, Direction::Forward)))
    }

    fn reverse_iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> StoreResult<Box<dyn DbIterator>> {
        Ok(Box::new(MemIterator::new(self.map()?, start, end, Direction::Reverse)))
    }

    fn close(&mut self) -> StoreResult<()> {
        self.map.take();
        Ok(())
    }

    fn print(&self) -> StoreResult<()> {
        let map = self.map()?.read();
        for (key, value) in map.iter() {
            debug!(key = ?key, value = ?value, "entry");
        }
        Ok(())
    }

    fn stats(&self) -> StoreResult<BTreeMap<String, String>> {
        let entries = self.map()?.read().len();
        let mut stats = BTreeMap::new();
        stats.insert("backend".to_string(), "memory".to_string());
        stats.insert("entries".to_string(), entries.to_string());
        Ok(stats)
    }
}

/// A staged group of writes applied under one write lock, so the flush is
/// atomically visible to readers.
struct MemBatch {
    map: SharedMap,
    staged: StagingBuffer,
}

impl Batch for MemBatch {
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.staged.set(key, value)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.staged.delete(key)
    }

    fn write(&self) -> StoreResult<()> {
        let ops = self.staged.drain()?;
        let mut map = self.map.write();
        for (key, op) in ops {
            match op {
                PendingOp::Put(value) => {
                    map.insert(key, value);
                }
                PendingOp::Delete => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn close(&self) {
        self.staged.close();
    }
}

/// Iterator over a snapshot of the bounded range, with the same
/// direction and sticky-validity rules as the on-disk backends.
pub struct MemIterator {
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
    current: Option<(Vec<u8>, Vec<u8>)>,
    start: Option<Vec<u8>>,
    end: Option<Vec<u8>>,
    direction: Direction,
    invalid: bool,
}

impl MemIterator {
    fn new(
        map: &SharedMap,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        direction: Direction,
    ) -> Self {
        // Same split as the redb iterator: one bound baked into the range,
        // the other checked lazily in position().
        let guard = map.read();
        let entries: Vec<(Vec<u8>, Vec<u8>)> = match direction {
            Direction::Forward => {
                let lo: Bound<&[u8]> = start.map_or(Bound::Unbounded, Bound::Included);
                guard
                    .range::<[u8], _>((lo, Bound::Unbounded))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            }
            Direction::Reverse => {
                let hi: Bound<&[u8]> = end.map_or(Bound::Unbounded, Bound::Excluded);
                guard
                    .range::<[u8], _>((Bound::Unbounded, hi))
                    .rev()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            }
        };

        let mut iter = Self {
            entries: entries.into_iter(),
            current: None,
            start: start.map(<[u8]>::to_vec),
            end: end.map(<[u8]>::to_vec),
            direction,
            invalid: false,
        };
        iter.position();
        iter
    }

    fn position(&mut self) {
        match self.entries.next() {
            Some((key, value))
                if self.direction.within(self.start.as_deref(), self.end.as_deref(), &key) =>
            {
                self.current = Some((key, value));
            }
            _ => {
                self.current = None;
                self.invalid = true;
            }
        }
    }
}

impl DbIterator for MemIterator {
    fn valid(&self) -> bool {
        !self.invalid && self.current.is_some()
    }

    fn next(&mut self) -> StoreResult<()> {
        if !self.valid() {
            return Err(StoreError::InvalidIterator);
        }
        self.position();
        Ok(())
    }

    fn key(&self) -> StoreResult<&[u8]> {
        match &self.current {
            Some((key, _)) if !self.invalid => Ok(key.as_slice()),
            _ => Err(StoreError::InvalidIterator),
        }
    }

    fn value(&self) -> StoreResult<&[u8]> {
        match &self.current {
            Some((_, value)) if !self.invalid => Ok(value.as_slice()),
            _ => Err(StoreError::InvalidIterator),
        }
    }

    fn domain(&self) -> (Option<&[u8]>, Option<&[u8]>) {
        (self.start.as_deref(), self.end.as_deref())
    }

    fn close(&mut self) {
        self.current = None;
        self.invalid = true;
        self.entries = Vec::new().into_iter();
    }
}
