//! Core storage contract traits.
//!
//! All three traits are object-safe so the registry can hand out
//! `Box<dyn Database>` without callers knowing which backend they got.

use std::collections::BTreeMap;

use super::StoreResult;

/// Scan direction of an iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending key order.
    Forward,
    /// Descending key order.
    Reverse,
}

impl Direction {
    /// Whether `key` is still inside the `[start, end)` domain for this
    /// direction.
    ///
    /// Each direction bakes one bound into the engine-level seek and
    /// enforces the other here on every positioning: forward scans seek
    /// from the inclusive `start` and stop before the exclusive `end`;
    /// reverse scans anchor below the exclusive `end` and stop once keys
    /// drop under the inclusive `start`.
    pub(crate) fn within(self, start: Option<&[u8]>, end: Option<&[u8]>, key: &[u8]) -> bool {
        match self {
            Self::Forward => end.map_or(true, |e| key < e),
            Self::Reverse => start.map_or(true, |s| key >= s),
        }
    }
}

/// A key-value store scoped to a single fixed namespace.
///
/// Every direct read or write wraps exactly one engine transaction;
/// concurrency control is delegated entirely to the backend. Keys and
/// values are raw byte sequences, and the empty sequence is a first-class
/// key/value distinct from "absent".
pub trait Database: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if there is no entry.
    ///
    /// `Some(vec![])` is an empty value, not a missing one.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Whether an entry exists under `key`; defined as [`Database::get`]
    /// returning an entry.
    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Store `value` under `key`, overwriting any previous entry.
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Durable variant of [`Database::set`]. Backends whose commits are
    /// already fsync-durable alias this to `set`; it exists for interface
    /// parity with backends that distinguish durability levels.
    fn set_sync(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.set(key, value)
    }

    /// Remove the entry under `key`. Removing a missing key is not an
    /// error.
    fn delete(&self, key: &[u8]) -> StoreResult<()>;

    /// Durable variant of [`Database::delete`]; see [`Database::set_sync`].
    fn delete_sync(&self, key: &[u8]) -> StoreResult<()> {
        self.delete(key)
    }

    /// Create an empty batch bound to this store.
    fn batch(&self) -> StoreResult<Box<dyn Batch>>;

    /// Create a forward iterator over the `[start, end)` domain. `None`
    /// bounds are unbounded.
    fn iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> StoreResult<Box<dyn DbIterator>>;

    /// Create a reverse iterator over the `[start, end)` domain, walking
    /// keys in descending order starting below `end`.
    fn reverse_iterator(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
    ) -> StoreResult<Box<dyn DbIterator>>;

    /// Release the engine handle. Idempotent; every later operation fails
    /// with [`StoreError::Closed`]. Not safe to call concurrently with
    /// in-flight operations.
    ///
    /// [`StoreError::Closed`]: super::StoreError::Closed
    fn close(&mut self) -> StoreResult<()>;

    /// Dump the store contents to the log. Backends may stub this with
    /// [`StoreError::Unsupported`].
    ///
    /// [`StoreError::Unsupported`]: super::StoreError::Unsupported
    fn print(&self) -> StoreResult<()>;

    /// Backend statistics as string pairs. Backends may stub this with
    /// [`StoreError::Unsupported`].
    ///
    /// [`StoreError::Unsupported`]: super::StoreError::Unsupported
    fn stats(&self) -> StoreResult<BTreeMap<String, String>>;
}

/// A client-side staging buffer for writes, flushed as one atomic group.
///
/// Staging is keyed and deduplicating: the last operation recorded for a
/// key wins, and relative order between distinct keys is not preserved
/// across the flush. Staging calls take `&self` so multiple threads can
/// stage into one batch before a single flush.
pub trait Batch: Send + Sync {
    /// Stage an upsert of `key`, replacing any previously staged operation
    /// for it.
    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Stage a deletion of `key`, replacing any previously staged
    /// operation for it. A staged deletion is its own marker; it is never
    /// collapsed into "nothing staged".
    fn delete(&self, key: &[u8]) -> StoreResult<()>;

    /// Flush all staged operations in one engine transaction. They become
    /// visible to readers atomically. The buffer is drained; the batch can
    /// be reused for further staging.
    fn write(&self) -> StoreResult<()>;

    /// Durable variant of [`Batch::write`]; see [`Database::set_sync`].
    fn write_sync(&self) -> StoreResult<()> {
        self.write()
    }

    /// Release the staging buffer. Staging or flushing afterwards fails
    /// with [`StoreError::Closed`].
    ///
    /// [`StoreError::Closed`]: super::StoreError::Closed
    fn close(&self);
}

/// An ordered, lazily-advancing iterator over a `[start, end)` key domain.
///
/// The iterator is a one-way state machine: once it stops being valid it
/// never becomes valid again (sticky invalidity). Calling [`key`],
/// [`value`], or [`next`] while invalid is caller misuse and fails with
/// [`InvalidIterator`] on every call, not just the first.
///
/// [`key`]: DbIterator::key
/// [`value`]: DbIterator::value
/// [`next`]: DbIterator::next
/// [`InvalidIterator`]: super::StoreError::InvalidIterator
pub trait DbIterator {
    /// Whether the iterator is positioned on an entry inside its domain.
    fn valid(&self) -> bool;

    /// Advance one entry in the iterator's direction.
    fn next(&mut self) -> StoreResult<()>;

    /// The key of the current entry.
    fn key(&self) -> StoreResult<&[u8]>;

    /// The value of the current entry.
    fn value(&self) -> StoreResult<&[u8]>;

    /// The original `(start, end)` bounds, unmodified.
    fn domain(&self) -> (Option<&[u8]>, Option<&[u8]>);

    /// Release the iterator's backing resources, including the read
    /// transaction it holds open. Also performed on drop; close exists so
    /// long-lived callers can release the transaction deterministically.
    fn close(&mut self);
}
