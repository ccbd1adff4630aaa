//! Range iterator for the redb backend.

use std::ops::Bound;

use redb::{Database as Engine, ReadTransaction};

use crate::db::{DbIterator, Direction, StoreError, StoreResult};

use super::store::STORE_TABLE;

type KvRange = redb::Range<'static, &'static [u8], &'static [u8]>;

/// An ordered iterator over a `[start, end)` key domain.
///
/// The iterator owns the read transaction backing its snapshot for its
/// entire scan. The transaction is released when the iterator is closed
/// and on drop, so no exit path leaves it open; an unreleased read
/// transaction would block the engine's space reclamation indefinitely.
///
/// One bound is baked into the engine-level range, the other is enforced
/// lazily on every positioning, with sticky invalidation on first failure:
///
/// - Forward: the range starts at the inclusive `start`; the exclusive
///   `end` is checked lazily.
/// - Reverse: the range ends below the exclusive `end` (the anchor is the
///   last entry under it, validated before being exposed); the inclusive
///   `start` is checked lazily.
pub struct RedbIterator {
    // declared before the transaction so cursor state drops first
    range: Option<KvRange>,
    tx: Option<ReadTransaction>,
    current: Option<(Vec<u8>, Vec<u8>)>,
    start: Option<Vec<u8>>,
    end: Option<Vec<u8>>,
    direction: Direction,
    invalid: bool,
}

impl RedbIterator {
    pub(crate) fn new(
        engine: &Engine,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        direction: Direction,
    ) -> StoreResult<Self> {
        let tx = engine.begin_read()?;
        let table = tx.open_table(STORE_TABLE)?;

        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = match direction {
            Direction::Forward => {
                (start.map_or(Bound::Unbounded, Bound::Included), Bound::Unbounded)
            }
            Direction::Reverse => {
                (Bound::Unbounded, end.map_or(Bound::Unbounded, Bound::Excluded))
            }
        };
        let range = table.range::<&[u8]>(bounds)?;

        let mut iter = Self {
            range: Some(range),
            tx: Some(tx),
            current: None,
            start: start.map(<[u8]>::to_vec),
            end: end.map(<[u8]>::to_vec),
            direction,
            invalid: false,
        };
        iter.position()?;
        Ok(iter)
    }

    /// Step the engine cursor one entry in our direction.
    fn advance(&mut self) -> StoreResult<Option<(Vec<u8>, Vec<u8>)>> {
        let Some(range) = self.range.as_mut() else {
            return Ok(None);
        };
        let entry = match self.direction {
            Direction::Forward => range.next(),
            Direction::Reverse => range.next_back(),
        };
        match entry {
            Some(Ok((key, value))) => Ok(Some((key.value().to_vec(), value.value().to_vec()))),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    /// Refresh the current entry, enforcing the lazily-checked bound.
    /// Exhaustion and bound violations both invalidate for good.
    fn position(&mut self) -> StoreResult<()> {
        match self.advance()? {
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
        Ok(())
    }
}

impl DbIterator for RedbIterator {
    fn valid(&self) -> bool {
        !self.invalid && self.current.is_some()
    }

    fn next(&mut self) -> StoreResult<()> {
        if !self.valid() {
            return Err(StoreError::InvalidIterator);
        }
        self.position()
    }

    fn key(&self) -> StoreResult<&[u8]> {
        if self.invalid {
            return Err(StoreError::InvalidIterator);
        }
        match &self.current {
            Some((key, _)) => Ok(key.as_slice()),
            None => Err(StoreError::InvalidIterator),
        }
    }

    fn value(&self) -> StoreResult<&[u8]> {
        if self.invalid {
            return Err(StoreError::InvalidIterator);
        }
        match &self.current {
            Some((_, value)) => Ok(value.as_slice()),
            None => Err(StoreError::InvalidIterator),
        }
    }

    fn domain(&self) -> (Option<&[u8]>, Option<&[u8]>) {
        (self.start.as_deref(), self.end.as_deref())
    }

    fn close(&mut self) {
        self.current = None;
        self.invalid = true;
        // cursor state first, then the read transaction it belongs to
        self.range = None;
        self.tx = None;
    }
}
