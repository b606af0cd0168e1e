//! RawIndex: open-addressing bucket array mapping cached hashes to slot keys.
//!
//! Buckets carry only `(hash, slot)` pairs; entries live in the table's
//! slot storage. Rehashing re-homes buckets by their cached hash, so growth
//! never calls into `Hash`, `Eq`, or `Drop` of user types.
//!
//! Collision resolution is linear probing over a power-of-two bucket count.
//! The load counted against the growth limit includes tombstones, and the
//! limit is capped at `buckets - 1`, so every probe sequence reaches an
//! empty bucket.

use crate::error::ReserveError;
use core::mem;
use slotmap::DefaultKey;
use tracing::{debug, trace};

/// Default maximum load factor (7/8).
pub(crate) const DEFAULT_MAX_LOAD: f64 = 0.875;

const MIN_BUCKETS: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Bucket {
    Empty,
    Deleted,
    Full { hash: u64, slot: DefaultKey },
}

#[derive(Clone, Debug)]
pub(crate) struct RawIndex {
    buckets: Box<[Bucket]>,
    items: usize,
    tombstones: usize,
    max_load: f64,
}

/// Number of live buckets allowed in `buckets` before a rehash is required.
fn growth_limit(buckets: usize, max_load: f64) -> usize {
    if buckets == 0 {
        return 0;
    }
    ((buckets as f64 * max_load) as usize).min(buckets - 1)
}

/// Smallest power-of-two bucket count whose growth limit admits `items`.
fn buckets_for(items: usize, max_load: f64) -> Result<usize, ReserveError> {
    let raw = (items as f64 / max_load).ceil();
    if !(raw < isize::MAX as f64) {
        return Err(ReserveError::CapacityOverflow);
    }
    let mut buckets = (raw as usize)
        .max(MIN_BUCKETS)
        .checked_next_power_of_two()
        .ok_or(ReserveError::CapacityOverflow)?;
    while growth_limit(buckets, max_load) < items {
        buckets = buckets
            .checked_mul(2)
            .ok_or(ReserveError::CapacityOverflow)?;
    }
    match buckets.checked_mul(mem::size_of::<Bucket>()) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(buckets),
        _ => Err(ReserveError::CapacityOverflow),
    }
}

fn empty_buckets(count: usize) -> Box<[Bucket]> {
    vec![Bucket::Empty; count].into_boxed_slice()
}

impl RawIndex {
    /// Empty index; no buckets are allocated until the first reserve.
    pub(crate) fn new(max_load: f64) -> Self {
        Self {
            buckets: Box::new([]),
            items: 0,
            tombstones: 0,
            max_load,
        }
    }

    /// Panics if `capacity` cannot be indexed; allocation failure is fatal.
    pub(crate) fn with_capacity(capacity: usize, max_load: f64) -> Self {
        let mut index = Self::new(max_load);
        if capacity > 0 {
            match buckets_for(capacity, max_load) {
                Ok(buckets) => index.buckets = empty_buckets(buckets),
                Err(err) => panic!("{err}"),
            }
        }
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.items
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        growth_limit(self.buckets.len(), self.max_load)
    }

    pub(crate) fn max_load(&self) -> f64 {
        self.max_load
    }

    #[cfg(test)]
    pub(crate) fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[inline]
    fn mask(&self) -> usize {
        self.buckets.len() - 1
    }

    /// Locate the bucket whose cached hash equals `hash` and whose slot
    /// satisfies `eq`. Returns the bucket position and its slot key.
    pub(crate) fn find(
        &self,
        hash: u64,
        mut eq: impl FnMut(DefaultKey) -> bool,
    ) -> Option<(usize, DefaultKey)> {
        if self.buckets.is_empty() {
            return None;
        }
        let mask = self.mask();
        let mut pos = hash as usize & mask;
        for _ in 0..self.buckets.len() {
            match self.buckets[pos] {
                Bucket::Empty => return None,
                Bucket::Full { hash: h, slot } if h == hash && eq(slot) => {
                    return Some((pos, slot));
                }
                _ => {}
            }
            pos = (pos + 1) & mask;
        }
        None
    }

    /// First empty or deleted bucket on the probe sequence of `hash`.
    fn insert_pos(&self, hash: u64) -> usize {
        debug_assert!(self.items < self.buckets.len());
        let mask = self.mask();
        let mut pos = hash as usize & mask;
        while let Bucket::Full { .. } = self.buckets[pos] {
            pos = (pos + 1) & mask;
        }
        pos
    }

    /// Link `slot` under `hash`. The caller guarantees the key is absent
    /// and that `reserve(1)` succeeded since the last structural change.
    pub(crate) fn insert(&mut self, hash: u64, slot: DefaultKey) -> usize {
        debug_assert!(self.items + self.tombstones < self.capacity() + 1);
        let pos = self.insert_pos(hash);
        if self.buckets[pos] == Bucket::Deleted {
            self.tombstones -= 1;
        }
        self.buckets[pos] = Bucket::Full { hash, slot };
        self.items += 1;
        pos
    }

    /// Unlink the full bucket at `pos` and return its slot key.
    ///
    /// A bucket followed by an empty bucket ends every probe sequence that
    /// reaches it, so it becomes empty instead of a tombstone, and so do any
    /// tombstones directly before it.
    pub(crate) fn erase(&mut self, pos: usize) -> DefaultKey {
        let slot = match self.buckets[pos] {
            Bucket::Full { slot, .. } => slot,
            other => unreachable!("erase of non-full bucket {pos}: {other:?}"),
        };
        self.items -= 1;
        let mask = self.mask();
        if self.buckets[(pos + 1) & mask] != Bucket::Empty {
            self.buckets[pos] = Bucket::Deleted;
            self.tombstones += 1;
            return slot;
        }
        self.buckets[pos] = Bucket::Empty;
        let mut prev = pos.wrapping_sub(1) & mask;
        while self.buckets[prev] == Bucket::Deleted {
            self.buckets[prev] = Bucket::Empty;
            self.tombstones -= 1;
            prev = prev.wrapping_sub(1) & mask;
        }
        slot
    }

    /// Ensure `additional` more keys can be linked without exceeding the
    /// load limit. Purges tombstones in place when the live count is small
    /// enough, otherwise at least doubles the bucket count.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        let needed = self
            .items
            .checked_add(additional)
            .ok_or(ReserveError::CapacityOverflow)?;
        let limit = self.capacity();
        if needed
            .checked_add(self.tombstones)
            .is_some_and(|load| load <= limit)
        {
            return Ok(());
        }
        let target = if needed <= limit / 2 {
            self.buckets.len()
        } else {
            buckets_for(needed.max(limit.saturating_add(1)), self.max_load)?
        };
        self.rehash(target);
        Ok(())
    }

    /// Rebuild at the smallest bucket count that holds the live keys.
    pub(crate) fn shrink_to_fit(&mut self) {
        if self.items == 0 {
            if !self.buckets.is_empty() {
                debug!(from = self.buckets.len(), "released empty bucket index");
            }
            self.buckets = Box::new([]);
            self.tombstones = 0;
            return;
        }
        let target = match buckets_for(self.items, self.max_load) {
            Ok(target) => target,
            Err(_) => return,
        };
        if target < self.buckets.len() || self.tombstones > 0 {
            debug!(
                from = self.buckets.len(),
                to = target,
                items = self.items,
                "compacting bucket index"
            );
            self.rehash(target.min(self.buckets.len()));
        }
    }

    /// Mark every bucket empty; keeps the allocation.
    pub(crate) fn clear(&mut self) {
        self.buckets.fill(Bucket::Empty);
        self.items = 0;
        self.tombstones = 0;
    }

    fn rehash(&mut self, buckets: usize) {
        let old = mem::replace(&mut self.buckets, empty_buckets(buckets));
        let purged = mem::take(&mut self.tombstones);
        for bucket in old.iter() {
            if let Bucket::Full { hash, .. } = *bucket {
                let pos = self.insert_pos(hash);
                self.buckets[pos] = *bucket;
            }
        }
        trace!(
            from = old.len(),
            to = buckets,
            items = self.items,
            purged,
            "rehashed bucket index"
        );
    }
}
