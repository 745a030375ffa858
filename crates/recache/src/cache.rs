//! Bounded cache combining a key index with the recency ledger.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;
use tracing::warn;

use crate::ledger::{Iter, UsageLedger};
use crate::stats::CacheStats;

/// Bounded key/value cache with least-recently-used eviction.
///
/// Lookups go through a hash index from key to ledger handle; recency order
/// lives in the ledger, whose tail is always the next eviction candidate.
/// `get` and `put` are O(1) and promote the touched entry to most recently
/// used. The entry count never exceeds the configured capacity.
///
/// The cache is single-owner: both operations take `&mut self` and there is
/// no internal synchronization. Callers needing shared access must provide
/// their own mutual exclusion around the whole instance.
pub struct BoundedCache<K, V> {
    /// Key -> ledger handle
    index: HashMap<K, usize, RandomState>,
    /// Recency chain; tail is the eviction candidate
    ledger: UsageLedger<K, V>,
    /// Maximum number of entries, fixed at construction
    capacity: usize,
    /// Hit/miss/eviction counters
    stats: CacheStats,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a cache that holds at most `capacity` entries.
    ///
    /// A requested capacity of 0 is coerced to 1 and reported through a
    /// `tracing` warning rather than treated as an error.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries to keep
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            warn!("requested cache capacity 0 is below the minimum, using 1");
        }
        let capacity = capacity.max(1);

        Self {
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            ledger: UsageLedger::with_capacity(capacity),
            capacity,
            stats: CacheStats::new(),
        }
    }

    /// Look up a key, refreshing its recency on a hit.
    ///
    /// # Arguments
    /// * `key` - Key to look up
    ///
    /// # Returns
    /// * `Some(&value)` if present, `None` on a miss. A miss leaves the
    ///   cache contents and recency order untouched.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if let Some(&handle) = self.index.get(key) {
            self.ledger.promote(handle);
            self.stats.record_hit();
            Some(self.ledger.value(handle))
        } else {
            self.stats.record_miss();
            None
        }
    }

    /// Insert or update a key, evicting the least-recently-used entry if
    /// the cache is full.
    ///
    /// An existing key is updated in place and promoted to most recently
    /// used; the entry count does not change and nothing is evicted. A new
    /// key first evicts the ledger tail when the cache is at capacity.
    ///
    /// # Arguments
    /// * `key` - Key to store under
    /// * `value` - Value to store
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&handle) = self.index.get(&key) {
            *self.ledger.value_mut(handle) = value;
            self.ledger.promote(handle);
            self.stats.record_update();
            return;
        }

        if self.index.len() >= self.capacity {
            self.evict();
        }

        let handle = self.ledger.alloc(key.clone(), value);
        self.ledger.prepend(handle);
        self.index.insert(key, handle);
        self.stats.record_insert();
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let handle = self.index.remove(key)?;
        self.ledger.remove(handle);
        let (_, value) = self.ledger.release(handle);
        Some(value)
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of entries the cache holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over `(key, value)` pairs from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.ledger.iter()
    }

    /// Cache effectiveness counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Drop all entries and reset the statistics.
    pub fn clear(&mut self) {
        self.index.clear();
        self.ledger.clear();
        self.stats.reset();
    }

    fn evict(&mut self) {
        if let Some(tail) = self.ledger.tail() {
            self.ledger.remove(tail);
            let (key, _value) = self.ledger.release(tail);
            self.index.remove(&key);
            self.stats.record_eviction();
        }
    }
}
