//! # Least Frequently Used (LFU) cache policy with frequency aging.
//!
//! Entries are grouped into frequency buckets (see
//! [`FreqBuckets`](crate::ds::FreqBuckets)); eviction takes the least
//! recent entry of the least frequent bucket. On top of the buckets this
//! policy runs a compaction scheme: when the average frequency across the
//! resident set climbs past a configurable ceiling, every frequency is
//! compressed by `max_avg_freq / 2` (floored at 1). Without it, long-lived
//! hot keys accumulate counts no newcomer could ever compete with and pin
//! themselves into the cache forever.
//!
//! ## Operations
//!
//! | Method        | Complexity | Description                                  |
//! |---------------|------------|----------------------------------------------|
//! | `insert(k,v)` | O(1)*      | Insert at freq 1 or overwrite (+1 access)    |
//! | `get(&k)`     | O(1)*      | Return value, move one bucket up             |
//! | `remove(&k)`  | O(1)       | Unlink an arbitrary entry                    |
//! | `purge()`     | O(n)       | Drop every entry and reset totals            |
//!
//! *The aging sweep itself is O(n), amortized over the accesses that grew
//! the average.
//!
//! ## Thread Safety
//!
//! [`LfuCore`] is single-threaded; [`LfuCache`] holds one
//! `parking_lot::Mutex` for the whole duration of each operation.

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::ds::FreqBuckets;
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{LfuMetrics, LfuMetricsSnapshot};
use crate::traits::CachePolicy;

/// Default ceiling on the average frequency before a compaction sweep.
///
/// Large enough that workloads without extreme skew never trigger aging;
/// pass a small value to [`LfuCore::with_max_avg_freq`] to age aggressively.
pub const DEFAULT_MAX_AVG_FREQ: u64 = 1_000_000;

/// Single-threaded LFU core with frequency aging.
///
/// # Example
///
/// ```
/// use cachemux::policy::lfu::LfuCore;
///
/// let mut cache: LfuCore<u32, &str> = LfuCore::new(2);
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.get(&1); // freq(1) = 2, freq(2) = 1
///
/// cache.insert(3, "c"); // evicts 2, the least frequent
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// ```
pub struct LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    buckets: FreqBuckets<K, V>,
    capacity: usize,
    max_avg_freq: u64,
    total_freq: u64,
    #[cfg(feature = "metrics")]
    metrics: LfuMetrics,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU core with the default aging ceiling.
    pub fn new(capacity: usize) -> Self {
        Self::with_max_avg_freq(capacity, DEFAULT_MAX_AVG_FREQ)
    }

    /// Creates an LFU core with an explicit aging ceiling.
    ///
    /// A capacity of 0 creates an inert cache. Small `max_avg_freq` values
    /// accelerate aging; the sweep subtracts `max_avg_freq / 2` from every
    /// resident frequency (floored at 1).
    pub fn with_max_avg_freq(capacity: usize, max_avg_freq: u64) -> Self {
        LfuCore {
            buckets: FreqBuckets::new(),
            capacity,
            max_avg_freq,
            total_freq: 0,
            #[cfg(feature = "metrics")]
            metrics: LfuMetrics::default(),
        }
    }

    /// Inserts or overwrites an entry, returning the previous value.
    ///
    /// An overwrite counts as an access (the entry moves one bucket up).
    /// Inserting a new key into a full cache first evicts the front of the
    /// least-frequent bucket.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.buckets.contains(&key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.insert_updates += 1;
            }
            let previous = std::mem::replace(self.buckets.get_mut(&key)?, value);
            self.touch(&key);
            return Some(previous);
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.insert_new += 1;
        }

        if self.buckets.len() >= self.capacity {
            if let Some((_key, _value, freq)) = self.buckets.pop_min() {
                self.total_freq = self.total_freq.saturating_sub(freq);
                #[cfg(feature = "metrics")]
                {
                    self.metrics.evicted_entries += 1;
                }
            }
        }

        self.buckets.insert(key, value);
        self.record_access();
        None
    }

    /// Returns the value and records the access.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.buckets.contains(key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.get_misses += 1;
            }
            return None;
        }
        #[cfg(feature = "metrics")]
        {
            self.metrics.get_hits += 1;
        }
        self.touch(key);
        self.buckets.get(key)
    }

    /// Returns the value without recording an access.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.buckets.get(key)
    }

    /// Removes an entry, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (value, freq) = self.buckets.remove(key)?;
        self.total_freq = self.total_freq.saturating_sub(freq);
        Some(value)
    }

    /// Returns `true` if the key is resident. Does not record an access.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    /// Current access frequency of a key, if resident.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.freq(key)
    }

    /// Smallest frequency with a resident entry, or 0 when empty.
    #[inline]
    pub fn min_freq(&self) -> u64 {
        self.buckets.min_freq()
    }

    /// Current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` when no entries are resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all entries and resets the frequency totals.
    pub fn purge(&mut self) {
        self.buckets.clear();
        self.total_freq = 0;
    }

    /// Validates the bucket structure and the frequency totals.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.buckets.len() > self.capacity {
            return Err(InvariantError::new("resident set exceeds capacity"));
        }
        self.buckets.check_invariants()
    }

    #[cfg(feature = "metrics")]
    /// Copies out the operation counters together with occupancy.
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        LfuMetricsSnapshot {
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_new: self.metrics.insert_new,
            insert_updates: self.metrics.insert_updates,
            evicted_entries: self.metrics.evicted_entries,
            aging_sweeps: self.metrics.aging_sweeps,
            cache_len: self.buckets.len(),
            capacity: self.capacity,
        }
    }

    /// Move the key one bucket up and account for the access.
    fn touch(&mut self, key: &K) {
        self.buckets.touch(key);
        self.record_access();
    }

    /// Accounts one access and runs the aging sweep when the average
    /// frequency crosses the ceiling.
    fn record_access(&mut self) {
        self.total_freq = self.total_freq.saturating_add(1);
        let len = self.buckets.len() as u64;
        if len == 0 {
            return;
        }
        let avg_freq = self.total_freq / len;
        if avg_freq > self.max_avg_freq {
            // Recompute the total from the post-sweep frequencies so one
            // threshold crossing produces exactly one sweep.
            self.total_freq = self.buckets.age(self.max_avg_freq / 2);
            #[cfg(feature = "metrics")]
            {
                self.metrics.aging_sweeps += 1;
            }
        }
    }
}

impl<K, V> fmt::Debug for LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCore")
            .field("len", &self.buckets.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.buckets.min_freq())
            .field("total_freq", &self.total_freq)
            .finish_non_exhaustive()
    }
}

/// Thread-safe LFU cache with frequency aging.
///
/// # Example
///
/// ```
/// use cachemux::policy::lfu::LfuCache;
/// use cachemux::traits::CachePolicy;
///
/// let cache: LfuCache<u32, String> = LfuCache::new(2);
/// cache.put(1, "a".to_string());
/// cache.put(2, "b".to_string());
/// cache.get(&1);
/// cache.get(&1);
/// cache.get(&2);
///
/// cache.put(3, "c".to_string()); // evicts 2 (freq 2 < freq 3)
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&1), Some("a".to_string()));
/// ```
pub struct LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<LfuCore<K, V>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a thread-safe LFU cache with the default aging ceiling.
    pub fn new(capacity: usize) -> Self {
        LfuCache {
            inner: Mutex::new(LfuCore::new(capacity)),
        }
    }

    /// Creates a thread-safe LFU cache with an explicit aging ceiling.
    pub fn with_max_avg_freq(capacity: usize, max_avg_freq: u64) -> Self {
        LfuCache {
            inner: Mutex::new(LfuCore::with_max_avg_freq(capacity, max_avg_freq)),
        }
    }

    /// Inserts or overwrites an entry. Counts as an access.
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().insert(key, value);
    }

    /// Returns a clone of the value and records the access.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    /// Returns `true` if the key is resident. Does not record an access.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Current access frequency of a key, if resident.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` when no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Drops all entries and resets the frequency totals.
    pub fn purge(&self) {
        self.inner.lock().purge();
    }

    #[cfg(feature = "metrics")]
    /// Copies out the operation counters together with occupancy.
    pub fn metrics_snapshot(&self) -> LfuMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> CachePolicy<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn put(&self, key: K, value: V) {
        LfuCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LfuCache::get(self, key)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LfuCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
