//! # LRU-K cache policy (K-access promotion gate).
//!
//! A composition of two LRU caches that admits an entry into the main
//! resident set only after it has been accessed `k` times. One-shot scans
//! therefore never displace the working set: their keys accumulate history
//! counts but are gated out of the value cache.
//!
//! ## Architecture
//!
//! ```text
//!   put(k, v) / get(k)
//!        │
//!        ▼
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │ LrukCore                                                      │
//!   │                                                               │
//!   │   history: LruCore<K, u64>      access counters, bounded      │
//!   │   pending: FxHashMap<K, V>      values awaiting promotion     │
//!   │   main:    LruCore<K, V>        the resident value cache      │
//!   │                                                               │
//!   │   count reaches k  ──────────►  promote pending value to main │
//!   └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Promotion happens on whichever access makes the history counter reach
//! `k`, including the `put` that stores the value. A `get` that reaches
//! `k` promotes only if a value is pending, and then returns it. History
//! counters live in their own bounded LRU, so counts for keys that go cold
//! age out under pressure.

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{LrukMetrics, LrukMetricsSnapshot};
use crate::policy::lru::LruCore;
use crate::traits::CachePolicy;

/// Single-threaded LRU-K core.
///
/// Composes a main LRU value cache with a bounded history LRU of access
/// counters and a side map of pending values. Thread safety is provided by
/// [`LrukCache`].
///
/// # Example
///
/// ```
/// use cachemux::policy::lru_k::LrukCore;
///
/// let mut cache: LrukCore<u32, &str> = LrukCore::new(4, 16, 2);
///
/// cache.put(1, "a");               // first access: history only
/// assert!(!cache.contains(&1));
///
/// assert_eq!(cache.get(&1), Some("a")); // second access promotes
/// assert!(cache.contains(&1));
/// ```
pub struct LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    k: u64,
    main: LruCore<K, V>,
    history: LruCore<K, u64>,
    pending: FxHashMap<K, V>,
    #[cfg(feature = "metrics")]
    metrics: LrukMetrics,
}

impl<K, V> LrukCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an LRU-K core.
    ///
    /// - `capacity`: main value-cache capacity (0 yields an inert cache).
    /// - `history_capacity`: bound on tracked access counters.
    /// - `k`: accesses required for promotion, clamped to at least 1.
    pub fn new(capacity: usize, history_capacity: usize, k: u64) -> Self {
        LrukCore {
            k: k.max(1),
            main: LruCore::new(capacity),
            history: LruCore::new(history_capacity),
            pending: FxHashMap::default(),
            #[cfg(feature = "metrics")]
            metrics: LrukMetrics::default(),
        }
    }

    /// Inserts or overwrites an entry.
    ///
    /// A key already resident in the main cache is overwritten in place
    /// (counting as an access). Otherwise the access bumps the history
    /// counter and the value is remembered as pending; reaching `k` on this
    /// very access promotes immediately.
    pub fn put(&mut self, key: K, value: V) {
        if self.main.capacity() == 0 {
            return;
        }
        if self.main.contains(&key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.insert_updates += 1;
            }
            self.main.insert(key, value);
            return;
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.insert_new += 1;
        }

        let count = self.bump_history(&key);
        if count >= self.k {
            self.history.remove(&key);
            self.pending.remove(&key);
            self.promote(key, value);
        } else {
            self.pending.insert(key, value);
        }
    }

    /// Returns the value if resident (or promotable), recording the access.
    ///
    /// Every call bumps the history counter, hit or miss. A miss whose
    /// counter reaches `k` with a pending value promotes that value into
    /// the main cache and returns it.
    pub fn get(&mut self, key: &K) -> Option<V> {
        if self.main.capacity() == 0 {
            return None;
        }
        let in_main = self.main.get(key).cloned();
        let count = self.bump_history(key);

        if let Some(value) = in_main {
            #[cfg(feature = "metrics")]
            {
                self.metrics.get_hits += 1;
            }
            return Some(value);
        }

        if count >= self.k {
            if let Some(value) = self.pending.remove(key) {
                self.history.remove(key);
                self.promote(key.clone(), value.clone());
                #[cfg(feature = "metrics")]
                {
                    self.metrics.get_hits += 1;
                }
                return Some(value);
            }
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.get_misses += 1;
        }
        None
    }

    /// Returns `true` if the key is resident in the main cache.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    /// Resident entries in the main cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.main.len()
    }

    /// Returns `true` when the main cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Main value-cache capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.main.capacity()
    }

    /// The promotion threshold.
    #[inline]
    pub fn k_value(&self) -> u64 {
        self.k
    }

    /// Recorded access count for a key, if tracked.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        self.history.peek(key).copied()
    }

    /// Number of values awaiting promotion.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drops all entries, counters, and pending values.
    pub fn clear(&mut self) {
        self.main.clear();
        self.history.clear();
        self.pending.clear();
    }

    /// Validates the composed caches and the promotion-gate bookkeeping.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.main.check_invariants()?;
        self.history.check_invariants()?;
        for key in self.pending.keys() {
            if self.main.contains(key) {
                return Err(InvariantError::new("pending value for resident key"));
            }
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    /// Copies out the operation counters together with occupancy.
    pub fn metrics_snapshot(&self) -> LrukMetricsSnapshot {
        LrukMetricsSnapshot {
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_new: self.metrics.insert_new,
            insert_updates: self.metrics.insert_updates,
            promotions: self.metrics.promotions,
            cache_len: self.main.len(),
            capacity: self.main.capacity(),
        }
    }

    /// Bump the history counter for `key`, returning the new count.
    fn bump_history(&mut self, key: &K) -> u64 {
        let count = self.history.get(key).copied().unwrap_or(0) + 1;
        self.history.insert(key.clone(), count);
        count
    }

    fn promote(&mut self, key: K, value: V) {
        #[cfg(feature = "metrics")]
        {
            self.metrics.promotions += 1;
        }
        self.main.insert(key, value);
    }
}

impl<K, V> fmt::Debug for LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LrukCore")
            .field("k", &self.k)
            .field("len", &self.main.len())
            .field("capacity", &self.main.capacity())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

/// Thread-safe LRU-K cache.
///
/// # Example
///
/// ```
/// use cachemux::policy::lru_k::LrukCache;
/// use cachemux::traits::CachePolicy;
///
/// let cache: LrukCache<u32, String> = LrukCache::new(4, 16, 2);
///
/// cache.put(1, "a".to_string());
/// // One access so far: gated out of the main cache, but the second
/// // access reaches k=2 and promotes the pending value.
/// assert_eq!(cache.get(&1), Some("a".to_string()));
/// assert_eq!(cache.len(), 1);
/// ```
pub struct LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<LrukCore<K, V>>,
}

impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a thread-safe LRU-K cache.
    ///
    /// See [`LrukCore::new`] for the parameters.
    pub fn new(capacity: usize, history_capacity: usize, k: u64) -> Self {
        LrukCache {
            inner: Mutex::new(LrukCore::new(capacity, history_capacity, k)),
        }
    }

    /// Inserts or overwrites an entry (see [`LrukCore::put`]).
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Returns the value if resident or promotable (see [`LrukCore::get`]).
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    /// Returns `true` if the key is resident in the main cache.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Resident entries in the main cache.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` when the main cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Main value-cache capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// The promotion threshold.
    pub fn k_value(&self) -> u64 {
        self.inner.lock().k_value()
    }

    /// Drops all entries, counters, and pending values.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    #[cfg(feature = "metrics")]
    /// Copies out the operation counters together with occupancy.
    pub fn metrics_snapshot(&self) -> LrukMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> CachePolicy<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn put(&self, key: K, value: V) {
        LrukCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LrukCache::get(self, key)
    }

    fn len(&self) -> usize {
        LrukCache::len(self)
    }
}

impl<K, V> fmt::Debug for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LrukCache")
            .field("k", &core.k_value())
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
