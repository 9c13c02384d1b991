//! # Adaptive Replacement Cache (ARC) policy.
//!
//! Two sub-caches under one roof: a recency (LRU) part and a frequency
//! (LFU) part, each shadowed by a ghost list of recently evicted keys.
//! A lookup that lands in a ghost list is the learning signal that the
//! entry was evicted too early, and shifts one unit of capacity toward the
//! sub-cache that lost it. The split therefore tracks the workload without
//! manual tuning.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │                           ArcCore<K, V>                            │
//!   │                                                                    │
//!   │   Recency sub-cache (ArcLruPart)     Frequency sub-cache           │
//!   │   ┌──────────────────────────┐       (ArcLfuPart)                  │
//!   │   │ main: LRU list + index   │       ┌──────────────────────────┐  │
//!   │   │   nodes carry            │       │ main: FreqBuckets        │  │
//!   │   │   access_count           │       │   (freq → recency list)  │  │
//!   │   │ capacity: starts at c    │       │ capacity: starts at c    │  │
//!   │   ├──────────────────────────┤       ├──────────────────────────┤  │
//!   │   │ ghost B1: GhostList<K>   │       │ ghost B2: GhostList<K>   │  │
//!   │   │   capacity c, keys only  │       │   capacity c, keys only  │  │
//!   │   └──────────────────────────┘       └──────────────────────────┘  │
//!   │                                                                    │
//!   │   hit in B1 ──► lfu.decrease_capacity() ok? ──► lru.increase()     │
//!   │   hit in B2 ──► lru.decrease_capacity() ok? ──► lfu.increase()     │
//!   │                                                                    │
//!   │   lru get hit with access_count ≥ transform_threshold              │
//!   │       ──► copy the entry into the frequency part                   │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation flow
//!
//! `put(k, v)`:
//! 1. Check both ghost lists for `k`; a hit adapts the capacity split.
//! 2. Record whether `k` is resident in the frequency part.
//! 3. Insert/overwrite in the recency part.
//! 4. If it was frequency-resident, insert/overwrite there too, keeping
//!    the copy current.
//!
//! `get(k)`:
//! 1. Check ghosts (adapt).
//! 2. Try the recency part; on a hit whose access count has reached
//!    `transform_threshold`, copy the entry into the frequency part.
//! 3. Otherwise try the frequency part.
//!
//! Sub-cache `decrease_capacity` refuses at 0 and evicts first when full,
//! so the per-part capacity bound always holds; `increase_capacity` adds
//! one. The two capacities start at `c` each and the adaptation only moves
//! whole units between them, so their sum is invariant and the combined
//! resident budget stays within `[0, 2c]`.
//!
//! ## Thread Safety
//!
//! [`ArcCore`] is single-threaded. [`ArcCache`] serializes the composite
//! put/get under one outer `parking_lot::Mutex`; nothing else ever takes
//! the parts individually, so per-part locks would add ordering rules
//! without adding concurrency.

use std::fmt;
use std::hash::Hash;
use std::ptr::NonNull;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{FreqBuckets, GhostList};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{ArcMetrics, ArcMetricsSnapshot};
use crate::traits::CachePolicy;

/// Default number of recency-part accesses before an entry is copied into
/// the frequency part.
pub const DEFAULT_TRANSFORM_THRESHOLD: u64 = 2;

// ---------------------------------------------------------------------------
// Recency sub-cache
// ---------------------------------------------------------------------------

/// Node in the recency part's list.
#[repr(C)]
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    access_count: u64,
    key: K,
    value: V,
}

/// LRU sub-cache with per-node access counts and a ghost list.
///
/// The access count feeds the promotion decision: a `get` reports whether
/// the entry has been touched often enough to earn a copy in the frequency
/// part.
struct ArcLruPart<K, V>
where
    K: Eq + Hash + Clone,
{
    map: FxHashMap<K, NonNull<Node<K, V>>>,
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
    capacity: usize,
    transform_threshold: u64,
    ghost: GhostList<K>,
    #[cfg(feature = "metrics")]
    evictions: u64,
}

// SAFETY: the raw pointers only reference heap nodes owned by this struct.
unsafe impl<K, V> Send for ArcLruPart<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

impl<K, V> ArcLruPart<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(capacity: usize, ghost_capacity: usize, transform_threshold: u64) -> Self {
        ArcLruPart {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
            transform_threshold,
            ghost: GhostList::new(ghost_capacity),
            #[cfg(feature = "metrics")]
            evictions: 0,
        }
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert or overwrite at the MRU position.
    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(&node_ptr) = self.map.get(&key) {
            unsafe {
                (*node_ptr.as_ptr()).value = value;
            }
            self.detach(node_ptr);
            self.attach_front(node_ptr);
            return;
        }

        if self.map.len() >= self.capacity {
            self.evict_lru();
        }
        let node = Box::new(Node {
            prev: None,
            next: None,
            access_count: 1,
            key: key.clone(),
            value,
        });
        let node_ptr = NonNull::from(Box::leak(node));
        self.map.insert(key, node_ptr);
        self.attach_front(node_ptr);
    }

    /// Hit: bump the access count, refresh recency, and report whether the
    /// entry has earned promotion into the frequency part.
    fn get(&mut self, key: &K) -> Option<(&V, bool)> {
        let node_ptr = *self.map.get(key)?;
        self.detach(node_ptr);
        self.attach_front(node_ptr);
        unsafe {
            let node = &mut *node_ptr.as_ptr();
            node.access_count = node.access_count.saturating_add(1);
            let should_promote = node.access_count >= self.transform_threshold;
            Some((&node.value, should_promote))
        }
    }

    /// Ghost hit: consume the ghost entry and report it.
    fn check_ghost(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    fn increase_capacity(&mut self) {
        self.capacity += 1;
    }

    /// Gives up one unit of capacity, evicting first if the part is full.
    /// Refuses when the capacity is already 0.
    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.map.len() == self.capacity {
            self.evict_lru();
        }
        self.capacity -= 1;
        true
    }

    /// Demote the LRU entry to the ghost list (value discarded).
    fn evict_lru(&mut self) {
        if let Some(node) = self.pop_tail() {
            self.map.remove(&node.key);
            self.ghost.record(node.key);
            #[cfg(feature = "metrics")]
            {
                self.evictions += 1;
            }
        }
    }

    #[cfg(feature = "metrics")]
    #[inline]
    fn evictions(&self) -> u64 {
        self.evictions
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    fn clear(&mut self) {
        while self.pop_tail().is_some() {}
        self.map.clear();
        self.ghost.clear();
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() > self.capacity {
            return Err(InvariantError::new("arc lru part exceeds its capacity"));
        }
        self.ghost.check_invariants()?;
        let mut count = 0usize;
        let mut last = None;
        let mut current = self.head;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            if node.prev != last {
                return Err(InvariantError::new("arc lru back-link mismatch"));
            }
            if self.ghost.contains(&node.key) {
                return Err(InvariantError::new("key resident in both main and ghost"));
            }
            match self.map.get(&node.key) {
                Some(&indexed) if indexed == node_ptr => {},
                _ => return Err(InvariantError::new("arc lru node missing from index")),
            }
            count += 1;
            if count > self.map.len() {
                return Err(InvariantError::new("cycle detected in arc lru list"));
            }
            last = Some(node_ptr);
            current = node.next;
        }
        if self.tail != last || count != self.map.len() {
            return Err(InvariantError::new("arc lru list/index mismatch"));
        }
        Ok(())
    }

    #[inline(always)]
    fn detach(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ref();
            let prev = node.prev;
            let next = node.next;
            match prev {
                Some(mut p) => p.as_mut().next = next,
                None => self.head = next,
            }
            match next {
                Some(mut n) => n.as_mut().prev = prev,
                None => self.tail = prev,
            }
        }
    }

    #[inline(always)]
    fn attach_front(&mut self, mut node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_mut();
            node.prev = None;
            node.next = self.head;
            match self.head {
                Some(mut h) => h.as_mut().prev = Some(node_ptr),
                None => self.tail = Some(node_ptr),
            }
            self.head = Some(node_ptr);
        }
    }

    #[inline(always)]
    fn pop_tail(&mut self) -> Option<Box<Node<K, V>>> {
        self.tail.map(|tail_ptr| unsafe {
            let node = Box::from_raw(tail_ptr.as_ptr());
            self.tail = node.prev;
            match self.tail {
                Some(mut t) => t.as_mut().next = None,
                None => self.head = None,
            }
            node
        })
    }
}

impl<K, V> Drop for ArcLruPart<K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        while self.pop_tail().is_some() {}
    }
}

// ---------------------------------------------------------------------------
// Frequency sub-cache
// ---------------------------------------------------------------------------

/// LFU sub-cache over [`FreqBuckets`] with a ghost list.
///
/// The bucketed structure of the standalone LFU policy without the aging
/// sweep: entries enter at frequency 1, accesses move them one bucket up,
/// eviction takes the least recent entry of the least frequent bucket and
/// demotes its key to the ghost list.
struct ArcLfuPart<K, V>
where
    K: Eq + Hash + Clone,
{
    buckets: FreqBuckets<K, V>,
    capacity: usize,
    ghost: GhostList<K>,
    #[cfg(feature = "metrics")]
    evictions: u64,
}

impl<K, V> ArcLfuPart<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(capacity: usize, ghost_capacity: usize) -> Self {
        ArcLfuPart {
            buckets: FreqBuckets::new(),
            capacity,
            ghost: GhostList::new(ghost_capacity),
            #[cfg(feature = "metrics")]
            evictions: 0,
        }
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    /// Insert or overwrite; either path counts as an access.
    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.buckets.contains(&key) {
            if let Some(slot) = self.buckets.get_mut(&key) {
                *slot = value;
            }
            self.buckets.touch(&key);
            return;
        }
        if self.buckets.len() >= self.capacity {
            self.evict_lfu();
        }
        self.buckets.insert(key, value);
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        self.buckets.touch(key)?;
        self.buckets.get(key)
    }

    fn check_ghost(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    fn increase_capacity(&mut self) {
        self.capacity += 1;
    }

    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.buckets.len() == self.capacity {
            self.evict_lfu();
        }
        self.capacity -= 1;
        true
    }

    /// Demote the least-frequent entry to the ghost list (value discarded).
    fn evict_lfu(&mut self) {
        if let Some((key, _value, _freq)) = self.buckets.pop_min() {
            self.ghost.record(key);
            #[cfg(feature = "metrics")]
            {
                self.evictions += 1;
            }
        }
    }

    #[cfg(feature = "metrics")]
    #[inline]
    fn evictions(&self) -> u64 {
        self.evictions
    }

    #[inline]
    fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.ghost.clear();
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.buckets.len() > self.capacity {
            return Err(InvariantError::new("arc lfu part exceeds its capacity"));
        }
        self.buckets.check_invariants()?;
        self.ghost.check_invariants()
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Single-threaded ARC core.
///
/// Composes the recency and frequency sub-caches and routes every
/// operation through the ghost-list adaptation first. Thread safety is
/// provided by [`ArcCache`].
///
/// # Example
///
/// ```
/// use cachemux::policy::arc::ArcCore;
///
/// let mut cache: ArcCore<u32, &str> = ArcCore::new(2);
/// cache.put(1, "a");
/// cache.put(2, "b");
/// cache.put(3, "c"); // evicts 1 into the recency ghost list
///
/// // Miss, but the ghost hit shifts one unit of capacity toward recency.
/// assert_eq!(cache.get(&1), None);
/// assert_eq!(cache.lru_capacity(), 3);
/// assert_eq!(cache.lfu_capacity(), 1);
/// ```
pub struct ArcCore<K, V>
where
    K: Eq + Hash + Clone,
{
    lru: ArcLruPart<K, V>,
    lfu: ArcLfuPart<K, V>,
    capacity: usize,
    transform_threshold: u64,
    #[cfg(feature = "metrics")]
    metrics: ArcMetrics,
}

impl<K, V> ArcCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an ARC core with the default transform threshold.
    pub fn new(capacity: usize) -> Self {
        Self::with_threshold(capacity, DEFAULT_TRANSFORM_THRESHOLD)
    }

    /// Creates an ARC core with an explicit transform threshold.
    ///
    /// Both sub-caches start with main capacity `capacity` and ghost
    /// capacity `capacity`; adaptation then moves capacity between them
    /// one unit at a time. A capacity of 0 creates an inert cache.
    pub fn with_threshold(capacity: usize, transform_threshold: u64) -> Self {
        ArcCore {
            lru: ArcLruPart::new(capacity, capacity, transform_threshold),
            lfu: ArcLfuPart::new(capacity, capacity),
            capacity,
            transform_threshold,
            #[cfg(feature = "metrics")]
            metrics: ArcMetrics::default(),
        }
    }

    /// Inserts or overwrites an entry.
    ///
    /// The entry always lands in the recency part; if a copy was already
    /// resident in the frequency part, that copy is updated too so the two
    /// never diverge.
    pub fn put(&mut self, key: K, value: V) {
        self.check_ghosts(&key);
        let in_lfu = self.lfu.contains(&key);

        #[cfg(feature = "metrics")]
        {
            if in_lfu || self.lru.contains(&key) {
                self.metrics.insert_updates += 1;
            } else if self.capacity > 0 {
                self.metrics.insert_new += 1;
            }
        }

        if in_lfu {
            self.lru.put(key.clone(), value.clone());
            self.lfu.put(key, value);
        } else {
            self.lru.put(key, value);
        }
    }

    /// Returns the value and records the access.
    ///
    /// A recency-part hit whose access count has reached the transform
    /// threshold copies the entry into the frequency part before
    /// returning.
    pub fn get(&mut self, key: &K) -> Option<V> {
        self.check_ghosts(key);

        let lru_hit = self
            .lru
            .get(key)
            .map(|(value, promote)| (value.clone(), promote));
        if let Some((value, promote)) = lru_hit {
            #[cfg(feature = "metrics")]
            {
                self.metrics.get_hits += 1;
            }
            if promote {
                self.lfu.put(key.clone(), value.clone());
            }
            return Some(value);
        }

        let result = self.lfu.get(key).cloned();
        #[cfg(feature = "metrics")]
        {
            if result.is_some() {
                self.metrics.get_hits += 1;
            } else {
                self.metrics.get_misses += 1;
            }
        }
        result
    }

    /// Returns `true` if the key is resident in either sub-cache.
    pub fn contains(&self, key: &K) -> bool {
        self.lru.contains(key) || self.lfu.contains(key)
    }

    /// Resident slots across both sub-caches.
    ///
    /// An entry promoted into the frequency part while still recency-
    /// resident occupies one slot in each.
    pub fn len(&self) -> usize {
        self.lru.len() + self.lfu.len()
    }

    /// Returns `true` when both sub-caches are empty.
    pub fn is_empty(&self) -> bool {
        self.lru.len() == 0 && self.lfu.len() == 0
    }

    /// The user-supplied total capacity `c`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The configured transform threshold.
    #[inline]
    pub fn transform_threshold(&self) -> u64 {
        self.transform_threshold
    }

    /// Current capacity of the recency part.
    #[inline]
    pub fn lru_capacity(&self) -> usize {
        self.lru.capacity()
    }

    /// Current capacity of the frequency part.
    #[inline]
    pub fn lfu_capacity(&self) -> usize {
        self.lfu.capacity()
    }

    /// Resident entries in the recency part.
    #[inline]
    pub fn lru_len(&self) -> usize {
        self.lru.len()
    }

    /// Resident entries in the frequency part.
    #[inline]
    pub fn lfu_len(&self) -> usize {
        self.lfu.len()
    }

    /// Keys in the recency ghost list (B1).
    #[inline]
    pub fn lru_ghost_len(&self) -> usize {
        self.lru.ghost_len()
    }

    /// Keys in the frequency ghost list (B2).
    #[inline]
    pub fn lfu_ghost_len(&self) -> usize {
        self.lfu.ghost_len()
    }

    /// Drops all entries and ghosts and restores the initial capacity
    /// split.
    pub fn clear(&mut self) {
        self.lru.clear();
        self.lfu.clear();
        self.lru.capacity = self.capacity;
        self.lfu.capacity = self.capacity;
    }

    #[cfg(feature = "metrics")]
    /// Copies out the operation counters together with occupancy.
    pub fn metrics_snapshot(&self) -> ArcMetricsSnapshot {
        ArcMetricsSnapshot {
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_new: self.metrics.insert_new,
            insert_updates: self.metrics.insert_updates,
            evicted_entries: self.lru.evictions() + self.lfu.evictions(),
            ghost_hits: self.metrics.ghost_hits,
            cache_len: self.len(),
            capacity: self.capacity,
        }
    }

    /// Validates both sub-caches and the capacity-sum invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.lru.check_invariants()?;
        self.lfu.check_invariants()?;
        if self.lru.capacity() + self.lfu.capacity() != 2 * self.capacity {
            return Err(InvariantError::new(format!(
                "capacity split {} + {} drifted from the invariant sum {}",
                self.lru.capacity(),
                self.lfu.capacity(),
                2 * self.capacity
            )));
        }
        Ok(())
    }

    /// Ghost-hit adaptation: a hit in B1 shifts one unit of capacity
    /// toward recency, a hit in B2 toward frequency. The donor must
    /// actually give up a unit before the winner grows, so the capacity
    /// sum is preserved.
    fn check_ghosts(&mut self, key: &K) {
        if self.lru.check_ghost(key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.ghost_hits += 1;
            }
            if self.lfu.decrease_capacity() {
                self.lru.increase_capacity();
            }
        } else if self.lfu.check_ghost(key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.ghost_hits += 1;
            }
            if self.lru.decrease_capacity() {
                self.lfu.increase_capacity();
            }
        }
    }
}

impl<K, V> fmt::Debug for ArcCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcCore")
            .field("capacity", &self.capacity)
            .field("lru_len", &self.lru.len())
            .field("lru_capacity", &self.lru.capacity())
            .field("lfu_len", &self.lfu.len())
            .field("lfu_capacity", &self.lfu.capacity())
            .field("b1_len", &self.lru.ghost_len())
            .field("b2_len", &self.lfu.ghost_len())
            .finish()
    }
}

/// Thread-safe ARC cache.
///
/// One outer mutex serializes the composite operations across both
/// sub-caches.
///
/// # Example
///
/// ```
/// use cachemux::policy::arc::ArcCache;
/// use cachemux::traits::CachePolicy;
///
/// let cache: ArcCache<u32, String> = ArcCache::new(2);
/// cache.put(1, "a".to_string());
/// cache.put(2, "b".to_string());
///
/// // Two hits promote 1 into the frequency part.
/// cache.get(&1);
/// cache.get(&1);
/// assert_eq!(cache.get(&1), Some("a".to_string()));
/// ```
pub struct ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<ArcCore<K, V>>,
}

impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a thread-safe ARC cache with the default transform
    /// threshold.
    pub fn new(capacity: usize) -> Self {
        ArcCache {
            inner: Mutex::new(ArcCore::new(capacity)),
        }
    }

    /// Creates a thread-safe ARC cache with an explicit transform
    /// threshold.
    pub fn with_threshold(capacity: usize, transform_threshold: u64) -> Self {
        ArcCache {
            inner: Mutex::new(ArcCore::with_threshold(capacity, transform_threshold)),
        }
    }

    /// Inserts or overwrites an entry (see [`ArcCore::put`]).
    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Returns the value and records the access (see [`ArcCore::get`]).
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key)
    }

    /// Returns `true` if the key is resident in either sub-cache.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    /// Resident slots across both sub-caches.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` when both sub-caches are empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// The user-supplied total capacity `c`.
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Current capacity of the recency part.
    pub fn lru_capacity(&self) -> usize {
        self.inner.lock().lru_capacity()
    }

    /// Current capacity of the frequency part.
    pub fn lfu_capacity(&self) -> usize {
        self.inner.lock().lfu_capacity()
    }

    /// Drops all entries and restores the initial capacity split.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    #[cfg(feature = "metrics")]
    /// Copies out the operation counters together with occupancy.
    pub fn metrics_snapshot(&self) -> ArcMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> CachePolicy<K, V> for ArcCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn put(&self, key: K, value: V) {
        ArcCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        ArcCache::get(self, key)
    }

    fn len(&self) -> usize {
        ArcCache::len(self)
    }
}

impl<K, V> fmt::Debug for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("ArcCache")
            .field("capacity", &core.capacity())
            .field("lru_len", &core.lru_len())
            .field("lfu_len", &core.lfu_len())
            .finish_non_exhaustive()
    }
}
