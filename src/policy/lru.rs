//! # Least Recently Used (LRU) cache policy.
//!
//! The baseline recency policy: every access moves the entry to the front
//! of an intrusive doubly linked list, and eviction always takes the back.
//! The list is shadowed by a hash index for O(1) lookup, giving O(1) for
//! every operation.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                         LruCache<K, V>                           │
//!   │                                                                  │
//!   │   ┌────────────────────────────────────────────────────────────┐ │
//!   │   │                  parking_lot::Mutex<LruCore>               │ │
//!   │   └────────────────────────────────────────────────────────────┘ │
//!   │                                 │                                │
//!   │                                 ▼                                │
//!   │   ┌────────────────────────────────────────────────────────────┐ │
//!   │   │                        LruCore<K, V>                       │ │
//!   │   │                                                            │ │
//!   │   │   ┌──────────────────────────────────────────────────┐     │ │
//!   │   │   │  map: FxHashMap<K, NonNull<Node>>                │     │ │
//!   │   │   │                                                  │     │ │
//!   │   │   │  ┌─────────┬──────────┐                          │     │ │
//!   │   │   │  │   Key   │ NodePtr  │                          │     │ │
//!   │   │   │  ├─────────┼──────────┤                          │     │ │
//!   │   │   │  │  key_1  │  ptr_0 ──┼──────────────┐           │     │ │
//!   │   │   │  │  key_2  │  ptr_1 ──┼────────┐     │           │     │ │
//!   │   │   │  └─────────┴──────────┘        │     │           │     │ │
//!   │   │   └────────────────────────────────┼─────┼───────────┘     │ │
//!   │   │                                    ▼     ▼                 │ │
//!   │   │   head ──► [ptr_1] ◄──► [ptr_0] ◄──► [ ... ] ◄── tail      │ │
//!   │   │            (MRU)                            (LRU, evicted) │ │
//!   │   └────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method        | Complexity | Description                              |
//! |---------------|------------|------------------------------------------|
//! | `insert(k,v)` | O(1)*      | Insert or update; may evict the LRU tail |
//! | `get(&k)`     | O(1)       | Return value, move node to MRU           |
//! | `peek(&k)`    | O(1)       | Return value without reordering          |
//! | `remove(&k)`  | O(1)       | Unlink and drop an entry                 |
//! | `pop_lru()`   | O(1)       | Remove and return the LRU entry          |
//!
//! Ties in recency cannot occur: every access updates recency
//! monotonically, and an overwrite counts as an access.
//!
//! ## Thread Safety
//!
//! - [`LruCore`]: single-threaded (`&mut self`), no lock.
//! - [`LruCache`]: one `parking_lot::Mutex` held for the whole duration of
//!   each public operation; operations on one instance are linearizable.
//!   A `Mutex` rather than an `RwLock` because `get` always reorders the
//!   list, so there are no shared-read operations worth optimizing.

use std::fmt;
use std::hash::Hash;
use std::ptr::NonNull;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{LruMetrics, LruMetricsSnapshot};
use crate::traits::CachePolicy;

/// Node in the LRU linked list.
///
/// Layout keeps the list pointers first: traversal touches them far more
/// often than the payload.
#[repr(C)]
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    key: K,
    value: V,
}

/// Single-threaded LRU core: hash index + intrusive recency list.
///
/// The index holds the authoritative pointer to each heap-allocated node;
/// the list orders the same nodes by recency (head = most recent). All
/// operations are O(1). Thread safety is provided by [`LruCache`].
///
/// # Example
///
/// ```
/// use cachemux::policy::lru::LruCore;
///
/// let mut cache: LruCore<u32, String> = LruCore::new(2);
/// cache.insert(1, "a".to_string());
/// cache.insert(2, "b".to_string());
/// cache.get(&1);                      // 1 is now most recent
/// cache.insert(3, "c".to_string());   // evicts 2, the least recent
///
/// assert!(cache.contains(&1));
/// assert!(!cache.contains(&2));
/// ```
pub struct LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    map: FxHashMap<K, NonNull<Node<K, V>>>,
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

// SAFETY: LruCore can be sent between threads if K and V are Send.
// The raw pointers only reference heap memory owned by the struct.
unsafe impl<K, V> Send for LruCore<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

// SAFETY: &LruCore only permits reads; mutation requires &mut self.
unsafe impl<K, V> Sync for LruCore<K, V>
where
    K: Eq + Hash + Clone + Sync,
    V: Sync,
{
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU core with the given capacity.
    ///
    /// A capacity of 0 creates an inert cache: all inserts are rejected.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        LruCore {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        }
    }

    /// Inserts or overwrites an entry, returning the previous value.
    ///
    /// Both paths leave the entry at the MRU position. Inserting a new key
    /// into a full cache evicts the LRU tail first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&node_ptr) = self.map.get(&key) {
            #[cfg(feature = "metrics")]
            {
                self.metrics.insert_updates += 1;
            }
            let previous = unsafe {
                let node = &mut *node_ptr.as_ptr();
                std::mem::replace(&mut node.value, value)
            };
            self.detach(node_ptr);
            self.attach_front(node_ptr);

            #[cfg(debug_assertions)]
            self.validate_invariants();

            return Some(previous);
        }

        if self.capacity == 0 {
            return None;
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.insert_new += 1;
        }

        if self.map.len() >= self.capacity {
            if let Some(evicted) = self.pop_tail() {
                self.map.remove(&evicted.key);
                #[cfg(feature = "metrics")]
                {
                    self.metrics.evicted_entries += 1;
                }
            }
        }

        let node = Box::new(Node {
            prev: None,
            next: None,
            key: key.clone(),
            value,
        });
        let node_ptr = NonNull::from(Box::leak(node));
        self.map.insert(key, node_ptr);
        self.attach_front(node_ptr);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        None
    }

    /// Returns the value and moves the entry to the MRU position.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let node_ptr = match self.map.get(key) {
            Some(&ptr) => ptr,
            None => {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.get_misses += 1;
                }
                return None;
            },
        };

        #[cfg(feature = "metrics")]
        {
            self.metrics.get_hits += 1;
        }

        self.detach(node_ptr);
        self.attach_front(node_ptr);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        unsafe { Some(&(*node_ptr.as_ptr()).value) }
    }

    /// Returns the value without updating recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map
            .get(key)
            .map(|node_ptr| unsafe { &node_ptr.as_ref().value })
    }

    /// Removes an entry, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node_ptr = self.map.remove(key)?;
        self.detach(node_ptr);
        let node = unsafe { Box::from_raw(node_ptr.as_ptr()) };

        #[cfg(debug_assertions)]
        self.validate_invariants();

        Some(node.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let node = self.pop_tail()?;
        self.map.remove(&node.key);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        Some((node.key, node.value))
    }

    /// The least recently used entry, without removing it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.tail.map(|tail_ptr| unsafe {
            let node = tail_ptr.as_ref();
            (&node.key, &node.value)
        })
    }

    /// Returns `true` if the key is resident. Does not record an access.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` when no entries are resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all entries.
    pub fn clear(&mut self) {
        while self.pop_tail().is_some() {}
        self.map.clear();
    }

    /// Validates the index/list correspondence.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() > self.capacity {
            return Err(InvariantError::new("resident set exceeds capacity"));
        }
        let mut count = 0usize;
        let mut last = None;
        let mut current = self.head;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            if node.prev != last {
                return Err(InvariantError::new("lru list back-link mismatch"));
            }
            match self.map.get(&node.key) {
                Some(&indexed) if indexed == node_ptr => {},
                _ => return Err(InvariantError::new("lru node missing from index")),
            }
            count += 1;
            if count > self.map.len() {
                return Err(InvariantError::new("cycle detected in lru list"));
            }
            last = Some(node_ptr);
            current = node.next;
        }
        if self.tail != last {
            return Err(InvariantError::new("lru tail mismatch"));
        }
        if count != self.map.len() {
            return Err(InvariantError::new(format!(
                "lru list holds {} nodes but index holds {}",
                count,
                self.map.len()
            )));
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    /// Copies out the operation counters together with occupancy.
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_new: self.metrics.insert_new,
            insert_updates: self.metrics.insert_updates,
            evicted_entries: self.metrics.evicted_entries,
            cache_len: self.map.len(),
            capacity: self.capacity,
        }
    }

    /// Detach a node from the linked list without touching the map.
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

    /// Attach a node at the front (MRU position).
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

    /// Pop the tail node (LRU) and take ownership of it.
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

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert!(self.check_invariants().is_ok());
    }
}

impl<K, V> Drop for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        while self.pop_tail().is_some() {}
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Thread-safe LRU cache.
///
/// Wraps [`LruCore`] behind a single `parking_lot::Mutex`, held for the
/// full duration of each operation. Values are returned by clone so no
/// borrow outlives the lock.
///
/// # Example
///
/// ```
/// use cachemux::policy::lru::LruCache;
/// use cachemux::traits::CachePolicy;
///
/// let cache: LruCache<u32, String> = LruCache::new(2);
/// cache.put(1, "a".to_string());
/// cache.put(2, "b".to_string());
/// assert_eq!(cache.get(&1), Some("a".to_string()));
///
/// cache.put(3, "c".to_string()); // evicts 2
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&3), Some("c".to_string()));
/// ```
pub struct LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<LruCore<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a thread-safe LRU cache with the given capacity.
    pub fn new(capacity: usize) -> Self {
        LruCache {
            inner: Mutex::new(LruCore::new(capacity)),
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

    /// Removes an entry, returning its value. No-op if absent.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Returns `true` if the key is resident. Does not record an access.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
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

    /// Drops all entries.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    #[cfg(feature = "metrics")]
    /// Copies out the operation counters together with occupancy.
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.inner.lock().metrics_snapshot()
    }
}

impl<K, V> CachePolicy<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn put(&self, key: K, value: V) {
        LruCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        LruCache::get(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("LruCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod correctness {
        use super::*;

        #[test]
        fn insert_and_get() {
            let mut cache = LruCore::new(4);

            assert_eq!(cache.insert(1, 10), None);
            assert_eq!(cache.get(&1), Some(&10));
            assert_eq!(cache.get(&2), None);
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn overwrite_returns_previous_value() {
            let mut cache = LruCore::new(4);

            cache.insert(1, 10);
            assert_eq!(cache.insert(1, 20), Some(10));
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.get(&1), Some(&20));
        }

        #[test]
        fn eviction_takes_least_recent() {
            let mut cache = LruCore::new(2);

            cache.insert(1, 10);
            cache.insert(2, 20);
            cache.insert(3, 30);

            assert!(!cache.contains(&1));
            assert!(cache.contains(&2));
            assert!(cache.contains(&3));
            assert_eq!(cache.len(), 2);
        }

        #[test]
        fn get_refreshes_recency() {
            let mut cache = LruCore::new(2);

            cache.insert(1, 10);
            cache.insert(2, 20);
            cache.get(&1); // 2 is now least recent
            cache.insert(3, 30);

            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));
        }

        #[test]
        fn overwrite_refreshes_recency() {
            let mut cache = LruCore::new(2);

            cache.insert(1, 10);
            cache.insert(2, 20);
            cache.insert(1, 11); // overwrite counts as an access
            cache.insert(3, 30);

            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));
        }

        #[test]
        fn peek_does_not_refresh_recency() {
            let mut cache = LruCore::new(2);

            cache.insert(1, 10);
            cache.insert(2, 20);
            assert_eq!(cache.peek(&1), Some(&10));
            cache.insert(3, 30); // 1 still least recent

            assert!(!cache.contains(&1));
        }

        #[test]
        fn remove_unlinks_entry() {
            let mut cache = LruCore::new(4);

            cache.insert(1, 10);
            cache.insert(2, 20);
            assert_eq!(cache.remove(&1), Some(10));
            assert_eq!(cache.remove(&1), None);
            assert_eq!(cache.len(), 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn pop_and_peek_lru() {
            let mut cache = LruCore::new(4);

            cache.insert(1, 10);
            cache.insert(2, 20);

            assert_eq!(cache.peek_lru(), Some((&1, &10)));
            assert_eq!(cache.pop_lru(), Some((1, 10)));
            assert_eq!(cache.pop_lru(), Some((2, 20)));
            assert_eq!(cache.pop_lru(), None);
        }

        #[test]
        fn zero_capacity_is_inert() {
            let mut cache = LruCore::new(0);

            assert_eq!(cache.insert(1, 10), None);
            assert_eq!(cache.len(), 0);
            assert!(!cache.contains(&1));
            assert_eq!(cache.get(&1), None);
        }

        #[test]
        fn single_slot_cache() {
            let mut cache = LruCore::new(1);

            cache.insert(1, 10);
            cache.insert(2, 20);

            assert_eq!(cache.len(), 1);
            assert!(!cache.contains(&1));
            assert!(cache.contains(&2));
        }

        #[test]
        fn clear_empties_everything() {
            let mut cache = LruCore::new(4);
            for i in 0..4 {
                cache.insert(i, i);
            }
            cache.clear();

            assert!(cache.is_empty());
            assert_eq!(cache.pop_lru(), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn string_keys() {
            let mut cache = LruCore::new(2);

            cache.insert("alpha".to_string(), 1);
            cache.insert("beta".to_string(), 2);
            cache.insert("gamma".to_string(), 3);

            assert!(!cache.contains(&"alpha".to_string()));
            assert_eq!(cache.get(&"gamma".to_string()), Some(&3));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn churn_holds_invariants() {
            let mut cache = LruCore::new(8);
            for i in 0..500u32 {
                cache.insert(i % 13, i);
                cache.get(&(i % 7));
                if i % 11 == 0 {
                    cache.remove(&(i % 13));
                }
            }
            cache.check_invariants().unwrap();
            assert!(cache.len() <= 8);
        }

        #[cfg(feature = "metrics")]
        #[test]
        fn metrics_track_operations() {
            let mut cache = LruCore::new(2);
            cache.insert(1, 10);
            cache.insert(1, 11);
            cache.insert(2, 20);
            cache.insert(3, 30); // evicts
            cache.get(&3);
            cache.get(&99);

            let snap = cache.metrics_snapshot();
            assert_eq!(snap.insert_new, 3);
            assert_eq!(snap.insert_updates, 1);
            assert_eq!(snap.evicted_entries, 1);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.cache_len, 2);
        }
    }

    mod wrapper {
        use super::*;
        use std::sync::Arc;
        use std::thread;

        #[test]
        fn basic_round_trip() {
            let cache = LruCache::new(2);

            cache.put(1, "a");
            cache.put(2, "b");
            assert_eq!(cache.get(&1), Some("a"));

            cache.put(3, "c"); // evicts 2
            assert_eq!(cache.get(&2), None);
            assert_eq!(cache.get(&1), Some("a"));
            assert_eq!(cache.get(&3), Some("c"));
        }

        #[test]
        fn remove_is_noop_when_absent() {
            let cache = LruCache::new(2);
            cache.put(1, 10);

            assert_eq!(cache.remove(&1), Some(10));
            assert_eq!(cache.remove(&1), None);
            assert!(cache.is_empty());
        }

        #[test]
        fn shared_across_threads() {
            let cache: Arc<LruCache<u64, u64>> = Arc::new(LruCache::new(64));

            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    thread::spawn(move || {
                        for i in 0..200u64 {
                            cache.put(t * 1000 + i % 32, i);
                            let _ = cache.get(&(t * 1000 + (i + 1) % 32));
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert!(cache.len() <= cache.capacity());
        }

        #[test]
        fn works_through_trait_object() {
            let cache: Box<dyn CachePolicy<u32, u32>> = Box::new(LruCache::new(4));
            cache.put(1, 10);
            assert_eq!(cache.get(&1), Some(10));
            assert!(!cache.is_empty());
        }
    }
}
