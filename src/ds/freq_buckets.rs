//! Frequency-bucketed node storage for LFU-style policies.
//!
//! Owns one node per resident key and groups the nodes into buckets by
//! access frequency. Within a bucket the nodes form an intrusive doubly
//! linked list ordered by recency: new arrivals link at the tail, eviction
//! takes the head. This gives least-frequent eviction with an LRU tie-break
//! inside the least-frequent bucket, all in O(1) per operation.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, NodePtr>        buckets: FxHashMap<freq, Ends>
//!
//!   ┌─────────┬─────────┐               freq 1:  head ─► [d] ◄──► [e] ◄─ tail
//!   │   Key   │ NodePtr │               freq 2:  head ─► [b] ◄─────── tail
//!   │   "b"   │  ptr_1  │──► Node{freq: 2, ..}
//!   │   "d"   │  ptr_2  │──► Node{freq: 1, ..}  min_freq = 1
//!   │   "e"   │  ptr_3  │──► Node{freq: 1, ..}
//!   └─────────┴─────────┘
//!
//!   touch("d"):  unlink from bucket 1, freq ← 2, link at tail of bucket 2
//!   pop_min():   unlink head of bucket min_freq ("d" before "e")
//! ```
//!
//! `min_freq` is maintained incrementally: inserts pin it to 1, a touch that
//! drains the minimum bucket advances it by one, and only an eviction or
//! removal that drains the minimum bucket without a known successor rescans
//! the live bucket keys.
//!
//! The [`age`](FreqBuckets::age) sweep supports frequency compaction:
//! every node's frequency drops by a fixed amount (floored at 1) and the
//! buckets are rebuilt, preventing long-lived hot keys from accumulating
//! frequencies no new key could ever compete with.

use std::hash::Hash;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;

struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    freq: u64,
    key: K,
    value: V,
}

struct Ends<K, V> {
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
}

/// Node-owning frequency buckets with O(1) touch and min-frequency eviction.
///
/// Used as the storage layer of the LFU policy and the frequency sub-cache
/// of ARC. Capacity enforcement lives in the caller; this structure only
/// maintains the bucket bookkeeping.
///
/// # Example
///
/// ```
/// use cachemux::ds::FreqBuckets;
///
/// let mut buckets: FreqBuckets<&str, i32> = FreqBuckets::new();
/// buckets.insert("a", 1);
/// buckets.insert("b", 2);
/// buckets.touch(&"b");
///
/// // "a" is the least frequent entry
/// let (key, value, freq) = buckets.pop_min().unwrap();
/// assert_eq!((key, value, freq), ("a", 1, 1));
/// ```
pub struct FreqBuckets<K, V> {
    index: FxHashMap<K, NonNull<Node<K, V>>>,
    buckets: FxHashMap<u64, Ends<K, V>>,
    min_freq: u64,
}

// SAFETY: the raw pointers only reference heap nodes owned by this struct.
unsafe impl<K: Send, V: Send> Send for FreqBuckets<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for FreqBuckets<K, V> {}

impl<K, V> FreqBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty bucket structure.
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Number of resident nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` when no nodes are resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Smallest frequency with a non-empty bucket, or 0 when empty.
    #[inline]
    pub fn min_freq(&self) -> u64 {
        self.min_freq
    }

    /// Returns `true` if `key` has a resident node.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Current frequency of `key`, if resident.
    pub fn freq(&self, key: &K) -> Option<u64> {
        self.index
            .get(key)
            .map(|node_ptr| unsafe { node_ptr.as_ref().freq })
    }

    /// Value of `key` without recording an access.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index
            .get(key)
            .map(|node_ptr| unsafe { &node_ptr.as_ref().value })
    }

    /// Mutable value access without recording an access.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.index
            .get(key)
            .map(|node_ptr| unsafe { &mut (*node_ptr.as_ptr()).value })
    }

    /// Inserts a new key at frequency 1 (tail of bucket 1).
    ///
    /// The caller must have established that `key` is not resident and that
    /// capacity allows the insert.
    pub fn insert(&mut self, key: K, value: V) {
        debug_assert!(!self.index.contains_key(&key));
        let node = Box::new(Node {
            prev: None,
            next: None,
            freq: 1,
            key: key.clone(),
            value,
        });
        let node_ptr = NonNull::from(Box::leak(node));
        self.index.insert(key, node_ptr);
        self.push_tail(1, node_ptr);
        self.min_freq = 1;
    }

    /// Records an access: moves the node to the tail of the next bucket.
    ///
    /// Returns the new frequency, or `None` if the key is not resident.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let node_ptr = *self.index.get(key)?;
        let current = unsafe { node_ptr.as_ref().freq };
        let next = current.saturating_add(1);
        if next == current {
            // Saturated: refresh recency within the same bucket.
            self.unlink(current, node_ptr);
            self.push_tail(current, node_ptr);
            return Some(current);
        }

        let drained = self.unlink(current, node_ptr);
        if drained && self.min_freq == current {
            // The node itself now sits one bucket up; nothing lies between.
            self.min_freq = next;
        }
        unsafe {
            (*node_ptr.as_ptr()).freq = next;
        }
        self.push_tail(next, node_ptr);
        Some(next)
    }

    /// Evicts the least-recent node of the least-frequent bucket.
    ///
    /// Returns `(key, value, freq)` of the evicted node.
    pub fn pop_min(&mut self) -> Option<(K, V, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let freq = self.min_freq;
        let node_ptr = self.buckets.get(&freq)?.head?;
        let drained = self.unlink(freq, node_ptr);
        if drained {
            self.min_freq = self.rescan_min();
        }
        let node = unsafe { Box::from_raw(node_ptr.as_ptr()) };
        self.index.remove(&node.key);
        Some((node.key, node.value, node.freq))
    }

    /// Removes an arbitrary key, returning its value and frequency.
    pub fn remove(&mut self, key: &K) -> Option<(V, u64)> {
        let node_ptr = self.index.remove(key)?;
        let freq = unsafe { node_ptr.as_ref().freq };
        let drained = self.unlink(freq, node_ptr);
        if drained && self.min_freq == freq {
            self.min_freq = self.rescan_min();
        }
        let node = unsafe { Box::from_raw(node_ptr.as_ptr()) };
        Some((node.value, node.freq))
    }

    /// Compaction sweep: subtracts `decrement` from every node's frequency
    /// (floored at 1) and rebuilds the buckets.
    ///
    /// Relative recency is preserved: nodes are rebucketed in ascending
    /// frequency order, least recent first, so entries that land in the same
    /// bucket keep their eviction order. Returns the new total frequency
    /// across all nodes.
    pub fn age(&mut self, decrement: u64) -> u64 {
        if self.index.is_empty() {
            return 0;
        }

        let mut freqs: Vec<u64> = self.buckets.keys().copied().collect();
        freqs.sort_unstable();
        let mut order: Vec<NonNull<Node<K, V>>> = Vec::with_capacity(self.index.len());
        for freq in freqs {
            let mut current = self.buckets[&freq].head;
            while let Some(node_ptr) = current {
                order.push(node_ptr);
                current = unsafe { node_ptr.as_ref().next };
            }
        }

        self.buckets.clear();
        let mut total = 0u64;
        let mut min = u64::MAX;
        for node_ptr in order {
            let new_freq = unsafe {
                let node = &mut *node_ptr.as_ptr();
                node.prev = None;
                node.next = None;
                node.freq = node.freq.saturating_sub(decrement).max(1);
                node.freq
            };
            total += new_freq;
            min = min.min(new_freq);
            self.push_tail(new_freq, node_ptr);
        }
        self.min_freq = min;
        total
    }

    /// Drops every node.
    pub fn clear(&mut self) {
        for (_, node_ptr) in self.index.drain() {
            unsafe {
                drop(Box::from_raw(node_ptr.as_ptr()));
            }
        }
        self.buckets.clear();
        self.min_freq = 0;
    }

    /// Validates bucket chains, the index correspondence, and `min_freq`.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.is_empty() {
            if !self.buckets.is_empty() {
                return Err(InvariantError::new("buckets non-empty while index empty"));
            }
            if self.min_freq != 0 {
                return Err(InvariantError::new("min_freq non-zero while empty"));
            }
            return Ok(());
        }

        let true_min = self.buckets.keys().copied().min().unwrap_or(0);
        if self.min_freq != true_min {
            return Err(InvariantError::new(format!(
                "min_freq is {} but smallest live bucket is {}",
                self.min_freq, true_min
            )));
        }

        let mut counted = 0usize;
        for (&freq, ends) in &self.buckets {
            if ends.head.is_none() || ends.tail.is_none() {
                return Err(InvariantError::new("empty bucket left in map"));
            }
            let mut last = None;
            let mut current = ends.head;
            while let Some(node_ptr) = current {
                let node = unsafe { node_ptr.as_ref() };
                if node.freq != freq {
                    return Err(InvariantError::new("node freq disagrees with its bucket"));
                }
                if node.prev != last {
                    return Err(InvariantError::new("bucket back-link mismatch"));
                }
                match self.index.get(&node.key) {
                    Some(&indexed) if indexed == node_ptr => {},
                    _ => return Err(InvariantError::new("bucket node missing from index")),
                }
                counted += 1;
                if counted > self.index.len() {
                    return Err(InvariantError::new("cycle detected in bucket list"));
                }
                last = Some(node_ptr);
                current = node.next;
            }
            if ends.tail != last {
                return Err(InvariantError::new("bucket tail mismatch"));
            }
        }
        if counted != self.index.len() {
            return Err(InvariantError::new(format!(
                "buckets hold {} nodes but index holds {}",
                counted,
                self.index.len()
            )));
        }
        Ok(())
    }

    #[inline(always)]
    fn push_tail(&mut self, freq: u64, mut node_ptr: NonNull<Node<K, V>>) {
        let ends = self.buckets.entry(freq).or_insert(Ends {
            head: None,
            tail: None,
        });
        unsafe {
            let node = node_ptr.as_mut();
            node.prev = ends.tail;
            node.next = None;
            match ends.tail {
                Some(mut t) => t.as_mut().next = Some(node_ptr),
                None => ends.head = Some(node_ptr),
            }
            ends.tail = Some(node_ptr);
        }
    }

    /// Unlinks a node from its bucket; removes the bucket when it drains.
    /// Returns `true` if the bucket was removed.
    #[inline(always)]
    fn unlink(&mut self, freq: u64, node_ptr: NonNull<Node<K, V>>) -> bool {
        let Some(ends) = self.buckets.get_mut(&freq) else {
            return false;
        };
        unsafe {
            let node = node_ptr.as_ref();
            let prev = node.prev;
            let next = node.next;
            match prev {
                Some(mut p) => p.as_mut().next = next,
                None => ends.head = next,
            }
            match next {
                Some(mut n) => n.as_mut().prev = prev,
                None => ends.tail = prev,
            }
        }
        let drained = ends.head.is_none();
        if drained {
            self.buckets.remove(&freq);
        }
        drained
    }

    fn rescan_min(&self) -> u64 {
        self.buckets.keys().copied().min().unwrap_or(0)
    }
}

impl<K, V> Default for FreqBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Drop for FreqBuckets<K, V> {
    fn drop(&mut self) {
        for (_, node_ptr) in self.index.drain() {
            unsafe {
                drop(Box::from_raw(node_ptr.as_ptr()));
            }
        }
    }
}

impl<K, V> std::fmt::Debug for FreqBuckets<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreqBuckets")
            .field("len", &self.index.len())
            .field("min_freq", &self.min_freq)
            .field("buckets", &self.buckets.len())
            .finish_non_exhaustive()
    }
}
