//! Bounded recency list for ghost entries.
//!
//! Used by the adaptive (ARC) policy to remember recently evicted keys
//! without retaining their values. A ghost hit (a lookup that finds its key
//! here) is the signal that the eviction was premature, which drives the
//! capacity adaptation between the recency and frequency sub-caches.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────┐   ┌─────────────────────────────────┐
//!   │  index: FxHashMap<K, NodePtr> │   │  list of keys (no values)       │
//!   │                               │   │                                 │
//!   │  ┌───────────┬───────────┐    │   │  head ──► [C] ◄──► [B] ◄──► [A] │
//!   │  │    Key    │  NodePtr  │    │   │         newest          oldest  │
//!   │  ├───────────┼───────────┤    │   │                             ▲   │
//!   │  │  "key_a"  │   ptr_0   │────┼───┼──────────────► [A]          │   │
//!   │  │  "key_b"  │   ptr_1   │────┼───┼──────► [B]                  │   │
//!   │  │  "key_c"  │   ptr_2   │────┼───┼─► [C]             tail ─────┘   │
//!   │  └───────────┴───────────┘    │   │                                 │
//!   └───────────────────────────────┘   └─────────────────────────────────┘
//!
//!   record(k) when full: drop the oldest key (tail), link k at the head.
//!   record(k) when present: move k back to the head (freshest ghost).
//!   remove(k): ghost hit, unlink and forget the key.
//! ```
//!
//! ## Operations
//!
//! | Operation  | Description                              | Complexity |
//! |------------|------------------------------------------|------------|
//! | `record`   | Add/refresh key, drop oldest when full   | O(1) avg   |
//! | `remove`   | Remove a key (ghost hit)                 | O(1) avg   |
//! | `contains` | Check whether a key is tracked           | O(1) avg   |
//!
//! ## Example Usage
//!
//! ```
//! use cachemux::ds::GhostList;
//!
//! let mut ghosts = GhostList::new(2);
//! ghosts.record("page_1");
//! ghosts.record("page_2");
//! ghosts.record("page_3"); // "page_1" falls off the tail
//!
//! assert!(!ghosts.contains(&"page_1"));
//! assert!(ghosts.remove(&"page_3")); // ghost hit consumes the entry
//! assert!(!ghosts.contains(&"page_3"));
//! ```

use std::hash::Hash;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;

struct Node<K> {
    prev: Option<NonNull<Node<K>>>,
    next: Option<NonNull<Node<K>>>,
    key: K,
}

/// Bounded list of recently evicted keys, newest first.
///
/// Keys only; the value of a ghost entry was discarded at eviction time.
/// When the list is at capacity, recording a new key drops the oldest one.
/// A capacity of 0 produces a list that records nothing.
pub struct GhostList<K> {
    index: FxHashMap<K, NonNull<Node<K>>>,
    head: Option<NonNull<Node<K>>>,
    tail: Option<NonNull<Node<K>>>,
    capacity: usize,
}

// SAFETY: the raw pointers only reference heap nodes owned by this struct.
unsafe impl<K: Send> Send for GhostList<K> {}
unsafe impl<K: Sync> Sync for GhostList<K> {}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list that retains at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
        }
    }

    /// Maximum number of keys retained.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of tracked keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no keys are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` was recorded and has not aged out.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records an evicted key at the newest position.
    ///
    /// A key already present is refreshed (moved to the newest position)
    /// rather than duplicated. When the list is at capacity the oldest key
    /// is dropped first.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }
        if let Some(&node_ptr) = self.index.get(&key) {
            self.detach(node_ptr);
            self.attach_front(node_ptr);
            return;
        }
        if self.index.len() >= self.capacity {
            self.pop_oldest();
        }
        let node = Box::new(Node {
            prev: None,
            next: None,
            key: key.clone(),
        });
        let node_ptr = NonNull::from(Box::leak(node));
        self.index.insert(key, node_ptr);
        self.attach_front(node_ptr);
    }

    /// Removes a key, returning whether it was present.
    ///
    /// This is the ghost-hit path: the caller observed a lookup for a key
    /// that was recently evicted and consumes the ghost entry.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(node_ptr) => {
                self.detach(node_ptr);
                unsafe {
                    drop(Box::from_raw(node_ptr.as_ptr()));
                }
                true
            },
            None => false,
        }
    }

    /// Drops all tracked keys.
    pub fn clear(&mut self) {
        let mut current = self.head;
        while let Some(node_ptr) = current {
            unsafe {
                current = node_ptr.as_ref().next;
                drop(Box::from_raw(node_ptr.as_ptr()));
            }
        }
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Validates the index/list correspondence.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut count = 0usize;
        let mut last = None;
        let mut current = self.head;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            if node.prev != last {
                return Err(InvariantError::new("ghost list back-link mismatch"));
            }
            match self.index.get(&node.key) {
                Some(&indexed) if indexed == node_ptr => {},
                _ => return Err(InvariantError::new("ghost node missing from index")),
            }
            count += 1;
            if count > self.index.len() {
                return Err(InvariantError::new("cycle detected in ghost list"));
            }
            last = Some(node_ptr);
            current = node.next;
        }
        if self.tail != last {
            return Err(InvariantError::new("ghost list tail mismatch"));
        }
        if count != self.index.len() {
            return Err(InvariantError::new(format!(
                "ghost list holds {} nodes but index holds {}",
                count,
                self.index.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new("ghost list exceeds capacity"));
        }
        Ok(())
    }

    #[inline(always)]
    fn detach(&mut self, node_ptr: NonNull<Node<K>>) {
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
    fn attach_front(&mut self, mut node_ptr: NonNull<Node<K>>) {
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

    fn pop_oldest(&mut self) {
        if let Some(tail_ptr) = self.tail {
            self.detach(tail_ptr);
            let node = unsafe { Box::from_raw(tail_ptr.as_ptr()) };
            self.index.remove(&node.key);
        }
    }
}

impl<K> Drop for GhostList<K> {
    fn drop(&mut self) {
        let mut current = self.head;
        while let Some(node_ptr) = current {
            unsafe {
                current = node_ptr.as_ref().next;
                drop(Box::from_raw(node_ptr.as_ptr()));
            }
        }
    }
}

impl<K> std::fmt::Debug for GhostList<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GhostList")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_contains() {
        let mut ghosts = GhostList::new(4);
        ghosts.record(1);
        ghosts.record(2);

        assert!(ghosts.contains(&1));
        assert!(ghosts.contains(&2));
        assert!(!ghosts.contains(&3));
        assert_eq!(ghosts.len(), 2);
        ghosts.check_invariants().unwrap();
    }

    #[test]
    fn oldest_drops_when_full() {
        let mut ghosts = GhostList::new(2);
        ghosts.record("a");
        ghosts.record("b");
        ghosts.record("c");

        assert!(!ghosts.contains(&"a"));
        assert!(ghosts.contains(&"b"));
        assert!(ghosts.contains(&"c"));
        assert_eq!(ghosts.len(), 2);
        ghosts.check_invariants().unwrap();
    }

    #[test]
    fn rerecord_refreshes_position() {
        let mut ghosts = GhostList::new(2);
        ghosts.record("a");
        ghosts.record("b");
        ghosts.record("a"); // "a" is now newest
        ghosts.record("c"); // drops "b", the oldest

        assert!(ghosts.contains(&"a"));
        assert!(!ghosts.contains(&"b"));
        assert!(ghosts.contains(&"c"));
        ghosts.check_invariants().unwrap();
    }

    #[test]
    fn remove_reports_presence() {
        let mut ghosts = GhostList::new(4);
        ghosts.record(7);

        assert!(ghosts.remove(&7));
        assert!(!ghosts.remove(&7));
        assert!(ghosts.is_empty());
        ghosts.check_invariants().unwrap();
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut ghosts = GhostList::new(0);
        ghosts.record(1);

        assert!(!ghosts.contains(&1));
        assert_eq!(ghosts.len(), 0);
    }

    #[test]
    fn clear_drops_everything() {
        let mut ghosts = GhostList::new(8);
        for i in 0..8 {
            ghosts.record(i);
        }
        ghosts.clear();

        assert!(ghosts.is_empty());
        for i in 0..8 {
            assert!(!ghosts.contains(&i));
        }
        ghosts.check_invariants().unwrap();
    }

    #[test]
    fn churn_keeps_bound() {
        let mut ghosts = GhostList::new(16);
        for i in 0..1000 {
            ghosts.record(i % 40);
        }
        assert!(ghosts.len() <= 16);
        ghosts.check_invariants().unwrap();
    }
}
