//! # The Cache Policy Contract
//!
//! This module defines the single abstract contract implemented by every
//! cache type in the library, letting callers substitute eviction policies
//! without touching client logic.
//!
//! ## Architecture
//!
//! ```text
//!                      ┌───────────────────────────────────────┐
//!                      │         CachePolicy<K, V>             │
//!                      │                                       │
//!                      │  put(&self, K, V)                     │
//!                      │  get(&self, &K) → Option<V>           │
//!                      │  len(&self) → usize                   │
//!                      │  is_empty(&self) → bool               │
//!                      │  get_or_default(&self, &K) → V        │
//!                      └───────────────────┬───────────────────┘
//!                                          │
//!          ┌──────────────┬────────────────┼────────────────┬──────────────┐
//!          ▼              ▼                ▼                ▼              ▼
//!   ┌────────────┐ ┌─────────────┐ ┌─────────────┐ ┌─────────────┐ ┌──────────────┐
//!   │ LruCache   │ │ LrukCache   │ │ LfuCache    │ │ ArcCache    │ │ ShardedCache │
//!   │ (recency)  │ │ (k-gate)    │ │ (frequency) │ │ (adaptive)  │ │ (fan-out)    │
//!   └────────────┘ └─────────────┘ └─────────────┘ └─────────────┘ └──────────────┘
//! ```
//!
//! ## Contract
//!
//! | Operation        | Semantics                                                  |
//! |------------------|------------------------------------------------------------|
//! | `put`            | Insert or overwrite; an overwrite counts as an access; may evict exactly one other entry when full |
//! | `get`            | Return a clone of the value and record the access, or `None` |
//! | `len`            | Resident entries                                           |
//! | `get_or_default` | Miss maps to `V::default()`; the by-value convenience form |
//!
//! Every implementor is internally synchronized: methods take `&self` and
//! are safe to call concurrently from any number of threads on the same
//! instance (hence the `Send + Sync` supertrait). A miss is not an error;
//! there are no fallible operations anywhere in the contract. Caches
//! constructed with capacity 0 are inert: `put` is a no-op, `get` always
//! misses.
//!
//! ## Dispatch
//!
//! Use the trait generically when the policy is fixed at compile time, or
//! as `Box<dyn CachePolicy<K, V>>` (see [`crate::builder`]) when a harness
//! selects the policy at run time. All trait methods are dyn-dispatchable
//! except `get_or_default`, which is available on concrete types.

/// Abstract contract over every eviction policy in the library.
///
/// # Example
///
/// ```
/// use cachemux::policy::lru::LruCache;
/// use cachemux::traits::CachePolicy;
///
/// fn warm<C: CachePolicy<u64, String>>(cache: &C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.put(*key, value.clone());
///     }
/// }
///
/// let cache = LruCache::new(16);
/// warm(&cache, &[(1, "one".into()), (2, "two".into())]);
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CachePolicy<K, V>: Send + Sync {
    /// Inserts or overwrites an entry.
    ///
    /// An overwrite also counts as an access for the policy's bookkeeping.
    /// At most one other entry is evicted to make room. On an inert
    /// (zero-capacity) cache this is a no-op.
    fn put(&self, key: K, value: V);

    /// Returns a clone of the value and records the access, or `None`.
    fn get(&self, key: &K) -> Option<V>;

    /// Number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` when no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Like [`get`](Self::get), but a miss yields `V::default()`.
    ///
    /// Mirrors callers that treat the default value as "absent" and never
    /// store it. Not available through `dyn CachePolicy`.
    fn get_or_default(&self, key: &K) -> V
    where
        Self: Sized,
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }
}
