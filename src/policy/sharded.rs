//! # Sharded cache wrapper.
//!
//! Fans `put`/`get` across N independent instances of a single-policy
//! cache, chosen by `hash(key) mod N`. Each shard keeps its own mutex, so
//! throughput under contention scales with the shard count; the wrapper
//! itself holds no lock and adds no cross-shard coordination.
//!
//! ```text
//!   put(k, v) ──► selector.shard_for_key(&k) ──► shards[i].put(k, v)
//!
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ shard 0 │ shard 1 │ shard 2 │ shard 3 │   each of capacity
//!   │  P      │  P      │  P      │  P      │   ceil(total / N)
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! Every operation on a key routes to the same shard, so per-key
//! linearizability carries over from the underlying policy. No ordering is
//! guaranteed across shards.

use std::hash::Hash;
use std::thread;

use crate::ds::ShardSelector;
use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::traits::CachePolicy;

/// A cache partitioned across independent single-policy shards.
///
/// `P` is any [`CachePolicy`] implementation; construction takes a closure
/// from per-shard capacity to shard, plus convenience constructors for the
/// four built-in policies. A `shard_count` of 0 resolves to the hardware
/// parallelism hint.
///
/// # Example
///
/// ```
/// use cachemux::policy::lru::LruCache;
/// use cachemux::policy::sharded::ShardedCache;
/// use cachemux::traits::CachePolicy;
///
/// let cache: ShardedCache<LruCache<u64, String>> = ShardedCache::lru(128, 4);
/// assert_eq!(cache.shard_count(), 4);
///
/// cache.put(1, "one".to_string());
/// assert_eq!(cache.get(&1), Some("one".to_string()));
/// ```
pub struct ShardedCache<P> {
    shards: Vec<P>,
    selector: ShardSelector,
}

impl<P> ShardedCache<P> {
    /// Builds a sharded cache from a shard constructor.
    ///
    /// `make_shard` is called once per shard with the per-shard capacity
    /// `ceil(total_capacity / shard_count)`.
    pub fn with_shards(
        total_capacity: usize,
        shard_count: usize,
        mut make_shard: impl FnMut(usize) -> P,
    ) -> Self {
        let count = resolve_shard_count(shard_count);
        let per_shard = total_capacity.div_ceil(count);
        ShardedCache {
            shards: (0..count).map(|_| make_shard(per_shard)).collect(),
            selector: ShardSelector::new(count, 0),
        }
    }

    /// Number of shards.
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Inserts or overwrites an entry in the owning shard.
    pub fn put<K, V>(&self, key: K, value: V)
    where
        K: Hash,
        P: CachePolicy<K, V>,
    {
        self.shards[self.selector.shard_for_key(&key)].put(key, value);
    }

    /// Returns the value from the owning shard and records the access.
    pub fn get<K, V>(&self, key: &K) -> Option<V>
    where
        K: Hash,
        P: CachePolicy<K, V>,
    {
        self.shards[self.selector.shard_for_key(key)].get(key)
    }

    /// Total resident entries, summed across shards.
    ///
    /// The sum is not a snapshot: shards are read one at a time.
    pub fn len<K, V>(&self) -> usize
    where
        P: CachePolicy<K, V>,
    {
        self.shards.iter().map(|shard| shard.len()).sum()
    }

    /// Returns `true` when every shard is empty.
    pub fn is_empty<K, V>(&self) -> bool
    where
        P: CachePolicy<K, V>,
    {
        self.shards.iter().all(|shard| shard.is_empty())
    }
}

impl<K, V> ShardedCache<LruCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LRU with `total_capacity` split across `shard_count` shards.
    pub fn lru(total_capacity: usize, shard_count: usize) -> Self {
        Self::with_shards(total_capacity, shard_count, LruCache::new)
    }
}

impl<K, V> ShardedCache<LrukCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LRU-K; each shard gets its own history of
    /// `history_capacity` counters and promotion threshold `k`.
    pub fn lru_k(
        total_capacity: usize,
        shard_count: usize,
        history_capacity: usize,
        k: u64,
    ) -> Self {
        Self::with_shards(total_capacity, shard_count, |capacity| {
            LrukCache::new(capacity, history_capacity, k)
        })
    }
}

impl<K, V> ShardedCache<LfuCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LFU with the default aging ceiling.
    pub fn lfu(total_capacity: usize, shard_count: usize) -> Self {
        Self::with_shards(total_capacity, shard_count, LfuCache::new)
    }

    /// Sharded LFU with an explicit aging ceiling per shard.
    pub fn lfu_with_max_avg_freq(
        total_capacity: usize,
        shard_count: usize,
        max_avg_freq: u64,
    ) -> Self {
        Self::with_shards(total_capacity, shard_count, |capacity| {
            LfuCache::with_max_avg_freq(capacity, max_avg_freq)
        })
    }

    /// Drops all entries in every shard.
    pub fn purge(&self) {
        for shard in &self.shards {
            shard.purge();
        }
    }
}

impl<K, V> ShardedCache<ArcCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded ARC with the default transform threshold.
    pub fn arc(total_capacity: usize, shard_count: usize) -> Self {
        Self::with_shards(total_capacity, shard_count, ArcCache::new)
    }
}

impl<K, V, P> CachePolicy<K, V> for ShardedCache<P>
where
    K: Hash,
    P: CachePolicy<K, V>,
{
    fn put(&self, key: K, value: V) {
        ShardedCache::put(self, key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        ShardedCache::get(self, key)
    }

    fn len(&self) -> usize {
        ShardedCache::len(self)
    }
}

impl<P> std::fmt::Debug for ShardedCache<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shards", &self.shards.len())
            .finish_non_exhaustive()
    }
}

/// 0 means "use the hardware parallelism hint", never less than 1.
fn resolve_shard_count(shard_count: usize) -> usize {
    if shard_count > 0 {
        return shard_count;
    }
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
