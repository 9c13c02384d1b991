//! Unified cache builder over all eviction policies.
//!
//! Serves callers that pick the policy at run time (a benchmark harness
//! comparing hit rates, a config-driven service) by erasing the concrete
//! cache type behind `Box<dyn CachePolicy<K, V>>`. Callers that know the
//! policy at compile time should construct the concrete types directly and
//! keep static dispatch.
//!
//! ## Example
//!
//! ```
//! use cachemux::builder::{CacheBuilder, PolicyKind};
//! use cachemux::traits::CachePolicy;
//!
//! let cache = CacheBuilder::new(100).build::<u64, String>(PolicyKind::Lru);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::traits::CachePolicy;

/// Available eviction policies and their parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least Recently Used eviction.
    Lru,
    /// LRU-K promotion gate: `k` accesses admit an entry; the history
    /// cache tracks up to `history_capacity` counters.
    LruK { history_capacity: usize, k: u64 },
    /// Least Frequently Used eviction with frequency aging.
    Lfu { max_avg_freq: u64 },
    /// Adaptive Replacement Cache.
    Arc { transform_threshold: u64 },
}

/// Builder producing a boxed [`CachePolicy`] for the selected policy.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Starts a builder for a cache of the given capacity.
    ///
    /// A capacity of 0 yields an inert cache for every policy.
    pub fn new(capacity: usize) -> Self {
        CacheBuilder { capacity }
    }

    /// Builds the selected policy behind a trait object.
    pub fn build<K, V>(self, kind: PolicyKind) -> Box<dyn CachePolicy<K, V>>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        match kind {
            PolicyKind::Lru => Box::new(LruCache::new(self.capacity)),
            PolicyKind::LruK {
                history_capacity,
                k,
            } => Box::new(LrukCache::new(self.capacity, history_capacity, k)),
            PolicyKind::Lfu { max_avg_freq } => {
                Box::new(LfuCache::with_max_avg_freq(self.capacity, max_avg_freq))
            },
            PolicyKind::Arc {
                transform_threshold,
            } => Box::new(ArcCache::with_threshold(self.capacity, transform_threshold)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::lfu::DEFAULT_MAX_AVG_FREQ;
    use crate::policy::arc::DEFAULT_TRANSFORM_THRESHOLD;

    fn all_kinds() -> Vec<PolicyKind> {
        vec![
            PolicyKind::Lru,
            PolicyKind::LruK {
                history_capacity: 32,
                k: 1,
            },
            PolicyKind::Lfu {
                max_avg_freq: DEFAULT_MAX_AVG_FREQ,
            },
            PolicyKind::Arc {
                transform_threshold: DEFAULT_TRANSFORM_THRESHOLD,
            },
        ]
    }

    #[test]
    fn every_policy_round_trips() {
        for kind in all_kinds() {
            let cache = CacheBuilder::new(16).build::<u64, u64>(kind);
            cache.put(1, 10);
            assert_eq!(cache.get(&1), Some(10), "round trip failed for {:?}", kind);
        }
    }

    #[test]
    fn every_policy_is_inert_at_zero_capacity() {
        for kind in all_kinds() {
            let cache = CacheBuilder::new(0).build::<u64, u64>(kind);
            cache.put(1, 10);
            assert_eq!(cache.get(&1), None, "capacity 0 leaked for {:?}", kind);
            assert_eq!(cache.len(), 0);
        }
    }

    #[test]
    fn policies_can_be_compared_side_by_side() {
        let caches: Vec<Box<dyn CachePolicy<u64, u64>>> = all_kinds()
            .into_iter()
            .map(|kind| CacheBuilder::new(8).build(kind))
            .collect();

        for cache in &caches {
            for key in 0..8 {
                cache.put(key, key);
                cache.put(key, key); // second access admits under LRU-K
            }
        }
        for cache in &caches {
            assert!(cache.get(&7).is_some());
        }
    }
}
