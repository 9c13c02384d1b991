//! Deterministic key-to-shard mapping.
//!
//! The sharded cache wrapper partitions its key space across independent
//! single-policy shards. This module provides the selection function:
//! `hash(key) mod shards`, with an optional seed folded into the hash so
//! that two sharded structures over the same keys need not collide on the
//! same pathological distribution.
//!
//! ## Example Usage
//!
//! ```
//! use cachemux::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//!
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//!
//! // Same key, same shard: every operation on a key routes identically.
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic shard selector using a seeded hash.
///
/// Maps any `Hash`able key to a shard index in `[0, shards)`. The same
/// `(key, seed, shards)` tuple always produces the same result. The shard
/// count is clamped to at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards with the given `seed`.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Returns the number of shards.
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_is_deterministic() {
        let selector = ShardSelector::new(8, 123);

        let a = selector.shard_for_key(&"key");
        let b = selector.shard_for_key(&"key");
        assert_eq!(a, b);
        assert!(a < selector.shard_count());
    }

    #[test]
    fn zero_shards_clamps_to_one() {
        let selector = ShardSelector::new(0, 0);
        assert_eq!(selector.shard_count(), 1);
        assert_eq!(selector.shard_for_key(&42u64), 0);
    }
}
