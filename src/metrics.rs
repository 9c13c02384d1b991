//! Per-policy operation counters, compiled under the `metrics` feature.
//!
//! Each counting cache core owns one of the recorder structs below and bumps
//! it inline from its hot paths; the public `metrics_snapshot()` accessors
//! copy the counters out together with the current occupancy. Counters are
//! plain `u64` fields; the cores are single-threaded behind their wrapper
//! mutex, so no atomics are needed. With the feature disabled none of this
//! exists and the cores carry no extra state.

/// Counters recorded by the LRU core.
#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
}

/// Counters recorded by the LFU core.
#[derive(Debug, Default, Clone)]
pub struct LfuMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    /// Number of frequency-compaction sweeps performed.
    pub aging_sweeps: u64,
}

/// Counters recorded by the LRU-K core.
#[derive(Debug, Default, Clone)]
pub struct LrukMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    /// Entries admitted into the main cache after reaching k accesses.
    pub promotions: u64,
}

/// Counters recorded by the ARC core and its sub-caches.
#[derive(Debug, Default, Clone)]
pub struct ArcMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    /// Lookups that landed in a ghost list and adapted the capacity split.
    pub ghost_hits: u64,
}

/// Point-in-time view of [`LruMetrics`] plus occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    pub cache_len: usize,
    pub capacity: usize,
}

/// Point-in-time view of [`LfuMetrics`] plus occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LfuMetricsSnapshot {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    pub aging_sweeps: u64,
    pub cache_len: usize,
    pub capacity: usize,
}

/// Point-in-time view of [`LrukMetrics`] plus main-cache occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrukMetricsSnapshot {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub promotions: u64,
    pub cache_len: usize,
    pub capacity: usize,
}

/// Point-in-time view of [`ArcMetrics`] plus occupancy across both
/// sub-caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcMetricsSnapshot {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    /// Demotions into either ghost list, summed across both sub-caches.
    pub evicted_entries: u64,
    pub ghost_hits: u64,
    pub cache_len: usize,
    pub capacity: usize,
}
