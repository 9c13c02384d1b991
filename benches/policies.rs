//! Throughput comparison across the eviction policies.
//!
//! Each bench drives one policy with a deterministic key stream: uniform
//! (worst case for everyone), hot/cold (favors recency and frequency), and
//! Zipfian (realistic skew). Streams are pre-generated so the benches
//! measure cache work, not RNG work.

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};

use cachemux::policy::arc::ArcCache;
use cachemux::policy::lfu::LfuCache;
use cachemux::policy::lru::LruCache;
use cachemux::policy::lru_k::LrukCache;
use cachemux::policy::sharded::ShardedCache;
use cachemux::traits::CachePolicy;

const CAPACITY: usize = 1024;
const UNIVERSE: u64 = 16 * 1024;
const STREAM_LEN: usize = 32 * 1024;
const SEED: u64 = 0x5EED;

fn uniform_stream() -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(SEED);
    (0..STREAM_LEN).map(|_| rng.random_range(0..UNIVERSE)).collect()
}

fn hot_cold_stream() -> Vec<u64> {
    // 90% of accesses hit a hot set sized at half the cache capacity.
    let hot_keys = (CAPACITY / 2) as u64;
    let mut rng = SmallRng::seed_from_u64(SEED);
    (0..STREAM_LEN)
        .map(|_| {
            if rng.random_range(0..100) < 90 {
                rng.random_range(0..hot_keys)
            } else {
                hot_keys + rng.random_range(0..UNIVERSE - hot_keys)
            }
        })
        .collect()
}

fn zipf_stream() -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let zipf = Zipf::new(UNIVERSE as f64, 1.1).expect("valid zipf parameters");
    (0..STREAM_LEN)
        .map(|_| zipf.sample(&mut rng) as u64 - 1)
        .collect()
}

/// 30% put / 70% get mix over the key stream, the shape of the hit-rate
/// driver this library grew up against.
fn run_mixed<C: CachePolicy<u64, u64>>(cache: &C, stream: &[u64]) -> u64 {
    let mut hits = 0u64;
    for (i, &key) in stream.iter().enumerate() {
        if i % 10 < 3 {
            cache.put(key, key);
        } else if cache.get(&key).is_some() {
            hits += 1;
        }
    }
    std::hint::black_box(hits)
}

fn bench_policy<C, F>(c: &mut Criterion, name: &str, make: F)
where
    C: CachePolicy<u64, u64>,
    F: Fn() -> C + Copy,
{
    let streams = [
        ("uniform", uniform_stream()),
        ("hot_cold", hot_cold_stream()),
        ("zipf", zipf_stream()),
    ];
    for (stream_name, stream) in &streams {
        c.bench_function(&format!("{}_{}", name, stream_name), |b| {
            b.iter_batched(
                make,
                |cache| run_mixed(&cache, stream),
                BatchSize::LargeInput,
            )
        });
    }
}

fn bench_lru(c: &mut Criterion) {
    bench_policy(c, "lru", || LruCache::new(CAPACITY));
}

fn bench_lru_k(c: &mut Criterion) {
    bench_policy(c, "lru_k", || LrukCache::new(CAPACITY, CAPACITY * 4, 2));
}

fn bench_lfu(c: &mut Criterion) {
    bench_policy(c, "lfu", || LfuCache::new(CAPACITY));
}

fn bench_lfu_aging(c: &mut Criterion) {
    bench_policy(c, "lfu_aging", || {
        LfuCache::with_max_avg_freq(CAPACITY, 64)
    });
}

fn bench_arc(c: &mut Criterion) {
    bench_policy(c, "arc", || ArcCache::new(CAPACITY));
}

fn bench_sharded_lru(c: &mut Criterion) {
    bench_policy(c, "sharded_lru", || {
        ShardedCache::<LruCache<u64, u64>>::lru(CAPACITY, 8)
    });
}

criterion_group!(
    benches,
    bench_lru,
    bench_lru_k,
    bench_lfu,
    bench_lfu_aging,
    bench_arc,
    bench_sharded_lru
);
criterion_main!(benches);
