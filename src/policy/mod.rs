pub mod arc;
pub mod lfu;
pub mod lru;
pub mod lru_k;
pub mod sharded;

pub use arc::{ArcCache, ArcCore};
pub use lfu::{LfuCache, LfuCore};
pub use lru::{LruCache, LruCore};
pub use lru_k::{LrukCache, LrukCore};
pub use sharded::ShardedCache;
