pub use crate::builder::{CacheBuilder, PolicyKind};
pub use crate::ds::{FreqBuckets, GhostList, ShardSelector};
pub use crate::policy::{
    ArcCache, ArcCore, LfuCache, LfuCore, LruCache, LruCore, LrukCache, LrukCore, ShardedCache,
};
pub use crate::traits::CachePolicy;
