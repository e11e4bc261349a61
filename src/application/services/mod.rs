//! Application services composing domain ports.

mod durable_cache;
mod tiered_cache;

pub use durable_cache::{
    DEFAULT_EVICTION_FRACTION, DEFAULT_MAX_AGE, DEFAULT_MAX_CACHE_BYTES, DurableCacheConfig,
    DurableThumbnailCache, EvictionOutcome,
};
pub use tiered_cache::{CacheHit, CacheTier, TieredImageCache};
