//! Process-lifetime image cache keyed by source URL.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::LoadedImage;
use crate::domain::ports::ImageCachePort;

/// Unbounded in-memory overlay that deduplicates work within one run.
/// No expiry and no eviction beyond explicit removal.
pub struct SessionImageCache {
    cache: RwLock<HashMap<String, Arc<LoadedImage>>>,
    entries: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SessionImageCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            entries: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl Default for SessionImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionImageCache")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Session cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[async_trait::async_trait]
impl ImageCachePort for SessionImageCache {
    async fn get(&self, url: &str) -> Option<Arc<LoadedImage>> {
        let cache = self.cache.read().await;
        if let Some(image) = cache.get(url) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Session cache hit");
            Some(image.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Session cache miss");
            None
        }
    }

    async fn put(&self, url: String, image: Arc<LoadedImage>) {
        let mut cache = self.cache.write().await;
        trace!(url = %url, "Storing image in session cache");
        if cache.insert(url, image).is_none() {
            self.entries.fetch_add(1, Ordering::Release);
        }
    }

    async fn evict(&self, url: &str) {
        let mut cache = self.cache.write().await;
        if cache.remove(url).is_some() {
            self.entries.fetch_sub(1, Ordering::Release);
            debug!(url, "Evicted image from session cache");
        }
    }

    fn len(&self) -> usize {
        self.entries.load(Ordering::Acquire)
    }

    async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        self.entries.store(0, Ordering::Release);
        debug!("Cleared session image cache");
    }
}
