//! Durable thumbnail layer: expiry and capacity policy over a store backend.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::domain::entities::{CacheEntry, ThumbnailPayload};
use crate::domain::errors::StoreResult;
use crate::domain::ports::ThumbnailStorePort;

/// Entries older than this are treated as absent (7 days).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Capacity above which eviction runs (100 MB).
pub const DEFAULT_MAX_CACHE_BYTES: u64 = 100 * 1024 * 1024;

/// Share of the capacity freed by one eviction pass.
pub const DEFAULT_EVICTION_FRACTION: f64 = 0.3;

/// Limits applied by [`DurableThumbnailCache`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurableCacheConfig {
    /// Maximum entry age before lazy expiry.
    pub max_age: Duration,
    /// Capacity in estimated bytes.
    pub max_bytes: u64,
    /// Share of `max_bytes` to free when over capacity.
    pub eviction_fraction: f64,
}

impl Default for DurableCacheConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            max_bytes: DEFAULT_MAX_CACHE_BYTES,
            eviction_fraction: DEFAULT_EVICTION_FRACTION,
        }
    }
}

impl DurableCacheConfig {
    /// Bytes one eviction pass tries to free when the store holds `current_size`.
    ///
    /// At least `eviction_fraction * max_bytes`, and always enough to get
    /// back under the cap.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn eviction_target(&self, current_size: u64) -> u64 {
        let fraction = (self.max_bytes as f64 * self.eviction_fraction.clamp(0.0, 1.0)) as u64;
        fraction.max(current_size.saturating_sub(self.max_bytes))
    }
}

/// Result of an eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionOutcome {
    /// Number of entries deleted.
    pub removed: usize,
    /// Estimated bytes freed.
    pub freed_bytes: u64,
}

/// Persistent, TTL- and capacity-bounded thumbnail cache keyed by URL.
///
/// Expired entries are removed lazily when read. Eviction removes the oldest
/// writes first; reads do not refresh an entry's timestamp, so write time is
/// only an approximation of recency.
#[derive(Clone)]
pub struct DurableThumbnailCache {
    store: Arc<dyn ThumbnailStorePort>,
    config: DurableCacheConfig,
}

impl std::fmt::Debug for DurableThumbnailCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableThumbnailCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DurableThumbnailCache {
    /// Creates a cache over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ThumbnailStorePort>, config: DurableCacheConfig) -> Self {
        Self { store, config }
    }

    /// Creates a cache with the default limits.
    #[must_use]
    pub fn with_defaults(store: Arc<dyn ThumbnailStorePort>) -> Self {
        Self::new(store, DurableCacheConfig::default())
    }

    /// Returns the active limits.
    #[must_use]
    pub const fn config(&self) -> &DurableCacheConfig {
        &self.config
    }

    /// Reads an entry, deleting it instead if it has expired.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn get(&self, url: &str) -> StoreResult<Option<CacheEntry>> {
        let Some(entry) = self.store.get(url).await? else {
            trace!(url, "Durable cache miss");
            return Ok(None);
        };

        if entry.is_expired(now_millis(), self.config.max_age) {
            debug!(url, timestamp = entry.timestamp, "Durable cache entry expired");
            if let Err(e) = self.store.delete(url).await {
                warn!(url, error = %e, "Failed to delete expired cache entry");
            }
            return Ok(None);
        }

        trace!(url, "Durable cache hit");
        Ok(Some(entry))
    }

    /// Writes `payload` for `url`, replacing any previous entry, then
    /// enforces the capacity limit.
    ///
    /// # Errors
    /// Returns error if the write fails. Eviction failures are logged only.
    pub async fn set(&self, url: &str, payload: ThumbnailPayload) -> StoreResult<CacheEntry> {
        let entry = CacheEntry::new(url, payload, now_millis());
        self.store.put(entry.clone()).await?;
        debug!(
            url,
            size = entry.estimated_byte_size,
            "Stored thumbnails in durable cache"
        );

        if let Err(e) = self.cleanup_if_needed().await {
            warn!(error = %e, "Durable cache cleanup failed");
        }

        Ok(entry)
    }

    /// Removes one entry.
    ///
    /// # Errors
    /// Returns error if the store rejects the delete.
    pub async fn delete(&self, url: &str) -> StoreResult<()> {
        self.store.delete(url).await
    }

    /// Removes every entry.
    ///
    /// # Errors
    /// Returns error if the store cannot be cleared.
    pub async fn clear(&self) -> StoreResult<()> {
        self.store.clear().await?;
        info!("Cleared durable thumbnail cache");
        Ok(())
    }

    /// Sum of estimated entry sizes.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn total_size(&self) -> StoreResult<u64> {
        self.store.total_size().await
    }

    /// Number of stored entries, expired ones included.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn len(&self) -> StoreResult<usize> {
        self.store.len().await
    }

    /// Returns true if nothing is stored.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Runs an eviction pass if the store is over capacity.
    ///
    /// # Errors
    /// Returns error if sizing or eviction fails.
    pub async fn cleanup_if_needed(&self) -> StoreResult<Option<EvictionOutcome>> {
        let current_size = self.store.total_size().await?;
        if current_size <= self.config.max_bytes {
            return Ok(None);
        }

        debug!(
            current_size,
            max_size = self.config.max_bytes,
            "Durable cache over limit, cleaning up"
        );
        self.evict_oldest(current_size).await.map(Some)
    }

    /// Deletes the oldest entries until the eviction target is reached.
    ///
    /// # Errors
    /// Returns error if the scan or the delete fails.
    pub async fn evict_oldest(&self, current_size: u64) -> StoreResult<EvictionOutcome> {
        let target = self.config.eviction_target(current_size);
        let mut urls = Vec::new();
        let mut freed_bytes = 0u64;

        for candidate in self.store.oldest_first().await? {
            if freed_bytes >= target {
                break;
            }
            freed_bytes += candidate.estimated_byte_size;
            urls.push(candidate.url);
        }

        if urls.is_empty() {
            return Ok(EvictionOutcome::default());
        }

        self.store.delete_many(&urls).await?;

        let outcome = EvictionOutcome {
            removed: urls.len(),
            freed_bytes,
        };
        info!(
            removed = outcome.removed,
            freed_bytes = outcome.freed_bytes,
            "Durable cache cleanup complete"
        );
        Ok(outcome)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fixtures::payload_with_len;
    use crate::domain::ports::mocks::MockThumbnailStore;

    fn raw_entry(url: &str, timestamp: i64, size: u64) -> CacheEntry {
        let mut entry = CacheEntry::new(url, payload_with_len(40), timestamp);
        entry.estimated_byte_size = size;
        entry
    }

    fn small_cache(store: Arc<MockThumbnailStore>, max_bytes: u64) -> DurableThumbnailCache {
        DurableThumbnailCache::new(
            store,
            DurableCacheConfig {
                max_bytes,
                ..DurableCacheConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let store = Arc::new(MockThumbnailStore::new());
        let cache = DurableThumbnailCache::with_defaults(store);
        let payload = payload_with_len(120);

        let before = now_millis();
        cache.set("file:///a.jpg", payload.clone()).await.unwrap();
        let entry = cache.get("file:///a.jpg").await.unwrap().unwrap();

        assert_eq!(entry.url, "file:///a.jpg");
        assert_eq!(entry.thumbnails, payload.thumbnails);
        assert_eq!(entry.size, payload.size);
        assert!((entry.aspect_ratio - payload.aspect_ratio).abs() < f64::EPSILON);
        assert!(entry.timestamp >= before);
        assert!(entry.timestamp - before < 1_000);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_entry() {
        let store = Arc::new(MockThumbnailStore::new());
        let cache = DurableThumbnailCache::with_defaults(store);

        cache.set("u", payload_with_len(100)).await.unwrap();
        cache.set("u", payload_with_len(200)).await.unwrap();

        assert_eq!(cache.len().await.unwrap(), 1);
        assert_eq!(cache.total_size().await.unwrap(), 450);
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_and_removed() {
        let store = Arc::new(MockThumbnailStore::new());
        let cache = DurableThumbnailCache::with_defaults(store.clone());
        let max_age_ms = i64::try_from(DEFAULT_MAX_AGE.as_millis()).unwrap();

        store.insert_raw(raw_entry("old", now_millis() - (max_age_ms + 1), 500));
        store.insert_raw(raw_entry("fresh", now_millis(), 100));

        assert!(cache.get("old").await.unwrap().is_none());
        assert!(!store.contains("old"));
        assert_eq!(cache.total_size().await.unwrap(), 100);
        assert!(cache.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_under_capacity_does_not_evict() {
        let store = Arc::new(MockThumbnailStore::new());
        let cache = small_cache(store, 10_000);

        cache.set("a", payload_with_len(100)).await.unwrap();

        assert_eq!(cache.cleanup_if_needed().await.unwrap(), None);
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_eviction_removes_oldest_first() {
        let store = Arc::new(MockThumbnailStore::new());
        let cache = small_cache(store.clone(), 1_000);
        for (i, url) in ["t1", "t2", "t3", "t4"].into_iter().enumerate() {
            store.insert_raw(raw_entry(url, i64::try_from(i).unwrap() + 1, 240));
        }

        // 960 + 225 crosses the cap; the target is 30% of 1000.
        cache.set("new", payload_with_len(100)).await.unwrap();

        assert!(!store.contains("t1"));
        assert!(!store.contains("t2"));
        assert!(store.contains("t3"));
        assert!(store.contains("t4"));
        assert!(store.contains("new"));
        let total = cache.total_size().await.unwrap();
        assert!(total < 1_185);
        assert!(total <= 1_000);
    }

    #[tokio::test]
    async fn test_eviction_frees_enough_to_get_under_cap() {
        let store = Arc::new(MockThumbnailStore::new());
        let cache = small_cache(store.clone(), 1_000);
        for (i, url) in ["t1", "t2", "t3", "t4"].into_iter().enumerate() {
            store.insert_raw(raw_entry(url, i64::try_from(i).unwrap() + 1, 500));
        }

        cache.set("new", payload_with_len(100)).await.unwrap();

        assert!(cache.total_size().await.unwrap() <= 1_000);
        assert!(store.contains("t4"));
        assert!(store.contains("new"));
    }

    #[test]
    fn test_eviction_target() {
        let config = DurableCacheConfig {
            max_bytes: 1_000,
            ..DurableCacheConfig::default()
        };
        assert_eq!(config.eviction_target(1_100), 300);
        assert_eq!(config.eviction_target(2_000), 1_000);
    }

    #[tokio::test]
    async fn test_store_failures_surface_as_errors() {
        let store = Arc::new(MockThumbnailStore::failing());
        let cache = DurableThumbnailCache::with_defaults(store);

        assert!(cache.get("a").await.is_err());
        assert!(cache.set("a", payload_with_len(10)).await.is_err());
        assert!(cache.total_size().await.is_err());
    }

    #[tokio::test]
    async fn test_clear_and_delete() {
        let store = Arc::new(MockThumbnailStore::new());
        let cache = DurableThumbnailCache::with_defaults(store);

        cache.set("a", payload_with_len(10)).await.unwrap();
        cache.set("b", payload_with_len(10)).await.unwrap();
        cache.delete("a").await.unwrap();
        assert!(cache.get("a").await.unwrap().is_none());
        assert_eq!(cache.len().await.unwrap(), 1);

        cache.clear().await.unwrap();
        assert!(cache.is_empty().await.unwrap());
    }
}
