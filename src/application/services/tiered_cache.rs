//! Two-level thumbnail cache: session overlay in front of the durable layer.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::domain::entities::LoadedImage;
use crate::domain::ports::ImageCachePort;

use super::durable_cache::DurableThumbnailCache;

/// Layer that answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    /// Process-lifetime overlay.
    Session,
    /// Persistent store.
    Durable,
}

/// A successful lookup.
#[derive(Debug, Clone)]
pub struct CacheHit {
    /// The cached image.
    pub image: Arc<LoadedImage>,
    /// Layer that served it.
    pub tier: CacheTier,
}

/// Session and durable layers addressed by the same source URL.
///
/// The durable layer is optional and fails independently: every durable
/// error is logged and treated as a miss or a no-op, so callers never see it.
pub struct TieredImageCache {
    session: Arc<dyn ImageCachePort>,
    durable: Option<DurableThumbnailCache>,
}

impl std::fmt::Debug for TieredImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredImageCache")
            .field("session_len", &self.session.len())
            .field("durable", &self.durable)
            .finish()
    }
}

impl TieredImageCache {
    /// Creates a cache over both layers.
    #[must_use]
    pub fn new(session: Arc<dyn ImageCachePort>, durable: Option<DurableThumbnailCache>) -> Self {
        Self { session, durable }
    }

    /// Creates a cache without persistence.
    #[must_use]
    pub fn session_only(session: Arc<dyn ImageCachePort>) -> Self {
        Self::new(session, None)
    }

    /// Returns true if a durable layer is attached.
    #[must_use]
    pub const fn has_durable(&self) -> bool {
        self.durable.is_some()
    }

    /// Returns the durable layer, if attached.
    #[must_use]
    pub const fn durable(&self) -> Option<&DurableThumbnailCache> {
        self.durable.as_ref()
    }

    /// Looks `url` up in the session layer, then the durable layer.
    ///
    /// Durable hits are adopted into the session layer.
    pub async fn lookup(&self, url: &str) -> Option<CacheHit> {
        if let Some(image) = self.session.get(url).await {
            trace!(url, "Session cache hit");
            return Some(CacheHit {
                image,
                tier: CacheTier::Session,
            });
        }

        let durable = self.durable.as_ref()?;
        match durable.get(url).await {
            Ok(Some(entry)) => {
                let image = Arc::new(LoadedImage::from_entry(entry));
                self.session.put(url.to_string(), image.clone()).await;
                debug!(url, "Adopted durable cache entry into session");
                Some(CacheHit {
                    image,
                    tier: CacheTier::Durable,
                })
            }
            Ok(None) => None,
            Err(e) => {
                warn!(url, error = %e, "Durable cache read failed, treating as miss");
                None
            }
        }
    }

    /// Writes a freshly generated image into both layers.
    pub async fn store(&self, url: &str, image: Arc<LoadedImage>) {
        let payload = image.to_payload();
        self.session.put(url.to_string(), image).await;

        if let Some(durable) = &self.durable
            && let Err(e) = durable.set(url, payload).await
        {
            warn!(url, error = %e, "Durable cache write failed, keeping session copy only");
        }
    }

    /// Number of images in the session layer.
    #[must_use]
    pub fn session_len(&self) -> usize {
        self.session.len()
    }

    /// Estimated durable size, or None if unavailable.
    pub async fn durable_size(&self) -> Option<u64> {
        let durable = self.durable.as_ref()?;
        durable
            .total_size()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to read durable cache size"))
            .ok()
    }

    /// Number of durable entries, or None if unavailable.
    pub async fn durable_len(&self) -> Option<usize> {
        let durable = self.durable.as_ref()?;
        durable
            .len()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to count durable cache entries"))
            .ok()
    }

    /// Drops both layers. Returns false if the durable layer could not be cleared.
    pub async fn clear_all(&self) -> bool {
        self.session.clear().await;
        let Some(durable) = &self.durable else {
            return true;
        };
        match durable.clear().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to clear durable cache");
                false
            }
        }
    }
}
