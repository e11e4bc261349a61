//! Port definition for the session image cache.

use std::sync::Arc;

use crate::domain::entities::LoadedImage;

/// Port for the in-process image cache keyed by source URL.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Attempts to get an image from the cache.
    /// Returns None if not cached.
    async fn get(&self, url: &str) -> Option<Arc<LoadedImage>>;

    /// Stores an image in the cache, replacing any previous value.
    async fn put(&self, url: String, image: Arc<LoadedImage>);

    /// Removes an image from the cache.
    async fn evict(&self, url: &str);

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all images from the cache.
    async fn clear(&self);
}
