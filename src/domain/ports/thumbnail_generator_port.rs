//! Port definition for thumbnail generation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::LoadedImage;
use crate::domain::errors::LoadError;

/// Decodes a source image and renders every thumbnail tier.
#[async_trait]
pub trait ThumbnailGeneratorPort: Send + Sync {
    /// Produces a fully populated [`LoadedImage`] for `url`.
    ///
    /// Either all three tiers are returned or an error; never a partial set.
    async fn generate(&self, url: &str) -> Result<LoadedImage, LoadError>;

    /// Decodes the full-resolution image again, e.g. for an entry adopted
    /// from the durable layer.
    async fn decode_original(&self, url: &str) -> Result<Arc<image::DynamicImage>, LoadError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::entities::{
        EncodedThumbnail, ImageSize, OriginalImage, ThumbnailTier, Thumbnails,
    };
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::time::Duration;

    /// Generator that fabricates payloads, failing for configured URLs.
    #[derive(Default)]
    pub struct MockThumbnailGenerator {
        failing: HashSet<String>,
        delay: Option<(String, Duration)>,
        calls: Mutex<Vec<String>>,
    }

    impl MockThumbnailGenerator {
        /// Creates a generator that succeeds for every URL.
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes `generate` fail for `url`.
        #[must_use]
        pub fn failing_on(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }

        /// Sleeps before answering for URLs containing `marker`.
        #[must_use]
        pub fn delayed_on(mut self, marker: &str, delay: Duration) -> Self {
            self.delay = Some((marker.to_string(), delay));
            self
        }

        /// URLs passed to `generate`, in call order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        /// Payload the mock renders for `url`.
        pub fn thumbnails_for(url: &str) -> Thumbnails {
            let thumb = |tier: ThumbnailTier| {
                EncodedThumbnail::from_base64("image/jpeg", &format!("{tier}-{url}"))
            };
            Thumbnails {
                small: thumb(ThumbnailTier::Small),
                medium: thumb(ThumbnailTier::Medium),
                large: thumb(ThumbnailTier::Large),
            }
        }
    }

    #[async_trait]
    impl ThumbnailGeneratorPort for MockThumbnailGenerator {
        async fn generate(&self, url: &str) -> Result<LoadedImage, LoadError> {
            self.calls.lock().push(url.to_string());
            if let Some((marker, delay)) = &self.delay
                && url.contains(marker.as_str())
            {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.contains(url) {
                return Err(LoadError::decode(url, "mock decode failure"));
            }
            let original = Arc::new(image::DynamicImage::new_rgb8(4, 2));
            Ok(LoadedImage::new(
                OriginalImage::decoded(url, original),
                Self::thumbnails_for(url),
                ImageSize::new(4, 2),
            ))
        }

        async fn decode_original(
            &self,
            url: &str,
        ) -> Result<Arc<image::DynamicImage>, LoadError> {
            if self.failing.contains(url) {
                return Err(LoadError::decode(url, "mock decode failure"));
            }
            Ok(Arc::new(image::DynamicImage::new_rgb8(4, 2)))
        }
    }
}
