//! Source decoding and multi-tier thumbnail generation.

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;
use tracing::debug;

use crate::domain::entities::{ImageSize, LoadedImage, OriginalImage};
use crate::domain::errors::LoadError;
use crate::domain::ports::{ImageSourcePort, ThumbnailGeneratorPort};

use super::encoder::{ThumbnailFormat, render_tiers};
use super::svg;

/// Decodes source images and renders the small, medium and large tiers.
///
/// Raster formats go through the `image` crate, SVG documents are
/// rasterized first. Decoding and resizing run on the blocking pool.
pub struct ThumbnailGenerator {
    source: Arc<dyn ImageSourcePort>,
    format: ThumbnailFormat,
}

impl std::fmt::Debug for ThumbnailGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailGenerator")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl ThumbnailGenerator {
    /// Creates a generator encoding with `format`.
    #[must_use]
    pub fn new(source: Arc<dyn ImageSourcePort>, format: ThumbnailFormat) -> Self {
        Self { source, format }
    }

    /// Creates a generator using the build's preferred format.
    #[must_use]
    pub fn with_detected_format(source: Arc<dyn ImageSourcePort>) -> Self {
        Self::new(source, ThumbnailFormat::detect())
    }

    /// Output format.
    #[must_use]
    pub const fn format(&self) -> ThumbnailFormat {
        self.format
    }

    async fn decode(&self, url: &str) -> Result<(DynamicImage, ImageSize), LoadError> {
        let bytes = self.source.fetch(url).await?;
        let owned_url = url.to_string();

        tokio::task::spawn_blocking(move || decode_bytes(&owned_url, &bytes))
            .await
            .map_err(|e| LoadError::task_failed(format!("decode task panicked: {e}")))?
    }
}

/// Decodes `bytes` into pixels and the image's natural size.
fn decode_bytes(url: &str, bytes: &[u8]) -> Result<(DynamicImage, ImageSize), LoadError> {
    if svg::looks_like_svg(url, bytes) {
        return svg::rasterize(url, bytes);
    }
    let image = image::load_from_memory(bytes).map_err(|e| LoadError::decode(url, e.to_string()))?;
    let size = ImageSize::new(image.width(), image.height());
    Ok((image, size))
}

#[async_trait]
impl ThumbnailGeneratorPort for ThumbnailGenerator {
    async fn generate(&self, url: &str) -> Result<LoadedImage, LoadError> {
        let (decoded, size) = self.decode(url).await?;
        let decoded = Arc::new(decoded);

        let format = self.format;
        let source = decoded.clone();
        let thumbnails = tokio::task::spawn_blocking(move || render_tiers(&source, format))
            .await
            .map_err(|e| LoadError::task_failed(format!("resize task panicked: {e}")))??;

        debug!(url, %size, %format, "Generated thumbnails");
        Ok(LoadedImage::new(
            OriginalImage::decoded(url, decoded),
            thumbnails,
            size,
        ))
    }

    async fn decode_original(&self, url: &str) -> Result<Arc<DynamicImage>, LoadError> {
        self.decode(url).await.map(|(image, _)| Arc::new(image))
    }
}
