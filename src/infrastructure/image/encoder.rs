//! Thumbnail rendering and data URL encoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;

use crate::domain::entities::{EncodedThumbnail, ImageSize, ThumbnailTier, Thumbnails};
use crate::domain::errors::LoadError;
use crate::domain::services::{clamp_long_side, fit_to_box};

/// Longest side a tier may reach, as a multiple of its box side.
pub const MAX_BOX_STRETCH: u32 = 16;

/// Raster format used for encoded thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailFormat {
    /// Lossy JPEG honouring the tier quality.
    Jpeg,
    /// Lossless WebP; the tier quality is ignored.
    WebP,
}

impl ThumbnailFormat {
    /// Format chosen for this build.
    ///
    /// The `image` crate only ships a lossless WebP encoder, so lossy JPEG
    /// is the most compact format available for photographic thumbnails.
    /// The choice is fixed at compile time, not made per call.
    #[must_use]
    pub const fn detect() -> Self {
        Self::Jpeg
    }

    /// MIME type written into the data URL.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Largest width or height the encoder accepts.
    #[must_use]
    pub const fn max_dimension(self) -> u32 {
        match self {
            Self::Jpeg => 65_535,
            Self::WebP => 16_383,
        }
    }

    /// Encodes `image` into raw bytes.
    ///
    /// # Errors
    /// Returns error if the encoder rejects the image.
    pub fn encode(self, image: &DynamicImage, quality: f32) -> Result<Vec<u8>, LoadError> {
        let mut buf = Vec::new();
        match self {
            Self::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
                DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
            }
            Self::WebP => {
                let encoder = WebPEncoder::new_lossless(&mut buf);
                DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(encoder)
            }
        }
        .map_err(|e| LoadError::encode(e.to_string()))?;
        Ok(buf)
    }
}

impl std::fmt::Display for ThumbnailFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.01, 1.0) * 100.0).round() as u8
}

/// Output size of `tier` for a `source` of the given dimensions.
///
/// Follows [`fit_to_box`], then caps the long side at
/// [`MAX_BOX_STRETCH`] box sides and at the encoder limit.
#[must_use]
pub fn thumbnail_size(source: ImageSize, tier: ThumbnailTier, format: ThumbnailFormat) -> ImageSize {
    let target = tier.target_box();
    let limit = target
        .width
        .max(target.height)
        .saturating_mul(MAX_BOX_STRETCH)
        .min(format.max_dimension());
    clamp_long_side(fit_to_box(source, target), limit)
}

/// Renders one tier of `source`.
///
/// # Errors
/// Returns error if encoding fails.
pub fn render_thumbnail(
    source: &DynamicImage,
    tier: ThumbnailTier,
    format: ThumbnailFormat,
) -> Result<EncodedThumbnail, LoadError> {
    let size = thumbnail_size(
        ImageSize::new(source.width(), source.height()),
        tier,
        format,
    );
    let resized = source.resize_exact(size.width, size.height, FilterType::Lanczos3);
    let bytes = format.encode(&resized, tier.quality())?;
    Ok(EncodedThumbnail::from_base64(
        format.mime_type(),
        &STANDARD.encode(bytes),
    ))
}

/// Renders all three tiers, or nothing.
///
/// # Errors
/// Returns the first encoding failure.
pub fn render_tiers(source: &DynamicImage, format: ThumbnailFormat) -> Result<Thumbnails, LoadError> {
    Ok(Thumbnails {
        small: render_thumbnail(source, ThumbnailTier::Small, format)?,
        medium: render_thumbnail(source, ThumbnailTier::Medium, format)?,
        large: render_thumbnail(source, ThumbnailTier::Large, format)?,
    })
}

/// Decodes a data URL produced by [`render_thumbnail`].
///
/// # Errors
/// Returns error if the URL is malformed or the payload is not an image.
pub fn decode_data_url(thumbnail: &EncodedThumbnail) -> Result<DynamicImage, LoadError> {
    let url = thumbnail.as_str();
    let (_, payload) = url
        .split_once(";base64,")
        .ok_or_else(|| LoadError::decode("data url", "missing base64 marker"))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| LoadError::decode("data url", e.to_string()))?;
    image::load_from_memory(&bytes).map_err(|e| LoadError::decode("data url", e.to_string()))
}
