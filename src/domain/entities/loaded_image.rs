//! Domain types for materialized images and their cached projections.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Ratio between a base64 payload length and the binary size it encodes.
pub const BASE64_SIZE_FACTOR: f64 = 0.75;

/// Natural pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Creates a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `width / height`.
    ///
    /// A zero height yields `1.0` so layout code never divides by zero.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 1.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One of the three fixed thumbnail size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbnailTier {
    /// 150x150 box, quality 0.7.
    Small,
    /// 300x300 box, quality 0.8.
    Medium,
    /// 600x600 box, quality 0.9.
    Large,
}

impl ThumbnailTier {
    /// All tiers, smallest first.
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Target box for this tier.
    #[must_use]
    pub const fn target_box(self) -> ImageSize {
        match self {
            Self::Small => ImageSize::new(150, 150),
            Self::Medium => ImageSize::new(300, 300),
            Self::Large => ImageSize::new(600, 600),
        }
    }

    /// Encoder quality factor in `(0, 1]`.
    #[must_use]
    pub const fn quality(self) -> f32 {
        match self {
            Self::Small => 0.7,
            Self::Medium => 0.8,
            Self::Large => 0.9,
        }
    }

    /// Returns the tier name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::fmt::Display for ThumbnailTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A self-contained encoded image, stored as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedThumbnail(String);

impl EncodedThumbnail {
    /// Builds a data URL from a MIME type and an already base64-encoded payload.
    #[must_use]
    pub fn from_base64(mime: &str, payload: &str) -> Self {
        Self(format!("data:{mime};base64,{payload}"))
    }

    /// Wraps an existing data URL without validation.
    #[must_use]
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// Returns the full data URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the MIME type of the payload, if the data URL is well formed.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
    }

    /// Length of the encoded text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for EncodedThumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three rendered tiers of one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnails {
    /// 150px tier.
    pub small: EncodedThumbnail,
    /// 300px tier.
    pub medium: EncodedThumbnail,
    /// 600px tier.
    pub large: EncodedThumbnail,
}

impl Thumbnails {
    /// Returns the thumbnail for `tier`.
    #[must_use]
    pub const fn get(&self, tier: ThumbnailTier) -> &EncodedThumbnail {
        match tier {
            ThumbnailTier::Small => &self.small,
            ThumbnailTier::Medium => &self.medium,
            ThumbnailTier::Large => &self.large,
        }
    }

    /// Approximate binary size of all three payloads.
    ///
    /// This is an estimate derived from the encoded text length, not an
    /// exact accounting of the stored bytes.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn estimated_byte_size(&self) -> u64 {
        let total: f64 = ThumbnailTier::ALL
            .iter()
            .map(|tier| self.get(*tier).len() as f64 * BASE64_SIZE_FACTOR)
            .sum();
        total.round() as u64
    }
}

/// Handle to the full-resolution source image.
///
/// The decoded pixels are only present when the image was freshly decoded
/// in this process; entries adopted from the durable layer carry the URL
/// and can be re-materialized from it.
#[derive(Clone)]
pub struct OriginalImage {
    url: String,
    decoded: Option<Arc<image::DynamicImage>>,
}

impl OriginalImage {
    /// Creates a handle backed by decoded pixels.
    #[must_use]
    pub fn decoded(url: impl Into<String>, image: Arc<image::DynamicImage>) -> Self {
        Self {
            url: url.into(),
            decoded: Some(image),
        }
    }

    /// Creates a handle that only knows where the source lives.
    #[must_use]
    pub fn deferred(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            decoded: None,
        }
    }

    /// Source URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Decoded pixels, if materialized.
    #[must_use]
    pub fn image(&self) -> Option<&Arc<image::DynamicImage>> {
        self.decoded.as_ref()
    }

    /// Returns true if the pixels are in memory.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.decoded.is_some()
    }
}

impl std::fmt::Debug for OriginalImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginalImage")
            .field("url", &self.url)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

/// The durable-layer input: everything in a [`LoadedImage`] except the original.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailPayload {
    /// Rendered tiers.
    pub thumbnails: Thumbnails,
    /// `width / height` of the original.
    pub aspect_ratio: f64,
    /// Natural dimensions of the original.
    pub size: ImageSize,
}

/// In-memory materialized form of one source image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Full-resolution handle.
    pub original: OriginalImage,
    /// All three rendered tiers.
    pub thumbnails: Thumbnails,
    /// Natural dimensions of the original.
    pub size: ImageSize,
    /// Cached `width / height` for layout.
    pub aspect_ratio: f64,
}

impl LoadedImage {
    /// Creates a loaded image, deriving the aspect ratio from `size`.
    #[must_use]
    pub fn new(original: OriginalImage, thumbnails: Thumbnails, size: ImageSize) -> Self {
        Self {
            original,
            thumbnails,
            aspect_ratio: size.aspect_ratio(),
            size,
        }
    }

    /// Rebuilds a loaded image from a durable record.
    #[must_use]
    pub fn from_entry(entry: CacheEntry) -> Self {
        Self {
            original: OriginalImage::deferred(entry.url),
            thumbnails: entry.thumbnails,
            size: entry.size,
            aspect_ratio: entry.aspect_ratio,
        }
    }

    /// Source URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.original.url()
    }

    /// Projection persisted by the durable layer.
    #[must_use]
    pub fn to_payload(&self) -> ThumbnailPayload {
        ThumbnailPayload {
            thumbnails: self.thumbnails.clone(),
            aspect_ratio: self.aspect_ratio,
            size: self.size,
        }
    }
}

/// Durable record for one source URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Source URL, the primary key.
    pub url: String,
    /// Rendered tiers.
    pub thumbnails: Thumbnails,
    /// `width / height` of the original.
    pub aspect_ratio: f64,
    /// Natural dimensions of the original.
    pub size: ImageSize,
    /// Write time in epoch milliseconds.
    pub timestamp: i64,
    /// Approximate stored size used for capacity accounting.
    pub estimated_byte_size: u64,
}

impl CacheEntry {
    /// Builds a record from a payload, stamping it with `timestamp`.
    #[must_use]
    pub fn new(url: impl Into<String>, payload: ThumbnailPayload, timestamp: i64) -> Self {
        let estimated_byte_size = payload.thumbnails.estimated_byte_size();
        Self {
            url: url.into(),
            thumbnails: payload.thumbnails,
            aspect_ratio: payload.aspect_ratio,
            size: payload.size,
            timestamp,
            estimated_byte_size,
        }
    }

    /// Returns true if `now - timestamp` exceeds `max_age`.
    #[must_use]
    pub fn is_expired(&self, now_ms: i64, max_age: Duration) -> bool {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.timestamp) > max_age_ms
    }
}

/// One record from directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Filesystem path.
    pub path: PathBuf,
    /// True for directories.
    pub is_directory: bool,
}

impl DirEntry {
    /// Creates a file entry.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
        }
    }

    /// Creates a directory entry.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
        }
    }
}
