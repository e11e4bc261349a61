//! Per-item image loading error types.

use thiserror::Error;

/// Failure to materialize one source image.
///
/// Every variant is scoped to a single item; none of them abort a directory load.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum LoadError {
    #[error("failed to decode {url}: {message}")]
    Decode { url: String, message: String },

    #[error("failed to read {url}: {message}")]
    Source { url: String, message: String },

    #[error("unsupported source url: {url}")]
    UnsupportedUrl { url: String },

    #[error("failed to encode thumbnail: {message}")]
    Encode { message: String },

    #[error("image task failed: {message}")]
    TaskFailed { message: String },
}

impl LoadError {
    /// Creates decode error.
    #[must_use]
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates source read error.
    #[must_use]
    pub fn read_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates unsupported url error.
    #[must_use]
    pub fn unsupported_url(url: impl Into<String>) -> Self {
        Self::UnsupportedUrl { url: url.into() }
    }

    /// Creates encode error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates task failure error.
    #[must_use]
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Returns true if the source bytes were read but could not be decoded.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
