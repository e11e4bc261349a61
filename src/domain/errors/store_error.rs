//! Durable store error types.

use thiserror::Error;

/// Result type for durable store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable store error variants.
///
/// Callers treat every variant the same way: the durable layer is skipped
/// and the session layer keeps working.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("thumbnail store unavailable: {message}")]
    Unavailable { message: String },

    #[error("thumbnail store quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("thumbnail store corrupted: {message}")]
    Corrupt { message: String },
}

impl StoreError {
    /// Creates unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates quota exceeded error.
    #[must_use]
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
        }
    }

    /// Creates corruption error.
    #[must_use]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}
