//! Per-index state of a directory load.

use std::sync::Arc;

use super::LoadedImage;

/// Result slot for one input entry of a directory load.
#[derive(Debug, Clone, Default)]
pub enum LoadSlot {
    /// Not processed yet.
    #[default]
    Pending,
    /// Materialized successfully.
    Loaded(Arc<LoadedImage>),
    /// Decoding or fetching failed.
    Failed,
}

impl LoadSlot {
    /// Returns true while the slot has not been processed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the slot holds an image.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Returns true if processing failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns the loaded image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&Arc<LoadedImage>> {
        match self {
            Self::Loaded(image) => Some(image),
            _ => None,
        }
    }
}
