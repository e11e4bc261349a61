//! Application layer with cache services, use cases and DTOs.

/// Data transfer objects.
pub mod dto;
/// Services composing domain ports.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{ImageOrigin, LoadProgress, LoadReport, LoadSnapshot};
pub use services::{DurableCacheConfig, DurableThumbnailCache, TieredImageCache};
pub use use_cases::LoadDirectoryUseCase;
