//! Domain layer with core entities, pure services and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Pure domain services.
pub mod services;

pub use entities::{CacheEntry, DirEntry, LoadSlot, LoadedImage, ThumbnailTier};
pub use errors::{LoadError, StoreError, StoreResult};
pub use ports::{
    ImageCachePort, ImageSourcePort, PathResolverPort, ThumbnailGeneratorPort, ThumbnailStorePort,
};
