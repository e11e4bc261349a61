//! Port definitions for the domain layer.

mod image_cache_port;
mod image_source_port;
mod thumbnail_generator_port;
mod thumbnail_store_port;

pub use image_cache_port::ImageCachePort;
pub use image_source_port::{ImageSourcePort, PathResolverPort};
pub use thumbnail_generator_port::ThumbnailGeneratorPort;
pub use thumbnail_store_port::{EvictionCandidate, ThumbnailStorePort};

#[cfg(test)]
pub mod mocks {
    pub use super::thumbnail_generator_port::mock::MockThumbnailGenerator;
    pub use super::thumbnail_store_port::mock::MockThumbnailStore;
}
