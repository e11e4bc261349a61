//! Domain entities.

mod loaded_image;
mod load_slot;

#[cfg(test)]
pub(crate) use loaded_image::fixtures;
pub use loaded_image::{
    BASE64_SIZE_FACTOR, CacheEntry, DirEntry, EncodedThumbnail, ImageSize, LoadedImage,
    OriginalImage, ThumbnailPayload, ThumbnailTier, Thumbnails,
};
pub use load_slot::LoadSlot;
