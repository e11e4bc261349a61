//! Pure domain services.

/// Image file classification by extension.
pub mod extension_validator;
/// Thumbnail box fitting.
pub mod thumbnail_geometry;

pub use extension_validator::{SUPPORTED_EXTENSIONS, is_supported_image, select_image_entries};
pub use thumbnail_geometry::{clamp_long_side, fit_to_box};
