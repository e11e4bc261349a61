//! Extension-based classification of image files.

use std::path::Path;

use crate::domain::entities::DirEntry;

/// Extensions recognised as images, lowercase.
///
/// `heic` is listed but has no decoder, so such files load as failures.
pub const SUPPORTED_EXTENSIONS: [&str; 10] = [
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "svg", "ico", "heic",
];

/// Returns true if the text after the final `.` is a supported image extension.
///
/// Comparison is case-insensitive. A name without a `.` has no extension.
#[must_use]
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    let name = path.as_ref().to_string_lossy();
    let Some((_, extension)) = name.rsplit_once('.') else {
        return false;
    };
    let extension = extension.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&extension.as_str())
}

/// Keeps the image files of an enumeration, preserving order.
#[must_use]
pub fn select_image_entries(entries: impl IntoIterator<Item = DirEntry>) -> Vec<DirEntry> {
    entries
        .into_iter()
        .filter(|entry| !entry.is_directory && is_supported_image(&entry.path))
        .collect()
}
