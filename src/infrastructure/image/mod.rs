//! Image handling infrastructure.
//!
//! This module provides:
//! - The session (in-memory) thumbnail cache
//! - The SQLite-backed durable thumbnail store
//! - Thumbnail rendering and encoding
//! - SVG rasterization
//! - Filesystem source reading and URL resolution

pub mod encoder;
pub mod file_source;
pub mod session_cache;
pub mod sqlite_store;
pub mod svg;
pub mod thumbnail_generator;

pub use encoder::{ThumbnailFormat, render_thumbnail, render_tiers, thumbnail_size};
pub use file_source::{FileImageSource, FileUrlResolver};
pub use session_cache::{CacheStats, SessionImageCache};
pub use sqlite_store::{DATABASE_FILE_NAME, SqliteThumbnailStore};
pub use thumbnail_generator::ThumbnailGenerator;
