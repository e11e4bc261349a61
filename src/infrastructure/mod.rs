//! Infrastructure layer with filesystem, codec and storage adapters.

/// Application configuration.
pub mod config;
/// Image handling (session cache, durable store, thumbnail rendering).
pub mod image;
/// Tracing subscriber setup.
pub mod logging;
/// Directory enumeration.
pub mod scanner;

pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use image::{
    CacheStats, FileImageSource, FileUrlResolver, SessionImageCache, SqliteThumbnailStore,
    ThumbnailFormat, ThumbnailGenerator,
};
pub use scanner::DirectoryScanner;
