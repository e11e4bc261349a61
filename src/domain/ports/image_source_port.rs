//! Port definitions for locating and reading source images.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::LoadError;

/// Reads the encoded bytes behind a source URL.
#[async_trait]
pub trait ImageSourcePort: Send + Sync {
    /// Fetches the raw bytes of `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, LoadError>;
}

/// Maps a filesystem path to a loadable URL.
///
/// Resolution is synchronous and has no side effects.
pub trait PathResolverPort: Send + Sync {
    /// Returns the URL for `path`.
    fn resolve(&self, path: &Path) -> String;
}
