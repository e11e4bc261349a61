//! Filesystem-backed source reading and path-to-URL resolution.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::trace;
use url::Url;

use crate::domain::errors::LoadError;
use crate::domain::ports::{ImageSourcePort, PathResolverPort};

/// Reads source images behind `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageSource;

impl FileImageSource {
    /// Creates a new source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageSourcePort for FileImageSource {
    async fn fetch(&self, url: &str) -> Result<Bytes, LoadError> {
        let parsed = Url::parse(url).map_err(|_| LoadError::unsupported_url(url))?;
        if parsed.scheme() != "file" {
            return Err(LoadError::unsupported_url(url));
        }
        let path = parsed
            .to_file_path()
            .map_err(|()| LoadError::unsupported_url(url))?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| LoadError::read_failed(url, e.to_string()))?;

        trace!(url, size = bytes.len(), "Read source image");
        Ok(Bytes::from(bytes))
    }
}

/// Resolves filesystem paths to absolute `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileUrlResolver;

impl FileUrlResolver {
    /// Creates a new resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PathResolverPort for FileUrlResolver {
    fn resolve(&self, path: &Path) -> String {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Url::from_file_path(&absolute).map_or_else(
            |()| format!("file://{}", absolute.display()),
            String::from,
        )
    }
}
