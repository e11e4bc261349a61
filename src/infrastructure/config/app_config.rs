//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::{
    DEFAULT_EVICTION_FRACTION, DEFAULT_MAX_AGE, DEFAULT_MAX_CACHE_BYTES, DurableCacheConfig,
};
use crate::infrastructure::image::{DATABASE_FILE_NAME, ThumbnailFormat};

use super::args::CliArgs;

const APP_NAME: &str = "memoreye";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Durable cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Thumbnail encoding configuration.
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    /// Directory loader configuration.
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Durable cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Keep thumbnails across runs.
    #[serde(default = "default_true")]
    pub persistent: bool,

    /// Database file. Defaults to the project data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Entry time-to-live in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Capacity in estimated bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Share of `max_bytes` freed per eviction pass.
    #[serde(default = "default_eviction_fraction")]
    pub eviction_fraction: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persistent: true,
            database_path: None,
            max_age_secs: default_max_age_secs(),
            max_bytes: default_max_bytes(),
            eviction_fraction: default_eviction_fraction(),
        }
    }
}

impl CacheConfig {
    /// Converts to the durable cache policy.
    #[must_use]
    pub fn to_durable_config(&self) -> DurableCacheConfig {
        DurableCacheConfig {
            max_age: Duration::from_secs(self.max_age_secs),
            max_bytes: self.max_bytes,
            eviction_fraction: self.eviction_fraction,
        }
    }
}

/// Thumbnail format setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSetting {
    /// Use the build's preferred format.
    #[default]
    Auto,
    /// Force JPEG.
    Jpeg,
    /// Force lossless WebP.
    Webp,
}

impl FormatSetting {
    /// Resolves to a concrete format.
    #[must_use]
    pub const fn resolve(self) -> ThumbnailFormat {
        match self {
            Self::Auto => ThumbnailFormat::detect(),
            Self::Jpeg => ThumbnailFormat::Jpeg,
            Self::Webp => ThumbnailFormat::WebP,
        }
    }
}

/// Thumbnail encoding configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Output format.
    #[serde(default)]
    pub format: FormatSetting,
}

/// Directory loader configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Delay between items in milliseconds. Zero only yields.
    #[serde(default)]
    pub pacing_ms: u64,
}

impl LoaderConfig {
    /// Pacing as a duration.
    #[must_use]
    pub const fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_age_secs() -> u64 {
    DEFAULT_MAX_AGE.as_secs()
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_CACHE_BYTES
}

fn default_eviction_fraction() -> f64 {
    DEFAULT_EVICTION_FRACTION
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(database) = &args.database {
            self.cache.database_path = Some(database.clone());
        }
        if args.no_persist {
            self.cache.persistent = false;
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
    }

    /// Returns default database path.
    #[must_use]
    pub fn default_database_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
    }

    /// Returns effective database path.
    #[must_use]
    pub fn effective_database_path(&self) -> Option<PathBuf> {
        self.cache
            .database_path
            .clone()
            .or_else(Self::default_database_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            cache: CacheConfig::default(),
            thumbnails: ThumbnailConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}
