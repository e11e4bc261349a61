//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{
    AppConfig, CacheConfig, FormatSetting, LoaderConfig, LogLevel, ThumbnailConfig,
};
pub use args::{CacheAction, CliArgs, Command};
pub use storage::{ConfigError, StorageManager};
