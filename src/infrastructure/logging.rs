//! Tracing subscriber setup.

use std::path::Path;

use tracing::{Subscriber, info};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::config::LogLevel;

/// Subscriber used before the configuration is loaded.
///
/// Only events at or above `level` are written, without ANSI colors.
pub fn bootstrap_subscriber<W>(level: LogLevel, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    fmt()
        .with_writer(writer)
        .with_max_level(level.to_tracing_level())
        .with_ansi(false)
        .with_target(false)
        .finish()
}

/// Runs `f` with a temporary stderr subscriber at `level`.
pub fn with_bootstrap_logging<T>(level: LogLevel, f: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(bootstrap_subscriber(level, std::io::stderr), f)
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides `level`. Events go to `log_path` when set, otherwise
/// to stderr.
///
/// # Errors
/// Returns error if the log file cannot be opened.
pub fn init_logging(level: LogLevel, log_path: Option<&Path>) -> std::io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if let Some(log_path) = log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}
