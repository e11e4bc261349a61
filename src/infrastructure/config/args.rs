use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "memoreye",
    version,
    about = "Progressive, cached thumbnail loading for image directories",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Durable cache database path.
    #[arg(long, value_name = "PATH", global = true)]
    pub database: Option<PathBuf>,

    /// Keep thumbnails for this run only.
    #[arg(long, global = true)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load every image under a directory.
    Load {
        /// Directory to scan.
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Descend at most this many levels. 1 lists only direct children.
        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,
    },
    /// Inspect or reset the durable cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CacheAction {
    /// Print entry count and estimated size.
    Stats,
    /// Remove every cached thumbnail.
    Clear,
}
