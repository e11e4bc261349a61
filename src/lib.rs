//! Memoreye - progressive, cached thumbnail loading for image directories.
//!
//! This crate materializes every image in a directory as a set of
//! multi-resolution thumbnails, backed by a session cache and a durable
//! SQLite cache bounded by age and size.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases, services and DTOs.
pub mod application;
/// Domain layer containing entities, errors, ports and pure services.
pub mod domain;
/// Infrastructure layer containing adapters for the filesystem, codecs and storage.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "memoreye";
