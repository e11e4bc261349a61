//! Use case implementations.

mod load_directory_use_case;

pub use load_directory_use_case::LoadDirectoryUseCase;
