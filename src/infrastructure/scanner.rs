//! Recursive directory enumeration.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::entities::DirEntry;

/// Walks a directory tree and lists its entries in a stable order.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryScanner {
    max_depth: Option<usize>,
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryScanner {
    /// Creates a scanner without a depth limit. Symlinks are not followed.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_depth: None }
    }

    /// Limit recursion depth. Depth 1 lists only direct children.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Lists every entry below `root`, excluding `root` itself.
    ///
    /// Entries are sorted by file name within each directory. Unreadable
    /// entries are skipped with a warning.
    #[must_use]
    pub fn scan(&self, root: &Path) -> Vec<DirEntry> {
        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let entries: Vec<DirEntry> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(if entry.file_type().is_dir() {
                    DirEntry::directory(entry.into_path())
                } else {
                    DirEntry::file(entry.into_path())
                }),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .collect();

        debug!(root = %root.display(), count = entries.len(), "Scanned directory");
        entries
    }
}
