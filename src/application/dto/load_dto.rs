//! Directory load DTOs.

use crate::domain::entities::LoadSlot;

/// Where a loaded image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Session cache.
    Session,
    /// Durable cache.
    Durable,
    /// Decoded and rendered during this run.
    Generated,
}

impl std::fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session => write!(f, "session"),
            Self::Durable => write!(f, "durable"),
            Self::Generated => write!(f, "generated"),
        }
    }
}

/// Running counters published while a load advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadProgress {
    /// Load this progress belongs to.
    pub generation: u64,
    /// Entries processed so far, failed ones included.
    pub completed: usize,
    /// Entries in the load.
    pub total: usize,
    /// Entries that failed.
    pub failed: usize,
}

impl LoadProgress {
    /// Returns true once every entry has been processed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

impl std::fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }
        Ok(())
    }
}

/// Point-in-time copy of the current load's index-aligned results.
#[derive(Debug, Clone, Default)]
pub struct LoadSnapshot {
    /// Load the snapshot belongs to.
    pub generation: u64,
    /// One slot per input entry, in input order.
    pub slots: Vec<LoadSlot>,
    /// Entries processed so far.
    pub completed: usize,
    /// URLs that failed, in processing order.
    pub errors: Vec<String>,
}

impl LoadSnapshot {
    /// Number of input entries.
    #[must_use]
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding an image.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_loaded()).count()
    }

    /// Number of failed slots.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    /// Counters for this snapshot.
    #[must_use]
    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            generation: self.generation,
            completed: self.completed,
            total: self.total(),
            failed: self.failed_count(),
        }
    }
}

/// Outcome of one directory load as seen by the caller that started it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Generation token of the load.
    pub generation: u64,
    /// Entries in the load.
    pub total: usize,
    /// Entries whose result was committed.
    pub completed: usize,
    /// Images served by the session cache.
    pub from_session: usize,
    /// Images served by the durable cache.
    pub from_durable: usize,
    /// Images decoded and rendered.
    pub generated: usize,
    /// URLs that failed.
    pub failed: Vec<String>,
    /// True if a newer load started before this one finished.
    pub superseded: bool,
}

impl LoadReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new(generation: u64, total: usize) -> Self {
        Self {
            generation,
            total,
            completed: 0,
            from_session: 0,
            from_durable: 0,
            generated: 0,
            failed: Vec::new(),
            superseded: false,
        }
    }

    /// Number of images loaded from any source.
    #[must_use]
    pub const fn loaded(&self) -> usize {
        self.from_session + self.from_durable + self.generated
    }

    /// Counts one loaded image.
    pub fn record(&mut self, origin: ImageOrigin) {
        match origin {
            ImageOrigin::Session => self.from_session += 1,
            ImageOrigin::Durable => self.from_durable += 1,
            ImageOrigin::Generated => self.generated += 1,
        }
    }
}
