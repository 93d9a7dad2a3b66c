//! Core data model for sync runs.
//!
//! This module defines:
//! - SyncJob: a validated pair of roots plus the options for one run
//! - SyncMode, SyncOptions: behavior switches fixed for the whole run
//! - EntryStat: what the engine needs to know about one directory entry
//! - SyncStats, SyncOutcome, SyncResult: what a run reports back

use std::ops::AddAssign;
use std::path::PathBuf;
use uuid::Uuid;

/// How destination-only entries are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Destination-only entries are deleted at every level
    #[default]
    Mirror,
    /// Destination-only entries are left untouched
    Merge,
}

impl SyncMode {
    pub fn from_merge_flag(merge: bool) -> Self {
        if merge {
            SyncMode::Merge
        } else {
            SyncMode::Mirror
        }
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::Mirror => write!(f, "Mirror"),
            SyncMode::Merge => write!(f, "Merge"),
        }
    }
}

/// Options for a sync run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub mode: SyncMode,

    /// Run without asking the confirmer for the FROM/TO direction
    pub skip_confirmation: bool,
}

/// A validated sync request.
///
/// Both roots are canonical, existing directories with the same final
/// component. Built by [`crate::sync::prepare_sync`].
#[derive(Debug, Clone)]
pub struct SyncJob {
    /// Run identifier, written to the log at start and end
    pub id: Uuid,

    /// Canonical source root
    pub source_root: PathBuf,

    /// Canonical destination root
    pub destination_root: PathBuf,

    pub options: SyncOptions,

    /// True if both roots resolve to the same directory
    pub same_location: bool,
}

/// Metadata of a single directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    /// True if the entry (after following symlinks) is a directory
    pub is_dir: bool,

    /// True if the entry itself is a symbolic link
    pub is_symlink: bool,

    /// Size in bytes
    pub size: u64,

    /// Modification time in nanoseconds since the Unix epoch
    pub modified_nanos: i128,
}

impl EntryStat {
    /// True if the entry should be removed with a recursive directory delete.
    ///
    /// Symlinks to directories are removed as links, never followed.
    pub fn is_real_dir(&self) -> bool {
        self.is_dir && !self.is_symlink
    }
}

/// Counters of the work a run performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Source-only files copied to the destination
    pub files_copied: u64,

    /// Source-only directories copied as whole subtrees
    pub trees_copied: u64,

    /// Shared files overwritten because they changed
    pub files_updated: u64,

    /// Destination entries removed (files, links, or whole subtrees)
    pub entries_deleted: u64,

    /// Directory pairs reconciled
    pub directories_compared: u64,

    /// Operations that failed and were skipped
    pub failures: u64,
}

impl SyncStats {
    /// Number of filesystem mutations that succeeded.
    pub fn mutations(&self) -> u64 {
        self.files_copied + self.trees_copied + self.files_updated + self.entries_deleted
    }
}

impl AddAssign for SyncStats {
    fn add_assign(&mut self, rhs: Self) {
        self.files_copied += rhs.files_copied;
        self.trees_copied += rhs.trees_copied;
        self.files_updated += rhs.files_updated;
        self.entries_deleted += rhs.entries_deleted;
        self.directories_compared += rhs.directories_compared;
        self.failures += rhs.failures;
    }
}

/// Result of a traversal that ran to completion.
///
/// Partial work is never rolled back; `errors_occurred` only tells the caller
/// to look at the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub errors_occurred: bool,
    pub stats: SyncStats,
}

/// What happened when a sync job was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResult {
    /// Source and destination are the same directory; nothing was done
    AlreadyInSync,
    /// The confirmer rejected the direction; nothing was done
    Declined,
    /// The traversal finished (possibly with recorded errors)
    Completed(SyncOutcome),
}

impl SyncResult {
    /// True if the run completed and at least one operation failed.
    pub fn errors_occurred(&self) -> bool {
        matches!(self, SyncResult::Completed(outcome) if outcome.errors_occurred)
    }
}
