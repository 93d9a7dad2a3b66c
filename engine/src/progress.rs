//! Sync event reporting.
//!
//! This module defines the `SyncLogger` trait, which decouples the engine from
//! where its log goes. The engine never writes to a global log handle; the
//! caller passes a logger in and owns its lifecycle.
//!
//! `TracingLogger` forwards every event to `tracing`, so whatever subscriber
//! the caller installed (a log file for the CLI) receives them.

use std::path::Path;

use crate::error::AccessError;
use crate::model::{SyncJob, SyncOutcome};

/// Trait for receiving events from a sync run.
///
/// All methods are called synchronously from the thread running the sync.
pub trait SyncLogger {
    /// Called once after confirmation, before any directory is compared.
    fn on_sync_started(&self, job: &SyncJob);

    /// Called when a directory pair is about to be reconciled.
    fn on_directory_started(&self, source_dir: &Path, dest_dir: &Path);

    /// Called after a destination-only entry was removed.
    fn on_deleted(&self, path: &Path);

    /// Called after a source-only file or directory was copied.
    fn on_copied(&self, src: &Path, dst: &Path);

    /// Called after a shared file was overwritten because it changed.
    fn on_updated(&self, src: &Path, dst: &Path);

    /// Called for a shared file that was left alone.
    fn on_unchanged(&self, _src: &Path) {}

    /// Called when an operation failed; the run continues.
    fn on_failure(&self, error: &AccessError);

    /// Called once when the worklist is exhausted.
    fn on_sync_completed(&self, job: &SyncJob, outcome: &SyncOutcome);
}

/// `SyncLogger` that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl SyncLogger for TracingLogger {
    fn on_sync_started(&self, job: &SyncJob) {
        tracing::info!(
            run_id = %job.id,
            mode = %job.options.mode,
            "Directory sync FROM: {} TO: {}. Begin.",
            job.source_root.display(),
            job.destination_root.display()
        );
    }

    fn on_directory_started(&self, source_dir: &Path, dest_dir: &Path) {
        tracing::debug!(
            "Comparing '{}' with '{}'",
            source_dir.display(),
            dest_dir.display()
        );
    }

    fn on_deleted(&self, path: &Path) {
        tracing::info!("'{}' Deleted.", path.display());
    }

    fn on_copied(&self, src: &Path, dst: &Path) {
        tracing::info!("Copied '{}' to '{}'.", src.display(), dst.display());
    }

    fn on_updated(&self, src: &Path, dst: &Path) {
        tracing::info!("Updated '{}' from '{}'.", dst.display(), src.display());
    }

    fn on_unchanged(&self, src: &Path) {
        tracing::debug!("'{}' unchanged.", src.display());
    }

    fn on_failure(&self, error: &AccessError) {
        tracing::warn!(
            operation = %error.op,
            os_error = ?error.raw_os_error(),
            permission_denied = error.is_permission_denied(),
            "{}",
            error
        );
    }

    fn on_sync_completed(&self, job: &SyncJob, outcome: &SyncOutcome) {
        let stats = &outcome.stats;
        tracing::info!(
            run_id = %job.id,
            directories = stats.directories_compared,
            copied = stats.files_copied,
            trees = stats.trees_copied,
            updated = stats.files_updated,
            deleted = stats.entries_deleted,
            failures = stats.failures,
            "End."
        );
    }
}
