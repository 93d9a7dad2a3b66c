//! Sync orchestration.
//!
//! This module provides the sync lifecycle functions:
//! - Preparing a job (validating and resolving both roots)
//! - Running a job (confirmation, then the worklist traversal)
//!
//! Validation failures are fatal and happen before anything is touched.
//! Failures during the run are recorded in the outcome instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::confirm::Confirmer;
use crate::differ::LevelDiffer;
use crate::error::{ConfigError, Side};
use crate::fs_ops::{FileSystem, LocalFs};
use crate::model::{SyncJob, SyncOptions, SyncResult};
use crate::progress::SyncLogger;
use crate::traversal::Traversal;

/// Map a failure while resolving a root to the fatal error the user sees.
fn root_error(side: Side, path: &Path, e: io::Error) -> ConfigError {
    match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            side,
            path: path.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => ConfigError::AccessDenied {
            side,
            path: path.to_path_buf(),
            source: e,
        },
        _ => ConfigError::Inaccessible {
            side,
            path: path.to_path_buf(),
            source: e,
        },
    }
}

/// Resolve one root to a canonical, existing directory.
fn resolve_root(path: &Path, side: Side) -> Result<PathBuf, ConfigError> {
    let to_config_error = |e| root_error(side, path, e);

    let resolved = fs::canonicalize(path).map_err(to_config_error)?;
    let metadata = fs::metadata(&resolved).map_err(to_config_error)?;
    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory {
            side,
            path: resolved,
        });
    }
    Ok(resolved)
}

/// Create a new sync job.
///
/// Both paths must resolve to existing directories with the same final name.
/// If they resolve to the same directory the job is still created, flagged
/// `same_location`, and running it does nothing.
///
/// # Errors
/// Returns ConfigError if either root is missing, not a directory, not
/// accessible, the names differ, or one root lies inside the other.
pub fn prepare_sync<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    options: SyncOptions,
) -> Result<SyncJob, ConfigError> {
    let source_root = resolve_root(source.as_ref(), Side::Source)?;
    let destination_root = resolve_root(destination.as_ref(), Side::Destination)?;

    let source_name = source_root.file_name();
    let destination_name = destination_root.file_name();
    if source_name != destination_name {
        let lossy = |name: Option<&std::ffi::OsStr>| {
            name.map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        return Err(ConfigError::NameMismatch {
            source_name: lossy(source_name),
            destination_name: lossy(destination_name),
        });
    }

    let same_location = source_root == destination_root;
    if !same_location {
        if destination_root.starts_with(&source_root) {
            return Err(ConfigError::NestedRoots {
                inner: destination_root,
                outer: source_root,
            });
        }
        if source_root.starts_with(&destination_root) {
            return Err(ConfigError::NestedRoots {
                inner: source_root,
                outer: destination_root,
            });
        }
    }

    Ok(SyncJob {
        id: Uuid::new_v4(),
        source_root,
        destination_root,
        options,
        same_location,
    })
}

/// Run a prepared job to completion.
///
/// Asks `confirmer` for the direction unless `skip_confirmation` is set.
/// Nothing is mutated before confirmation, and nothing at all for a
/// `same_location` job.
pub fn run_sync<F: FileSystem + ?Sized>(
    job: &SyncJob,
    fs: &F,
    logger: &dyn SyncLogger,
    confirmer: &dyn Confirmer,
) -> SyncResult {
    if job.same_location {
        return SyncResult::AlreadyInSync;
    }

    if !job.options.skip_confirmation
        && !confirmer.confirm(&job.source_root, &job.destination_root)
    {
        return SyncResult::Declined;
    }

    logger.on_sync_started(job);

    let differ = LevelDiffer::new(fs, logger, job.options.mode);
    let outcome = Traversal::new(differ, &job.source_root, &job.destination_root).run();

    logger.on_sync_completed(job, &outcome);
    SyncResult::Completed(outcome)
}

/// Prepare and run a sync against the local filesystem.
pub fn synchronize<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    options: SyncOptions,
    logger: &dyn SyncLogger,
    confirmer: &dyn Confirmer,
) -> Result<SyncResult, ConfigError> {
    let job = prepare_sync(source, destination, options)?;
    Ok(run_sync(&job, &LocalFs, logger, confirmer))
}
