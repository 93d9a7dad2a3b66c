//! Single-level directory reconciliation.
//!
//! `LevelDiffer` reconciles exactly one (source, destination) directory pair.
//! It does not descend: shared subdirectories are handed back to the caller,
//! which queues them on the worklist.
//!
//! Per level:
//! 1. Snapshot both name sets.
//! 2. Mirror mode only: delete destination-only entries.
//! 3. Copy source-only entries (whole trees for directories).
//! 4. Compare shared files by size and mtime; report shared directories.
//!
//! Every failed operation is reported to the logger and counted, then the next
//! entry is processed.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{AccessError, Operation};
use crate::fs_ops::FileSystem;
use crate::model::{EntryStat, SyncMode, SyncStats};
use crate::progress::SyncLogger;

/// What one level of reconciliation produced.
#[derive(Debug, Default)]
pub struct LevelReport {
    /// Shared source subdirectories that still need their own pass
    pub subdirectories: Vec<PathBuf>,

    /// True if any operation at this level failed
    pub errors_occurred: bool,

    pub stats: SyncStats,
}

impl LevelReport {
    fn record_failure(&mut self, logger: &dyn SyncLogger, error: AccessError) {
        logger.on_failure(&error);
        self.errors_occurred = true;
        self.stats.failures += 1;
    }
}

/// Returns true if a shared file has to be copied over its destination.
///
/// Copies when the sizes differ or the source is strictly newer. An equal or
/// newer destination mtime with equal size is left alone, even if the
/// destination was touched after the last sync.
pub fn needs_update(source: &EntryStat, dest: &EntryStat) -> bool {
    source.size != dest.size || source.modified_nanos > dest.modified_nanos
}

/// Reconciles one directory pair.
pub struct LevelDiffer<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    logger: &'a dyn SyncLogger,
    mode: SyncMode,
}

impl<'a, F: FileSystem + ?Sized> LevelDiffer<'a, F> {
    pub fn new(fs: &'a F, logger: &'a dyn SyncLogger, mode: SyncMode) -> Self {
        LevelDiffer { fs, logger, mode }
    }

    /// Log and count a failure that happened outside any level.
    pub(crate) fn report_failure(&self, error: AccessError) -> LevelReport {
        let mut report = LevelReport::default();
        report.record_failure(self.logger, error);
        report
    }

    /// Reconcile `dest_dir` against `source_dir`.
    ///
    /// Both must be existing directories. If either cannot be listed the
    /// level is recorded as failed and nothing is changed.
    pub fn reconcile(&self, source_dir: &Path, dest_dir: &Path) -> LevelReport {
        let mut report = LevelReport::default();
        report.stats.directories_compared = 1;
        self.logger.on_directory_started(source_dir, dest_dir);

        let (src_names, dest_names) = match (
            self.fs.list_names(source_dir),
            self.fs.list_names(dest_dir),
        ) {
            (Ok(src), Ok(dest)) => (src, dest),
            (src, dest) => {
                for error in [src.err(), dest.err()].into_iter().flatten() {
                    report.record_failure(self.logger, error);
                }
                return report;
            }
        };

        if self.mode == SyncMode::Mirror {
            for name in dest_names.difference(&src_names) {
                self.delete_entry(&dest_dir.join(name), &mut report);
            }
        }

        for name in src_names.difference(&dest_names) {
            self.copy_new_entry(&source_dir.join(name), &dest_dir.join(name), &mut report);
        }

        for name in src_names.intersection(&dest_names) {
            self.reconcile_shared(source_dir, dest_dir, name, &mut report);
        }

        report
    }

    fn delete_entry(&self, path: &Path, report: &mut LevelReport) {
        let result = match self.fs.stat(path) {
            Ok(stat) if stat.is_real_dir() => self.fs.delete_tree(path),
            Ok(_) => self.fs.delete_file(path),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.logger.on_deleted(path);
                report.stats.entries_deleted += 1;
            }
            Err(e) => report.record_failure(self.logger, e),
        }
    }

    fn copy_new_entry(&self, src: &Path, dst: &Path, report: &mut LevelReport) {
        let stat = match self.fs.stat(src) {
            Ok(stat) => stat,
            Err(e) => return report.record_failure(self.logger, e),
        };

        let result = if stat.is_dir {
            self.fs.copy_tree(src, dst)
        } else {
            self.fs.copy_file(src, dst)
        };

        match result {
            Ok(()) => {
                self.logger.on_copied(src, dst);
                if stat.is_dir {
                    report.stats.trees_copied += 1;
                } else {
                    report.stats.files_copied += 1;
                }
            }
            Err(e) => report.record_failure(self.logger, e),
        }
    }

    fn reconcile_shared(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        name: &OsString,
        report: &mut LevelReport,
    ) {
        let src = source_dir.join(name);
        let dst = dest_dir.join(name);

        let (src_stat, dst_stat) = match (self.fs.stat(&src), self.fs.stat(&dst)) {
            (Ok(s), Ok(d)) => (s, d),
            (s, d) => {
                for error in [s.err(), d.err()].into_iter().flatten() {
                    report.record_failure(self.logger, error);
                }
                return;
            }
        };

        match (src_stat.is_dir, dst_stat.is_dir) {
            (true, true) => report.subdirectories.push(src),
            (false, false) => {
                if !needs_update(&src_stat, &dst_stat) {
                    self.logger.on_unchanged(&src);
                    return;
                }
                match self.fs.copy_file(&src, &dst) {
                    Ok(()) => {
                        self.logger.on_updated(&src, &dst);
                        report.stats.files_updated += 1;
                    }
                    Err(e) => report.record_failure(self.logger, e),
                }
            }
            // Merge mode never removes a destination directory.
            (false, true) if self.mode == SyncMode::Merge && dst_stat.is_real_dir() => {
                let conflict = io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("destination '{}' is a directory; kept in merge mode", dst.display()),
                );
                let error = AccessError::new(Operation::CopyFile, &src, conflict);
                report.record_failure(self.logger, error);
            }
            // Same name, different kind: the destination entry is replaced.
            (_, _) => {
                let before = report.stats.entries_deleted;
                self.delete_entry(&dst, report);
                if report.stats.entries_deleted > before {
                    self.copy_new_entry(&src, &dst, report);
                }
            }
        }
    }
}
