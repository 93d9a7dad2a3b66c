//! Test helpers shared by the engine's unit tests.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;

use crate::error::{AccessError, Operation};
use crate::fs_ops::{FileSystem, LocalFs};
use crate::model::{EntryStat, SyncJob, SyncOutcome};
use crate::progress::SyncLogger;

/// Write `contents` to `path` and pin its mtime to `mtime_secs`.
pub fn write_file(path: &Path, contents: &[u8], mtime_secs: i64) {
    fs::write(path, contents).expect("Failed to write file");
    filetime::set_file_mtime(path, FileTime::from_unix_time(mtime_secs, 0))
        .expect("Failed to set mtime");
}

/// Create an empty file.
pub fn touch(path: &Path) {
    fs::File::create(path).expect("Failed to create file");
}

/// `LocalFs` that refuses to copy or delete entries with the given names.
pub struct FailingFs {
    blocked: Vec<OsString>,
    failed: RefCell<Vec<Operation>>,
}

impl FailingFs {
    pub fn new(blocked: &[&str]) -> Self {
        FailingFs {
            blocked: blocked.iter().map(OsString::from).collect(),
            failed: RefCell::new(Vec::new()),
        }
    }

    pub fn failed_ops(&self) -> Vec<Operation> {
        self.failed.borrow().clone()
    }

    fn check(&self, op: Operation, path: &Path) -> Result<(), AccessError> {
        let blocked = path
            .file_name()
            .map_or(false, |name| self.blocked.iter().any(|b| b == name));
        if blocked {
            self.failed.borrow_mut().push(op);
            return Err(AccessError::new(
                op,
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "simulated permission error"),
            ));
        }
        Ok(())
    }
}

impl FileSystem for FailingFs {
    fn list_names(&self, dir: &Path) -> Result<BTreeSet<OsString>, AccessError> {
        LocalFs.list_names(dir)
    }

    fn stat(&self, path: &Path) -> Result<EntryStat, AccessError> {
        LocalFs.stat(path)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), AccessError> {
        self.check(Operation::CopyFile, src)?;
        LocalFs.copy_file(src, dst)
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<(), AccessError> {
        self.check(Operation::CopyTree, src)?;
        LocalFs.copy_tree(src, dst)
    }

    fn delete_file(&self, path: &Path) -> Result<(), AccessError> {
        self.check(Operation::DeleteFile, path)?;
        LocalFs.delete_file(path)
    }

    fn delete_tree(&self, path: &Path) -> Result<(), AccessError> {
        self.check(Operation::DeleteTree, path)?;
        LocalFs.delete_tree(path)
    }
}

/// `SyncLogger` that keeps every event as a `kind:detail` string.
#[derive(Default)]
pub struct RecordingLogger {
    events: RefCell<Vec<String>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn events_with_prefix(&self, kind: &str) -> Vec<String> {
        let prefix = format!("{}:", kind);
        self.events
            .borrow()
            .iter()
            .filter(|e| e.starts_with(&prefix))
            .cloned()
            .collect()
    }

    fn push(&self, kind: &str, detail: String) {
        self.events.borrow_mut().push(format!("{}:{}", kind, detail));
    }
}

impl SyncLogger for RecordingLogger {
    fn on_sync_started(&self, job: &SyncJob) {
        self.push("started", job.source_root.display().to_string());
    }

    fn on_directory_started(&self, source_dir: &Path, _dest_dir: &Path) {
        self.push("directory", source_dir.display().to_string());
    }

    fn on_deleted(&self, path: &Path) {
        self.push("deleted", path.display().to_string());
    }

    fn on_copied(&self, src: &Path, _dst: &Path) {
        self.push("copied", src.display().to_string());
    }

    fn on_updated(&self, src: &Path, _dst: &Path) {
        self.push("updated", src.display().to_string());
    }

    fn on_unchanged(&self, src: &Path) {
        self.push("unchanged", src.display().to_string());
    }

    fn on_failure(&self, error: &AccessError) {
        self.push("failure", error.to_string());
    }

    fn on_sync_completed(&self, _job: &SyncJob, outcome: &SyncOutcome) {
        self.push("completed", outcome.errors_occurred.to_string());
    }
}
