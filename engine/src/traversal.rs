//! Worklist-driven traversal of the source tree.
//!
//! The worklist holds source directories that still have to be reconciled.
//! Each step pops the front entry, derives its destination counterpart from
//! the path relative to the source root, reconciles the pair with a
//! `LevelDiffer`, and pushes the shared subdirectories it found to the front.
//!
//! Front insertion gives a depth-first-like order. Only eventual visitation
//! matters: every pair is reconciled independently of the others. The
//! traversal never recurses, so tree depth does not grow the call stack.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

use crate::differ::LevelDiffer;
use crate::error::{AccessError, Operation};
use crate::fs_ops::FileSystem;
use crate::model::{SyncOutcome, SyncStats};

/// Pending source directories, in processing order.
#[derive(Debug, Clone, Default)]
pub struct Worklist {
    pending: VecDeque<PathBuf>,
}

impl Worklist {
    /// A worklist holding only the source root.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        let mut pending = VecDeque::new();
        pending.push_back(source_root.into());
        Worklist { pending }
    }

    /// Remove and return the next directory to process.
    pub fn pop_next(&mut self) -> Option<PathBuf> {
        self.pending.pop_front()
    }

    /// Insert newly discovered directories at the front.
    ///
    /// Each is pushed in turn, so the last one given is processed first.
    pub fn push_discovered(&mut self, dirs: impl IntoIterator<Item = PathBuf>) {
        for dir in dirs {
            self.pending.push_front(dir);
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Whether the traversal has work left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    Running,
    Done,
}

/// Drives a `LevelDiffer` over the whole source tree.
pub struct Traversal<'a, F: FileSystem + ?Sized> {
    differ: LevelDiffer<'a, F>,
    source_root: PathBuf,
    dest_root: PathBuf,
    worklist: Worklist,
    errors_occurred: bool,
    stats: SyncStats,
}

impl<'a, F: FileSystem + ?Sized> Traversal<'a, F> {
    pub fn new(differ: LevelDiffer<'a, F>, source_root: &Path, dest_root: &Path) -> Self {
        Traversal {
            differ,
            source_root: source_root.to_path_buf(),
            dest_root: dest_root.to_path_buf(),
            worklist: Worklist::new(source_root),
            errors_occurred: false,
            stats: SyncStats::default(),
        }
    }

    pub fn state(&self) -> TraversalState {
        if self.worklist.is_empty() {
            TraversalState::Done
        } else {
            TraversalState::Running
        }
    }

    pub fn worklist(&self) -> &Worklist {
        &self.worklist
    }

    /// Destination directory at the same relative path as `source_dir`.
    pub fn dest_dir_for(&self, source_dir: &Path) -> Option<PathBuf> {
        source_dir
            .strip_prefix(&self.source_root)
            .ok()
            .map(|relative| self.dest_root.join(relative))
    }

    /// Reconcile the next directory pair.
    pub fn step(&mut self) -> TraversalState {
        let Some(source_dir) = self.worklist.pop_next() else {
            return TraversalState::Done;
        };

        let report = match self.dest_dir_for(&source_dir) {
            Some(dest_dir) => self.differ.reconcile(&source_dir, &dest_dir),
            None => {
                let outside = io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not below source root '{}'", self.source_root.display()),
                );
                self.differ
                    .report_failure(AccessError::new(Operation::List, &source_dir, outside))
            }
        };
        self.errors_occurred |= report.errors_occurred;
        self.stats += report.stats;
        self.worklist.push_discovered(report.subdirectories);

        self.state()
    }

    /// Run until the worklist is empty.
    pub fn run(mut self) -> SyncOutcome {
        while self.step() == TraversalState::Running {}
        SyncOutcome {
            errors_occurred: self.errors_occurred,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::LocalFs;
    use crate::model::SyncMode;
    use crate::testing::{write_file, FailingFs, RecordingLogger};
    use std::fs;

    #[test]
    fn test_worklist_front_insertion() {
        let mut worklist = Worklist::new("/root");
        assert_eq!(worklist.pop_next(), Some(PathBuf::from("/root")));
        worklist.push_discovered(vec![PathBuf::from("/root/a"), PathBuf::from("/root/b")]);
        worklist.push_discovered(vec![PathBuf::from("/root/b/x")]);

        assert_eq!(worklist.len(), 3);
        assert_eq!(worklist.pop_next(), Some(PathBuf::from("/root/b/x")));
        assert_eq!(worklist.pop_next(), Some(PathBuf::from("/root/b")));
        assert_eq!(worklist.pop_next(), Some(PathBuf::from("/root/a")));
        assert!(worklist.is_empty());
        assert_eq!(worklist.pop_next(), None);
    }

    #[test]
    fn test_dest_dir_keeps_relative_path() {
        let logger = RecordingLogger::default();
        let differ = LevelDiffer::new(&LocalFs, &logger, SyncMode::Mirror);
        let traversal = Traversal::new(differ, Path::new("/a/docs"), Path::new("/b/docs"));

        assert_eq!(
            traversal.dest_dir_for(Path::new("/a/docs/x/y")),
            Some(PathBuf::from("/b/docs/x/y"))
        );
        assert_eq!(
            traversal.dest_dir_for(Path::new("/a/docs")),
            Some(PathBuf::from("/b/docs"))
        );
        assert_eq!(traversal.dest_dir_for(Path::new("/elsewhere")), None);
    }

    #[test]
    fn test_directory_outside_source_root_is_recorded_as_failure() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("s").join("root");
        let dst = temp_dir.path().join("d").join("root");
        fs::create_dir_all(&src).expect("create src");
        fs::create_dir_all(&dst).expect("create dst");
        let stray = temp_dir.path().join("elsewhere");
        fs::create_dir_all(&stray).expect("create stray dir");
        write_file(&stray.join("keep.txt"), b"keep", 100);

        let logger = RecordingLogger::default();
        let differ = LevelDiffer::new(&LocalFs, &logger, SyncMode::Mirror);
        let mut traversal = Traversal::new(differ, &src, &dst);
        traversal.worklist.push_discovered(vec![stray.clone()]);
        let outcome = traversal.run();

        assert!(outcome.errors_occurred);
        assert_eq!(outcome.stats.failures, 1);
        assert_eq!(outcome.stats.directories_compared, 1);
        let failures = logger.events_with_prefix("failure");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("not below source root"), "got: {:?}", failures);
        assert!(stray.join("keep.txt").exists());
    }

    #[test]
    fn test_steps_until_done_and_visits_every_shared_directory() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("s").join("root");
        let dst = temp_dir.path().join("d").join("root");
        for rel in ["a/b/c", "a/d", "e"] {
            fs::create_dir_all(src.join(rel)).expect("create src dirs");
            fs::create_dir_all(dst.join(rel)).expect("create dst dirs");
        }
        write_file(&src.join("a/b/c/deep.txt"), b"deep", 100);

        let logger = RecordingLogger::default();
        let differ = LevelDiffer::new(&LocalFs, &logger, SyncMode::Mirror);
        let mut traversal = Traversal::new(differ, &src, &dst);

        assert_eq!(traversal.state(), TraversalState::Running);
        let mut steps = 0;
        while traversal.step() == TraversalState::Running {
            steps += 1;
        }
        // root, a, a/b, a/b/c, a/d, e
        assert_eq!(steps + 1, 6);
        assert!(traversal.worklist().is_empty());
        assert_eq!(traversal.step(), TraversalState::Done);

        assert_eq!(logger.events_with_prefix("directory").len(), 6);
        assert_eq!(fs::read(dst.join("a/b/c/deep.txt")).expect("read deep"), b"deep");
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("s").join("root");
        let dst = temp_dir.path().join("d").join("root");
        let mut rel = PathBuf::new();
        for _ in 0..200 {
            rel.push("n");
        }
        fs::create_dir_all(src.join(&rel)).expect("create deep src");
        fs::create_dir_all(dst.join(&rel)).expect("create deep dst");
        write_file(&src.join(&rel).join("leaf.txt"), b"leaf", 100);

        let logger = RecordingLogger::default();
        let differ = LevelDiffer::new(&LocalFs, &logger, SyncMode::Mirror);
        let outcome = Traversal::new(differ, &src, &dst).run();

        assert!(!outcome.errors_occurred);
        assert_eq!(outcome.stats.directories_compared, 201);
        assert!(dst.join(&rel).join("leaf.txt").exists());
    }

    #[test]
    fn test_error_flag_is_sticky_across_levels() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("s").join("root");
        let dst = temp_dir.path().join("d").join("root");
        fs::create_dir_all(src.join("first")).expect("create");
        fs::create_dir_all(dst.join("first")).expect("create");
        fs::create_dir_all(src.join("second")).expect("create");
        fs::create_dir_all(dst.join("second")).expect("create");
        write_file(&src.join("first").join("blocked.txt"), b"x", 100);
        write_file(&src.join("second").join("fine.txt"), b"y", 100);

        let fs_with_failure = FailingFs::new(&["blocked.txt"]);
        let logger = RecordingLogger::default();
        let differ = LevelDiffer::new(&fs_with_failure, &logger, SyncMode::Mirror);
        let outcome = Traversal::new(differ, &src, &dst).run();

        assert!(outcome.errors_occurred);
        assert_eq!(outcome.stats.failures, 1);
        assert!(dst.join("second").join("fine.txt").exists());
    }
}
