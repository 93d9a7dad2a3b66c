//! Filesystem operations module.
//!
//! This module provides the `FileSystem` trait, the only way the engine touches
//! the disk, and `LocalFs`, its implementation over `std::fs`:
//! - Listing the names directly inside a directory
//! - Reading type, size and modification time of one entry
//! - Copying files and whole directory trees with modification times preserved
//! - Deleting files and whole directory trees
//!
//! No decisions are made here; every failure is returned as an `AccessError`
//! and the caller decides what to do with it.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::error::{AccessError, Operation};
use crate::model::EntryStat;

/// Filesystem access used by the level differencer.
pub trait FileSystem {
    /// Names of the direct children of `dir`.
    fn list_names(&self, dir: &Path) -> Result<BTreeSet<OsString>, AccessError>;

    /// Metadata of `path`, following symlinks for type, size and mtime.
    fn stat(&self, path: &Path) -> Result<EntryStat, AccessError>;

    /// Copy one file, overwriting `dst` if it exists.
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), AccessError>;

    /// Copy the directory `src` to `dst`, which must not exist yet.
    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<(), AccessError>;

    /// Remove a file or a symbolic link.
    fn delete_file(&self, path: &Path) -> Result<(), AccessError>;

    /// Remove a directory and everything below it.
    fn delete_tree(&self, path: &Path) -> Result<(), AccessError>;
}

/// `FileSystem` backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn list_names(&self, dir: &Path) -> Result<BTreeSet<OsString>, AccessError> {
        let entries =
            fs::read_dir(dir).map_err(|e| AccessError::new(Operation::List, dir, e))?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| AccessError::new(Operation::List, dir, e))?;
            names.insert(entry.file_name());
        }
        Ok(names)
    }

    fn stat(&self, path: &Path) -> Result<EntryStat, AccessError> {
        let link_metadata =
            fs::symlink_metadata(path).map_err(|e| AccessError::new(Operation::Stat, path, e))?;

        if !link_metadata.file_type().is_symlink() {
            return Ok(entry_stat(&link_metadata, false));
        }

        match fs::metadata(path) {
            Ok(target_metadata) => Ok(entry_stat(&target_metadata, true)),
            // Dangling link: report the link itself so it can still be removed
            Err(_) => Ok(EntryStat {
                is_dir: false,
                is_symlink: true,
                size: 0,
                modified_nanos: modified_nanos(&link_metadata),
            }),
        }
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), AccessError> {
        copy_file_with_metadata(src, dst).map(|_| ())
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<(), AccessError> {
        copy_tree_with_metadata(src, dst)
    }

    fn delete_file(&self, path: &Path) -> Result<(), AccessError> {
        fs::remove_file(path).map_err(|e| AccessError::new(Operation::DeleteFile, path, e))
    }

    fn delete_tree(&self, path: &Path) -> Result<(), AccessError> {
        fs::remove_dir_all(path).map_err(|e| AccessError::new(Operation::DeleteTree, path, e))
    }
}

fn entry_stat(metadata: &fs::Metadata, is_symlink: bool) -> EntryStat {
    EntryStat {
        is_dir: metadata.is_dir(),
        is_symlink,
        size: metadata.len(),
        modified_nanos: modified_nanos(metadata),
    }
}

/// Modification time as nanoseconds since the Unix epoch (negative before it).
fn modified_nanos(metadata: &fs::Metadata) -> i128 {
    let mtime = FileTime::from_last_modification_time(metadata);
    i128::from(mtime.unix_seconds()) * 1_000_000_000 + i128::from(mtime.nanoseconds())
}

/// Copy a file from source to destination with metadata preservation.
///
/// Contents and permissions are copied by `fs::copy`; the modification time is
/// then set to the source's so later size/mtime comparisons see the pair as
/// equal.
///
/// # Returns
/// Number of bytes copied
///
/// # Errors
/// Returns AccessError (reported against `src`) if any step fails
pub fn copy_file_with_metadata(src: &Path, dst: &Path) -> Result<u64, AccessError> {
    let copy_err = |e| AccessError::new(Operation::CopyFile, src, e);

    let src_metadata = fs::metadata(src).map_err(copy_err)?;
    let bytes_copied = fs::copy(src, dst).map_err(copy_err)?;

    let mtime = FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_mtime(dst, mtime).map_err(copy_err)?;

    Ok(bytes_copied)
}

/// Copy a directory tree that does not yet exist at `dst`.
///
/// Walks with an explicit stack instead of recursion. Symlinks inside the tree
/// are followed. Directory modification times are applied after all contents
/// have been written, deepest directories first.
///
/// # Errors
/// Stops at the first failure and returns it; whatever was already copied
/// stays in place.
pub fn copy_tree_with_metadata(src: &Path, dst: &Path) -> Result<(), AccessError> {
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];
    let mut created: Vec<(PathBuf, PathBuf)> = Vec::new();

    while let Some((from_dir, to_dir)) = pending.pop() {
        fs::create_dir(&to_dir).map_err(tree_err(&to_dir))?;

        for entry in fs::read_dir(&from_dir).map_err(tree_err(&from_dir))? {
            let entry = entry.map_err(tree_err(&from_dir))?;
            let from = entry.path();
            let to = to_dir.join(entry.file_name());

            let metadata = fs::metadata(&from).map_err(tree_err(&from))?;
            if metadata.is_dir() {
                pending.push((from, to));
            } else {
                copy_file_with_metadata(&from, &to)
                    .map_err(|e| AccessError::new(Operation::CopyTree, e.path, e.source))?;
            }
        }

        created.push((from_dir, to_dir));
    }

    for (from_dir, to_dir) in created.iter().rev() {
        let metadata = fs::metadata(from_dir).map_err(tree_err(from_dir))?;
        let mtime = FileTime::from_last_modification_time(&metadata);
        filetime::set_file_mtime(to_dir, mtime).map_err(tree_err(to_dir))?;
    }

    Ok(())
}

fn tree_err(path: &Path) -> impl FnOnce(io::Error) -> AccessError {
    let path = path.to_path_buf();
    move |e| AccessError::new(Operation::CopyTree, path, e)
}
