//! Error types for the sync engine.
//!
//! Two families exist:
//! - `ConfigError`: fatal problems with the two roots, detected before anything
//!   is mutated. The run never starts.
//! - `AccessError`: a single filesystem operation failed during the run. These
//!   are recorded and logged, never propagated out of the traversal.

use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which side of the sync a root path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => write!(f, "Source"),
            Side::Destination => write!(f, "Destination"),
        }
    }
}

/// Errors that prevent a sync from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Root path does not exist
    #[error("{side} folder \"{}\" does not exist", path.display())]
    NotFound { side: Side, path: PathBuf },

    /// Root path exists but is a file or something else
    #[error("{side} folder \"{}\" is not a valid directory", path.display())]
    NotADirectory { side: Side, path: PathBuf },

    /// Permission denied while resolving the root
    #[error("{side} folder \"{}\" is not accessible: permission denied", path.display())]
    AccessDenied {
        side: Side,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other failure while resolving the root
    #[error("{side} folder \"{}\" could not be resolved: {source}", path.display())]
    Inaccessible {
        side: Side,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The two roots do not share the same directory name
    #[error("source and destination directory names do not match (source: {source_name:?}, destination: {destination_name:?})")]
    NameMismatch {
        source_name: String,
        destination_name: String,
    },

    /// One root lies inside the other
    #[error("\"{}\" is nested inside \"{}\"; the trees must not overlap", inner.display(), outer.display())]
    NestedRoots { inner: PathBuf, outer: PathBuf },
}

/// The filesystem operation an `AccessError` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Stat,
    CopyFile,
    CopyTree,
    DeleteFile,
    DeleteTree,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::List => "list",
            Operation::Stat => "stat",
            Operation::CopyFile => "copy file",
            Operation::CopyTree => "copy directory",
            Operation::DeleteFile => "delete file",
            Operation::DeleteTree => "delete directory",
        };
        f.write_str(verb)
    }
}

/// A single filesystem operation failed.
///
/// `path` is the entry the operation was applied to; for copies it is the
/// source side, since that is what the user recognizes in the log.
#[derive(Debug, Error)]
#[error("could not {op} '{}': {source}", path.display())]
pub struct AccessError {
    pub op: Operation,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl AccessError {
    pub fn new(op: Operation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        AccessError {
            op,
            path: path.into(),
            source,
        }
    }

    /// Extract the OS error code from this error, if available.
    pub fn raw_os_error(&self) -> Option<u32> {
        self.source.raw_os_error().map(|e| e as u32)
    }

    /// True for permission-class failures.
    pub fn is_permission_denied(&self) -> bool {
        self.source.kind() == io::ErrorKind::PermissionDenied
    }
}
