//! # dirsync Engine - One-way Directory Synchronization
//!
//! Makes a destination directory tree match a source tree of the same name.
//! Designed as the foundation for the CLI and any other front end.
//!
//! ## Overview
//!
//! The engine compares the two trees one directory level at a time:
//! - Destination-only entries are deleted (unless running in merge mode)
//! - Source-only files and directories are copied
//! - Shared files are overwritten when the size differs or the source is newer
//! - Shared directories are queued on a worklist and compared later
//!
//! Change detection uses size and modification time only. Individual
//! failures are logged and recorded; the run continues.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use dirsync::{synchronize, AlwaysConfirm, SyncMode, SyncOptions, SyncResult, TracingLogger};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = SyncOptions {
//!     mode: SyncMode::Mirror,
//!     skip_confirmation: true,
//! };
//!
//! match synchronize("/data/photos", "/backup/photos", options, &TracingLogger, &AlwaysConfirm)? {
//!     SyncResult::Completed(outcome) if outcome.errors_occurred => {
//!         println!("Finished with errors");
//!     }
//!     result => println!("{:?}", result),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (SyncJob, SyncOptions, EntryStat, SyncOutcome)
//! - **error**: Configuration and per-operation error types
//! - **fs_ops**: The `FileSystem` trait and its local implementation
//! - **differ**: Reconciliation of a single directory level
//! - **traversal**: Worklist traversal over the whole tree
//! - **sync**: Job orchestration (prepare, run)
//! - **progress**: The `SyncLogger` trait
//! - **confirm**: The `Confirmer` trait

pub mod confirm;
pub mod differ;
pub mod error;
pub mod fs_ops;
pub mod model;
pub mod progress;
pub mod sync;
pub mod traversal;

#[cfg(test)]
mod testing;

// Re-export main types and functions
pub use confirm::{AlwaysConfirm, Confirmer};
pub use differ::{needs_update, LevelDiffer, LevelReport};
pub use error::{AccessError, ConfigError, Operation, Side};
pub use fs_ops::{FileSystem, LocalFs};
pub use model::{EntryStat, SyncJob, SyncMode, SyncOptions, SyncOutcome, SyncResult, SyncStats};
pub use progress::{SyncLogger, TracingLogger};
pub use sync::{prepare_sync, run_sync, synchronize};
pub use traversal::{Traversal, TraversalState, Worklist};
