//! Direction confirmation.
//!
//! Destination files may be deleted, so the engine asks a `Confirmer` before
//! mutating anything. The CLI implements it with a terminal prompt; tests and
//! automation use `AlwaysConfirm` or a closure.

use std::path::Path;

/// Decides whether a sync FROM `source` TO `destination` may proceed.
pub trait Confirmer {
    fn confirm(&self, source: &Path, destination: &Path) -> bool;
}

/// Confirms every direction without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _source: &Path, _destination: &Path) -> bool {
        true
    }
}

impl<F> Confirmer for F
where
    F: Fn(&Path, &Path) -> bool,
{
    fn confirm(&self, source: &Path, destination: &Path) -> bool {
        self(source, destination)
    }
}
