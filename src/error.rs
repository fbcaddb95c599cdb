//! Error types and result aliases for frefactor.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate
//! - [`TreeShapeError`]: A syntax node did not have the shape an algorithm assumed
//! - [`BackupError`]: Failure to create the backup file before an in-place rewrite

use std::path::PathBuf;

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// A syntax node did not have the tag shape the traversal assumed.
///
/// This indicates the upstream parse is inconsistent with the transformation's
/// assumptions. It is propagated to the run level and aborts the whole run;
/// it is never caught and skipped per statement or per file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeShapeError {
    #[error("expected {expected}, found {found}")]
    UnexpectedTag { expected: &'static str, found: String },

    #[error("{context}: expected a further {missing} node")]
    MissingNode {
        context: &'static str,
        missing: &'static str,
    },
}

/// Renaming the original file to its backup sibling failed.
///
/// Aborts the whole run: writing the rewritten content without a backup in
/// place would risk data loss on a half-completed write.
#[derive(Debug, Error)]
#[error("cannot rename {} to backup {}: {source}", path.display(), backup.display())]
pub struct BackupError {
    pub path: PathBuf,
    pub backup: PathBuf,
    #[source]
    pub source: std::io::Error,
}
