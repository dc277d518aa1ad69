//! Error types for git operations.
//!
//! [`GitError`] is the single error type returned by all [`GitRepo`](crate::GitRepo) trait
//! methods. Callers match on [`GitError::NotTracked`] to tell "this file has no
//! history" apart from a genuinely failing repository.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`GitRepo`](crate::GitRepo) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// A requested object, ref, or revision was not found.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable description of what was missing.
        message: String,
    },

    /// The path has no history at the requested revision (untracked, new, or
    /// outside the repository).
    #[error("{} is not tracked at {revision}", path.display())]
    NotTracked {
        /// The path that was queried.
        path: PathBuf,
        /// The revision it was queried at.
        revision: String,
    },

    /// An OID string could not be parsed or was otherwise invalid.
    #[error("invalid OID `{value}`: {reason}")]
    InvalidOid {
        /// The raw value that failed validation.
        value: String,
        /// Why validation failed.
        reason: String,
    },

    /// The repository has no working tree (bare repository).
    #[error("repository has no working tree")]
    NoWorkdir,

    /// A `git` subprocess exited unsuccessfully.
    #[error("`{command}` failed (exit code {exit_code:?}): {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Trimmed stderr of the process.
        stderr: String,
        /// Exit code, if the process was not killed by a signal.
        exit_code: Option<i32>,
    },

    /// Output of a git command could not be parsed.
    #[error("malformed output from `{command}`: {message}")]
    MalformedOutput {
        /// The command whose output was rejected.
        command: String,
        /// What was wrong with it.
        message: String,
    },

    /// An I/O error occurred (file system, process spawn, etc.).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The underlying git backend (gix) returned an unclassified error.
    ///
    /// This is the catch-all for errors that don't fit other variants. The
    /// `message` should include enough context to diagnose the failure.
    #[error("git backend error: {message}")]
    BackendError {
        /// Freeform error description from the backend.
        message: String,
    },
}
