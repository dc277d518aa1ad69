//! Per-file skip reasons.
//!
//! A file that cannot be formatted is reported and left untouched; it never
//! aborts the run. Errors that do abort a run live with the stage that
//! raises them ([`crate::pipeline::ApplyError`], [`crate::config::ConfigError`]).

use std::io;

use thiserror::Error;

use crate::formatter::FormatterError;
use crate::replace::ReplaceError;

/// Why a file was left out of the run.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("file is {size_kb} KB, over the {limit_kb} KB limit")]
    FileTooLarge { size_kb: u64, limit_kb: u64 },

    #[error("file is empty")]
    FileEmpty,

    #[error("permission denied")]
    PermissionDenied,

    #[error("formatter failed: {0}")]
    Formatter(#[from] FormatterError),

    #[error("formatter proposed unusable edits: {0}")]
    MalformedEdits(#[from] ReplaceError),

    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for SkipReason {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied
        } else {
            Self::Io(e)
        }
    }
}
