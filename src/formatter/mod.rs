//! External formatters that propose edits for a file.

mod clang;
pub mod header;

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::replace::Edit;

pub use clang::{ClangFormat, parse_replacements};

/// Something that can propose edits for a file on disk.
///
/// Edits are expressed against the file's current bytes, may be reported in
/// any order, and are not yet trimmed.
pub trait Formatter: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Ask the formatter how it would rewrite `path`.
    ///
    /// # Errors
    /// Returns a [`FormatterError`] if the formatter cannot be run or its
    /// output cannot be understood.
    fn replacements(&self, path: &Path) -> Result<Vec<Edit>, FormatterError>;
}

#[derive(Debug, Error)]
pub enum FormatterError {
    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("unreadable formatter output: {0}")]
    Output(String),
}
