//! Replacement engine: per-file edit lists that can be applied in any order.
//!
//! A formatter reports edits against the pristine file. [`Edit::trimmed`]
//! shrinks each one to the bytes it really changes, [`ReplacementSet`] keeps
//! the not-yet-applied edits of one file and shifts them as others land, and
//! [`apply_edit`] splices a single edit into a locked file.

mod edit;
mod set;
mod splice;

use std::io;

use thiserror::Error;

pub use edit::{Edit, EditId};
pub use set::ReplacementSet;
pub use splice::{LockedFile, SpliceTarget, apply_edit};

#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("edits {first} and {second} overlap")]
    Overlap { first: EditId, second: EditId },

    #[error("edit {offset}+{length} extends past end of file ({size} bytes)")]
    OutOfBounds {
        offset: usize,
        length: usize,
        size: u64,
    },

    #[error("no pending edit {0}")]
    UnknownEdit(EditId),

    #[error("shifting edit {id} by {delta} byte(s) moves it before the start of the file")]
    Rebase { id: EditId, delta: isize },

    #[error(transparent)]
    Io(#[from] io::Error),
}
