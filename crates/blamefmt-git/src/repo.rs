//! The [`GitRepo`] trait: the abstraction boundary between blamefmt and git.
//!
//! The formatting engine uses git for exactly four things, grouped below:
//!
//! | Group     | Methods                                          |
//! |-----------|--------------------------------------------------|
//! | Rev-parse | `rev_parse`                                      |
//! | Config    | `read_config`                                    |
//! | Blame     | `blame_file`                                     |
//! | Commit    | `stage_paths`, `has_staged_changes`, `commit_staged` |

use std::path::{Path, PathBuf};

use crate::error::GitError;
use crate::types::{Author, BlameHunk, GitOid};

/// The git abstraction trait used by the formatting engine.
///
/// Implementations may be backed by gix plus the git CLI ([`GixRepo`](crate::GixRepo))
/// or a test double.
///
/// # Thread safety
///
/// Blame snapshots are taken from a worker pool, so implementations must be
/// `Send + Sync`. Staging and committing are only ever called from a single
/// thread.
///
/// # Object safety
///
/// This trait is object-safe: callers may use `&dyn GitRepo`.
pub trait GitRepo: Send + Sync {
    /// Root of the working tree all relative paths are resolved against.
    fn workdir(&self) -> &Path;

    // -----------------------------------------------------------------------
    // Rev-parse
    // -----------------------------------------------------------------------

    /// Resolve a revision specification (`HEAD`, `main~2`, a hex id) to an OID.
    ///
    /// Returns [`GitError::NotFound`] if the spec cannot be resolved.
    fn rev_parse(&self, spec: &str) -> Result<GitOid, GitError>;

    // -----------------------------------------------------------------------
    // Config
    // -----------------------------------------------------------------------

    /// Read a git config value. Returns `None` if the key is not set.
    fn read_config(&self, key: &str) -> Result<Option<String>, GitError>;

    // -----------------------------------------------------------------------
    // Blame
    // -----------------------------------------------------------------------

    /// Blame `path` (relative to [`workdir`](Self::workdir)) as of `revision`.
    ///
    /// Returns the hunks in file order; together they cover every line of the
    /// file at that revision. An empty vector means the file was empty.
    ///
    /// Returns [`GitError::NotTracked`] if the path does not exist at
    /// `revision` or lies outside the repository.
    fn blame_file(&self, revision: GitOid, path: &Path) -> Result<Vec<BlameHunk>, GitError>;

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Add the working-tree content of `paths` to the index.
    fn stage_paths(&self, paths: &[PathBuf]) -> Result<(), GitError>;

    /// Returns `true` if the index differs from HEAD.
    fn has_staged_changes(&self) -> Result<bool, GitError>;

    /// Commit the index on top of HEAD and return the new commit.
    ///
    /// When `author` is `Some`, the commit carries that author identity; the
    /// committer is always the configured user. Hooks are not run.
    fn commit_staged(&self, message: &str, author: Option<&Author>) -> Result<GitOid, GitError>;
}
