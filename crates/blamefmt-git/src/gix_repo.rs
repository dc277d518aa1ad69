//! The gix-backed implementation of [`GitRepo`].

use std::path::{Path, PathBuf};

use crate::error::GitError;
use crate::repo::GitRepo;
use crate::types::{Author, BlameHunk, GitOid};

/// A [`GitRepo`] implementation backed by [gix](https://github.com/GitoxideLabs/gitoxide)
/// for ref and config reads, and by the `git` CLI for blame and index writes.
///
/// Holds a [`gix::ThreadSafeRepository`] so one instance can be shared by the
/// blame workers; each call takes a cheap thread-local handle.
///
/// Construct via [`GixRepo::open`] or [`GixRepo::discover`].
pub struct GixRepo {
    pub(crate) repo: gix::ThreadSafeRepository,
    pub(crate) workdir: PathBuf,
}

impl GixRepo {
    /// Open the git repository at or above `path`.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo =
            gix::discover(path).map_err(|e| GitError::BackendError { message: e.to_string() })?;
        Self::from_repo(repo)
    }

    /// Open a git repository at exactly `path` (no parent discovery).
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = gix::open(path).map_err(|e| GitError::BackendError { message: e.to_string() })?;
        Self::from_repo(repo)
    }

    fn from_repo(repo: gix::Repository) -> Result<Self, GitError> {
        let workdir = repo.workdir().ok_or(GitError::NoWorkdir)?;
        // Canonical so callers can strip it from canonical file paths.
        let workdir = std::fs::canonicalize(workdir)?;
        Ok(Self {
            repo: repo.into_sync(),
            workdir,
        })
    }

    pub(crate) fn local(&self) -> gix::Repository {
        self.repo.to_thread_local()
    }
}

impl GitRepo for GixRepo {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    // === Rev-parse ===
    fn rev_parse(&self, spec: &str) -> Result<GitOid, GitError> {
        crate::refs_impl::rev_parse(self, spec)
    }

    // === Config ===
    fn read_config(&self, key: &str) -> Result<Option<String>, GitError> {
        crate::config_impl::read_config(self, key)
    }

    // === Blame ===
    fn blame_file(&self, revision: GitOid, path: &Path) -> Result<Vec<BlameHunk>, GitError> {
        crate::blame_impl::blame_file(self, revision, path)
    }

    // === Commit ===
    fn stage_paths(&self, paths: &[PathBuf]) -> Result<(), GitError> {
        crate::index_impl::stage_paths(self, paths)
    }

    fn has_staged_changes(&self) -> Result<bool, GitError> {
        crate::index_impl::has_staged_changes(self)
    }

    fn commit_staged(&self, message: &str, author: Option<&Author>) -> Result<GitOid, GitError> {
        crate::commit_impl::commit_staged(self, message, author)
    }
}
