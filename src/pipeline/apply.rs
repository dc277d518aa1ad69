//! Phase 2: apply each group's edits and commit them under its author.
//!
//! Groups are processed one at a time, in partition order, with the
//! unattributed group last. Every file of a group is locked, edited in place,
//! and staged before the group's single commit is created.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io;
use std::path::PathBuf;

use blamefmt_git::{Author, GitError, GitOid, GitRepo};
use thiserror::Error;

use crate::attribution::partition::{EditsByFile, Partition};
use crate::replace::{LockedFile, ReplaceError, ReplacementSet};

/// Labels for the commits of a run.
#[derive(Clone, Debug)]
pub struct CommitOptions {
    pub message: String,
    pub unattributed_message: String,
    /// `None` commits the unattributed group as git's configured user.
    pub fallback_author: Option<Author>,
}

/// What happened to one group.
#[derive(Clone, Debug)]
pub struct GroupRecord {
    /// `None` for the unattributed group without a fallback author.
    pub author: Option<Author>,
    pub files: usize,
    pub edits: usize,
    /// Number of source commits folded into this group.
    pub source_commits: usize,
    /// The commit created, if any.
    pub commit: Option<GitOid>,
}

#[derive(Clone, Debug, Default)]
pub struct ApplySummary {
    pub groups: Vec<GroupRecord>,
    pub files_modified: BTreeSet<PathBuf>,
}

impl ApplySummary {
    #[must_use]
    pub fn commits(&self) -> usize {
        self.groups.iter().filter(|g| g.commit.is_some()).count()
    }
}

/// A group failed to apply or commit. Files listed in `mutated` were already
/// rewritten on disk and are not rolled back.
#[derive(Debug)]
pub struct ApplyError {
    pub group: String,
    pub mutated: Vec<PathBuf>,
    pub kind: ApplyErrorKind,
}

#[derive(Debug, Error)]
pub enum ApplyErrorKind {
    #[error("could not open {} for editing: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("could not edit {}: {source}", path.display())]
    Edit { path: PathBuf, source: ReplaceError },

    #[error("no generated edits for {}", path.display())]
    MissingFile { path: PathBuf },

    #[error(transparent)]
    Git(#[from] GitError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "applying edits for {} failed", self.group)?;
        if !self.mutated.is_empty() {
            let files: Vec<String> = self
                .mutated
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            write!(
                f,
                "; {} file(s) already modified and left in place: {}",
                self.mutated.len(),
                files.join(", ")
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ApplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Serial applier over the generated replacement sets of a run.
pub struct Applier<'a> {
    /// `None` applies edits without staging or committing.
    repo: Option<&'a dyn GitRepo>,
    options: &'a CommitOptions,
    sets: HashMap<PathBuf, ReplacementSet>,
    mutated: BTreeSet<PathBuf>,
}

impl<'a> Applier<'a> {
    #[must_use]
    pub fn new(
        repo: Option<&'a dyn GitRepo>,
        options: &'a CommitOptions,
        sets: HashMap<PathBuf, ReplacementSet>,
    ) -> Self {
        Self {
            repo,
            options,
            sets,
            mutated: BTreeSet::new(),
        }
    }

    /// Apply and commit every group of `partition`.
    ///
    /// # Errors
    /// Stops at the first group that fails to apply, stage, or commit.
    pub fn run(mut self, partition: &Partition) -> Result<ApplySummary, ApplyError> {
        let options = self.options;
        let mut groups = Vec::with_capacity(partition.groups.len() + 1);

        for group in partition.groups.values() {
            let label = group.author.to_string();
            self.apply_group(&label, &group.edits)?;
            let commit = self.commit(&label, &group.edits, &options.message, Some(&group.author))?;
            groups.push(GroupRecord {
                author: Some(group.author.clone()),
                files: group.edits.len(),
                edits: group.edit_count(),
                source_commits: group.commits.len(),
                commit,
            });
        }

        let rest = &partition.unattributed;
        if !rest.is_empty() {
            let label = "unattributed edits";
            let author = options.fallback_author.as_ref();
            self.apply_group(label, &rest.edits)?;
            let commit = self.commit(label, &rest.edits, &options.unattributed_message, author)?;
            groups.push(GroupRecord {
                author: author.cloned(),
                files: rest.edits.len(),
                edits: rest.edit_count(),
                source_commits: 0,
                commit,
            });
        }

        Ok(ApplySummary {
            groups,
            files_modified: self.mutated,
        })
    }

    fn apply_group(&mut self, label: &str, edits: &EditsByFile) -> Result<(), ApplyError> {
        for (path, ids) in edits {
            let set = self.sets.get_mut(path).ok_or_else(|| {
                let kind = ApplyErrorKind::MissingFile { path: path.clone() };
                failure(label, &self.mutated, kind)
            })?;
            let mut file = LockedFile::open(path).map_err(|source| {
                failure(label, &self.mutated, ApplyErrorKind::Open {
                    path: path.clone(),
                    source,
                })
            })?;
            self.mutated.insert(path.clone());

            for &id in ids {
                set.apply(id, &mut file).map_err(|source| {
                    failure(label, &self.mutated, ApplyErrorKind::Edit {
                        path: path.clone(),
                        source,
                    })
                })?;
            }
            tracing::debug!(group = label, path = %path.display(), edits = ids.len(), "applied");
        }
        Ok(())
    }

    fn commit(
        &self,
        label: &str,
        edits: &EditsByFile,
        message: &str,
        author: Option<&Author>,
    ) -> Result<Option<GitOid>, ApplyError> {
        let Some(repo) = self.repo else {
            return Ok(None);
        };
        let git = |e: GitError| failure(label, &self.mutated, e.into());

        let paths: Vec<PathBuf> = edits.keys().cloned().collect();
        repo.stage_paths(&paths).map_err(git)?;
        if !repo.has_staged_changes().map_err(git)? {
            tracing::warn!(group = label, "nothing staged, skipping commit");
            return Ok(None);
        }
        let oid = repo.commit_staged(message, author).map_err(git)?;
        tracing::info!(group = label, commit = %oid.short(), files = paths.len(), "committed");
        Ok(Some(oid))
    }
}

fn failure(group: &str, mutated: &BTreeSet<PathBuf>, kind: ApplyErrorKind) -> ApplyError {
    ApplyError {
        group: group.to_owned(),
        mutated: mutated.iter().cloned().collect(),
        kind,
    }
}
