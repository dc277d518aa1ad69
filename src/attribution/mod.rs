//! Blame attribution of edits.
//!
//! Each file's blame is snapshotted once at the baseline revision into a
//! [`BlameLineMap`]. Edits are then resolved against that snapshot to the
//! single commit considered responsible for the bytes they touch.

pub mod partition;

use std::path::Path;

use blamefmt_git::{Author, BlameHunk, GitError, GitOid, GitRepo};
use thiserror::Error;

use crate::replace::Edit;

/// The commit and author a line (or an edit) belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribution {
    pub commit: GitOid,
    pub author: Author,
}

/// Why a file cannot be attributed. Its edits go to the unattributed group.
#[derive(Debug, Error)]
pub enum BlameUnavailable {
    #[error("no baseline revision")]
    NoBaseline,

    #[error("file has no recorded history")]
    NoHistory,

    #[error("file is outside the repository")]
    OutsideRepository,

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Per-line blame of one file, as of the baseline revision.
#[derive(Clone, Debug, Default)]
pub struct BlameLineMap {
    /// Index 0 is line 1.
    lines: Vec<Attribution>,
}

impl BlameLineMap {
    /// Expand blame hunks into one entry per line.
    ///
    /// Hunks are expected in line order, as `git blame` reports them.
    #[must_use]
    pub fn from_hunks(hunks: &[BlameHunk]) -> Self {
        let mut lines = Vec::with_capacity(hunks.iter().map(|h| h.line_count as usize).sum());
        for hunk in hunks {
            debug_assert_eq!(hunk.start_line as usize, lines.len() + 1, "blame hunks out of order");
            let attribution = Attribution {
                commit: hunk.commit,
                author: hunk.author.clone(),
            };
            lines.extend(std::iter::repeat_n(attribution, hunk.line_count as usize));
        }
        Self { lines }
    }

    /// Blame `path` at `baseline`.
    ///
    /// # Errors
    /// Returns [`BlameUnavailable`] if the file is outside the repository,
    /// untracked at `baseline`, empty there, or blame fails.
    pub fn snapshot(
        repo: &dyn GitRepo,
        baseline: GitOid,
        path: &Path,
    ) -> Result<Self, BlameUnavailable> {
        let relative = match path.strip_prefix(repo.workdir()) {
            Ok(relative) => relative.to_owned(),
            Err(_) => std::fs::canonicalize(path)
                .ok()
                .and_then(|p| p.strip_prefix(repo.workdir()).ok().map(Path::to_owned))
                .ok_or(BlameUnavailable::OutsideRepository)?,
        };
        let map = Self::from_hunks(&repo.blame_file(baseline, &relative)?);
        if map.is_empty() {
            return Err(BlameUnavailable::NoHistory);
        }
        Ok(map)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Blame of 1-based `line`. Lines past the end of the snapshot fall back
    /// to line 1.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&Attribution> {
        self.lines
            .get(line.wrapping_sub(1))
            .or_else(|| self.lines.first())
    }

    /// Resolve `edit` to the commit responsible for the lines it touches.
    ///
    /// Distinct `(commit, author)` pairs are collected over the edit's line
    /// range in ascending line order; the last distinct pair wins.
    ///
    /// # Errors
    /// Returns [`BlameUnavailable::NoHistory`] if the map is empty.
    pub fn attribute(
        &self,
        lines: &LineIndex,
        edit: &Edit,
    ) -> Result<Resolution, BlameUnavailable> {
        let first_line = lines.line_of(edit.offset);
        let last_line = lines.line_of(edit.offset.saturating_add(edit.length.saturating_sub(1)));

        let mut distinct: Vec<&Attribution> = Vec::new();
        for line in first_line..=last_line {
            let entry = self.line(line).ok_or(BlameUnavailable::NoHistory)?;
            if !distinct.contains(&entry) {
                distinct.push(entry);
            }
        }

        let mut contenders: Vec<Author> = Vec::new();
        for entry in &distinct {
            if !contenders.contains(&entry.author) {
                contenders.push(entry.author.clone());
            }
        }
        if contenders.len() < 2 {
            contenders.clear();
        }

        let attribution = distinct
            .last()
            .map(|a| (*a).clone())
            .ok_or(BlameUnavailable::NoHistory)?;
        Ok(Resolution {
            attribution,
            first_line,
            last_line,
            contenders,
        })
    }
}

/// Outcome of attributing one edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub attribution: Attribution,
    pub first_line: usize,
    pub last_line: usize,
    /// Distinct authors across the range when there is more than one.
    pub contenders: Vec<Author>,
}

impl Resolution {
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        !self.contenders.is_empty()
    }
}

/// Byte offset to line number lookup for one file's content.
#[derive(Clone, Debug)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    #[must_use]
    pub fn new(content: &[u8]) -> Self {
        let newlines = content
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| (b == b'\n').then_some(i))
            .collect();
        Self { newlines }
    }

    /// 1-based line containing byte `offset`: one plus the number of
    /// newlines strictly before it.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}
