//! Phase 1: per-file edit generation and attribution.
//!
//! Each file is sized, formatted, trimmed, and blamed independently on a
//! rayon pool. Nothing is written here; a file that cannot be processed is
//! reported as skipped and the rest of the run carries on.

use std::fs;
use std::path::{Path, PathBuf};

use blamefmt_git::{GitOid, GitRepo};
use rayon::prelude::*;

use crate::attribution::{Attribution, BlameLineMap, BlameUnavailable, LineIndex};
use crate::error::SkipReason;
use crate::formatter::{Formatter, header};
use crate::progress::Progress;
use crate::replace::{Edit, EditId, ReplaceError, ReplacementSet};

/// Files this small (a lone newline, say) are treated as empty.
const EMPTY_FILE_BYTES: u64 = 1;

/// Per-run generation settings.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Files larger than this are skipped.
    pub max_file_bytes: u64,
    /// Banner for files without a copyright notice.
    pub copyright: Option<Vec<u8>>,
}

/// Result of processing one file.
#[derive(Debug)]
pub enum FileOutcome {
    Skipped(SkipReason),
    /// The formatter had nothing to change.
    Clean,
    Formatted(Generated),
}

/// Edits for one file, ready for partitioning.
#[derive(Debug)]
pub struct Generated {
    pub set: ReplacementSet,
    pub attribution: FileAttribution,
}

/// Either every edit of a file is attributed, or none is.
#[derive(Debug)]
pub enum FileAttribution {
    Attributed(Vec<(EditId, Attribution)>),
    Unattributed(BlameUnavailable),
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Everything a generation task reads. Shared by reference across the pool.
pub struct Generator<'a> {
    repo: Option<&'a dyn GitRepo>,
    baseline: Option<GitOid>,
    formatter: &'a dyn Formatter,
    options: &'a GenerateOptions,
}

impl<'a> Generator<'a> {
    #[must_use]
    pub fn new(
        repo: Option<&'a dyn GitRepo>,
        baseline: Option<GitOid>,
        formatter: &'a dyn Formatter,
        options: &'a GenerateOptions,
    ) -> Self {
        Self {
            repo,
            baseline,
            formatter,
            options,
        }
    }

    /// Process `files` on a pool of `jobs` threads. Reports come back in the
    /// order of `files`.
    ///
    /// # Errors
    /// Fails only if the thread pool cannot be built.
    pub fn run(
        &self,
        files: &[PathBuf],
        jobs: usize,
        progress: &Progress,
    ) -> Result<Vec<FileReport>, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("blamefmt-gen-{i}"))
            .build()?;
        tracing::debug!(
            files = files.len(),
            jobs,
            formatter = self.formatter.name(),
            "generating edits"
        );

        Ok(pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let outcome = self.file(path);
                    progress.file_done(path);
                    FileReport {
                        path: path.clone(),
                        outcome,
                    }
                })
                .collect()
        }))
    }

    /// Process one file.
    pub fn file(&self, path: &Path) -> FileOutcome {
        match self.try_file(path) {
            Ok(Some(generated)) => FileOutcome::Formatted(generated),
            Ok(None) => {
                tracing::debug!(path = %path.display(), "already formatted");
                FileOutcome::Clean
            }
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "skipping file");
                FileOutcome::Skipped(reason)
            }
        }
    }

    fn try_file(&self, path: &Path) -> Result<Option<Generated>, SkipReason> {
        let size = fs::metadata(path)?.len();
        if size > self.options.max_file_bytes {
            return Err(SkipReason::FileTooLarge {
                size_kb: size / 1024,
                limit_kb: self.options.max_file_bytes / 1024,
            });
        }
        if size <= EMPTY_FILE_BYTES {
            return Err(SkipReason::FileEmpty);
        }

        let original = fs::read(path)?;
        let mut edits: Vec<Edit> = self
            .formatter
            .replacements(path)?
            .into_iter()
            .map(|edit| edit.trimmed(&original))
            .filter(|edit| !edit.is_noop())
            .collect();

        if let Some(edit) = edits.iter().find(|e| e.end() > original.len()) {
            return Err(ReplaceError::OutOfBounds {
                offset: edit.offset,
                length: edit.length,
                size: original.len() as u64,
            }
            .into());
        }
        if let Some(banner) = &self.options.copyright {
            header::inject(&original, banner, &mut edits);
        }
        if edits.is_empty() {
            return Ok(None);
        }

        let set = ReplacementSet::new(path, edits)?;
        let attribution = self.attribute(path, &original, &set);
        tracing::debug!(path = %path.display(), edits = set.len(), "generated edits");
        Ok(Some(Generated { set, attribution }))
    }

    fn attribute(&self, path: &Path, original: &[u8], set: &ReplacementSet) -> FileAttribution {
        let map = match self.blame(path) {
            Ok(map) => map,
            Err(reason) => {
                tracing::info!(
                    path = %path.display(),
                    %reason,
                    "no blame, edits go to the unattributed commit"
                );
                return FileAttribution::Unattributed(reason);
            }
        };

        let lines = LineIndex::new(original);
        let mut attributed = Vec::with_capacity(set.len());
        for (id, edit) in set.iter() {
            let resolution = match map.attribute(&lines, edit) {
                Ok(resolution) => resolution,
                Err(reason) => return FileAttribution::Unattributed(reason),
            };
            if resolution.is_ambiguous() {
                let authors: Vec<String> = resolution
                    .contenders
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                tracing::warn!(
                    path = %path.display(),
                    lines = %format!("{}-{}", resolution.first_line, resolution.last_line),
                    authors = %authors.join(", "),
                    chosen = %resolution.attribution.author,
                    "edit spans lines of several authors, attributing to the last one"
                );
            }
            tracing::debug!(
                path = %path.display(),
                edit = %id,
                commit = %resolution.attribution.commit.short(),
                "attributed edit"
            );
            attributed.push((id, resolution.attribution));
        }
        FileAttribution::Attributed(attributed)
    }

    fn blame(&self, path: &Path) -> Result<BlameLineMap, BlameUnavailable> {
        let (Some(repo), Some(baseline)) = (self.repo, self.baseline) else {
            return Err(BlameUnavailable::NoBaseline);
        };
        BlameLineMap::snapshot(repo, baseline, path)
    }
}
