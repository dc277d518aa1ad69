//! The two phases of a run.
//!
//! 1. **Generate** (parallel): every file is formatted, trimmed, and blamed
//!    against the baseline revision; nothing touches the working tree.
//! 2. **Apply + commit** (serial): edits are partitioned by author, and each
//!    author's edits are applied in place and committed under their identity.

mod apply;
mod generate;

use std::collections::HashMap;
use std::path::PathBuf;

use blamefmt_git::{GitOid, GitRepo};
use thiserror::Error;

use crate::attribution::partition::{AttributedEdit, Partition};
use crate::formatter::Formatter;
use crate::progress::Progress;

pub use apply::{ApplyError, ApplyErrorKind, ApplySummary, Applier, CommitOptions, GroupRecord};
pub use generate::{
    FileAttribution, FileOutcome, FileReport, GenerateOptions, Generated, Generator,
};

/// How far a run goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Generate edits and report; write nothing.
    DryRun,
    /// Apply edits to the working tree without committing.
    NoCommit,
    /// Apply edits and create one commit per author.
    Commit,
}

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub mode: Mode,
    pub jobs: usize,
    pub show_progress: bool,
    pub generate: GenerateOptions,
    pub commit: CommitOptions,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files considered.
    pub files: usize,
    /// Files with at least one edit, in discovery order.
    pub formatted: Vec<PathBuf>,
    pub skipped: usize,
    /// Baseline revision blame was taken at.
    pub baseline: Option<GitOid>,
    /// `None` in dry-run mode.
    pub applied: Option<ApplySummary>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("could not start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Format `files` and, unless told otherwise, commit the result.
///
/// Without a repository, edits are applied but nothing is blamed or
/// committed.
///
/// # Errors
/// Per-file problems are reported and skipped. Only a failure to start the
/// worker pool or a failure while applying or committing aborts the run.
pub fn run(
    repo: Option<&dyn GitRepo>,
    formatter: &dyn Formatter,
    files: &[PathBuf],
    options: &RunOptions,
) -> Result<RunSummary, RunError> {
    let baseline = repo.and_then(resolve_baseline);
    let generator = Generator::new(repo, baseline, formatter, &options.generate);
    let progress = Progress::new(files.len(), options.show_progress);
    let reports = generator.run(files, options.jobs, &progress)?;
    progress.finish();

    let mut summary = RunSummary {
        files: files.len(),
        baseline,
        ..RunSummary::default()
    };
    let mut sets = HashMap::new();
    let mut attributed = Vec::new();
    let mut unattributed = Vec::new();

    for report in reports {
        let generated = match report.outcome {
            FileOutcome::Skipped(_) => {
                summary.skipped += 1;
                continue;
            }
            FileOutcome::Clean => continue,
            FileOutcome::Formatted(generated) => generated,
        };
        match generated.attribution {
            FileAttribution::Attributed(edits) => {
                attributed.extend(edits.into_iter().map(|(id, attribution)| AttributedEdit {
                    path: report.path.clone(),
                    id,
                    attribution,
                }));
            }
            FileAttribution::Unattributed(_) => {
                unattributed.extend(generated.set.ids().map(|id| (report.path.clone(), id)));
            }
        }
        summary.formatted.push(report.path.clone());
        sets.insert(report.path, generated.set);
    }

    if options.mode == Mode::DryRun {
        return Ok(summary);
    }

    let partition = Partition::build(attributed, unattributed);
    tracing::info!(
        authors = partition.groups.len(),
        unattributed = partition.unattributed.edit_count(),
        "partitioned edits"
    );
    let committer = repo.filter(|_| options.mode == Mode::Commit);
    summary.applied = Some(Applier::new(committer, &options.commit, sets).run(&partition)?);
    Ok(summary)
}

fn resolve_baseline(repo: &dyn GitRepo) -> Option<GitOid> {
    match repo.rev_parse("HEAD") {
        Ok(oid) => {
            tracing::debug!(baseline = %oid.short(), "blaming at HEAD");
            Some(oid)
        }
        Err(e) => {
            tracing::warn!(error = %e, "no HEAD commit, all edits will be unattributed");
            None
        }
    }
}
