//! Index (staging area) operations for [`GixRepo`].

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::GixRepo;
use crate::cli;
use crate::error::GitError;

/// Pathspecs per `git add` invocation, to stay well under `ARG_MAX`.
const STAGE_CHUNK: usize = 256;

/// Add the working-tree content of `paths` to the index, equivalent to
/// `git add -- <paths>`.
pub fn stage_paths(repo: &GixRepo, paths: &[PathBuf]) -> Result<(), GitError> {
    for chunk in paths.chunks(STAGE_CHUNK) {
        let args = [OsStr::new("add"), OsStr::new("--")]
            .into_iter()
            .chain(chunk.iter().map(|p| p.as_os_str()));
        cli::git_stdout(&repo.workdir, args)?;
    }
    Ok(())
}

/// `git diff --cached --quiet` exits 1 when the index differs from HEAD.
pub fn has_staged_changes(repo: &GixRepo) -> Result<bool, GitError> {
    let (command, output) = cli::git_output(&repo.workdir, ["diff", "--cached", "--quiet"])?;
    match output.status.code() {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(cli::command_failed(command, &output)),
    }
}
