//! Thin wrapper around `git` subprocesses for the operations gix does not
//! cover (porcelain blame, pathspec staging, authored commits).

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::GitError;

/// Run `git <args>` in `workdir` and return the raw output, whatever the
/// exit status.
pub(crate) fn git_output<I, S>(workdir: &Path, args: I) -> Result<(String, Output), GitError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
    let command = format!(
        "git {}",
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    tracing::trace!(%command, "running git");
    let output = Command::new("git")
        .args(&args)
        .current_dir(workdir)
        .output()?;
    Ok((command, output))
}

/// Run `git <args>` in `workdir` and return stdout, failing on a non-zero
/// exit status.
pub(crate) fn git_stdout<I, S>(workdir: &Path, args: I) -> Result<String, GitError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let (command, output) = git_output(workdir, args)?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(command_failed(command, &output))
    }
}

pub(crate) fn command_failed(command: String, output: &Output) -> GitError {
    GitError::CommandFailed {
        command,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        exit_code: output.status.code(),
    }
}
