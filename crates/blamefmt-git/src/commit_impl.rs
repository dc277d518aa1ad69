//! Authored commits for [`GixRepo`].

use crate::GixRepo;
use crate::cli;
use crate::error::GitError;
use crate::types::{Author, GitOid};

/// Commit the current index on top of HEAD, equivalent to
/// `git commit --no-verify -m <message> [--author <ident>]`.
pub fn commit_staged(
    repo: &GixRepo,
    message: &str,
    author: Option<&Author>,
) -> Result<GitOid, GitError> {
    let mut args = vec![
        "commit".to_owned(),
        "--quiet".to_owned(),
        "--no-verify".to_owned(),
        "-m".to_owned(),
        message.to_owned(),
    ];
    if let Some(author) = author {
        args.push(format!("--author={}", author.ident()));
    }
    cli::git_stdout(&repo.workdir, &args)?;

    let oid = crate::refs_impl::rev_parse(repo, "HEAD")?;
    tracing::debug!(commit = %oid, author = ?author.map(Author::ident), "created commit");
    Ok(oid)
}
