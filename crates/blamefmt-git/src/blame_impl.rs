//! Blame via `git blame --porcelain`.
//!
//! Porcelain output is a sequence of groups. Each group opens with a header
//! `<sha> <orig-line> <final-line> <num-lines>`, and every further line of the
//! group repeats the header without the count. The first time a commit
//! appears its metadata (`author`, `author-mail`, ...) follows the header.
//! Every blamed source line is echoed prefixed with a tab.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

use crate::cli;
use crate::error::GitError;
use crate::gix_repo::GixRepo;
use crate::types::{Author, BlameHunk, GitOid};

pub fn blame_file(
    repo: &GixRepo,
    revision: GitOid,
    path: &Path,
) -> Result<Vec<BlameHunk>, GitError> {
    let rev = revision.to_string();
    let args = [
        OsStr::new("blame"),
        OsStr::new("--porcelain"),
        OsStr::new(&rev),
        OsStr::new("--"),
        path.as_os_str(),
    ];
    let (command, output) = cli::git_output(&repo.workdir, args)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_untracked_message(&stderr) {
            return Err(GitError::NotTracked {
                path: path.to_path_buf(),
                revision: rev,
            });
        }
        return Err(cli::command_failed(command, &output));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_porcelain(&stdout).map_err(|message| GitError::MalformedOutput { command, message })
}

fn is_untracked_message(stderr: &str) -> bool {
    stderr.contains("no such path") || stderr.contains("outside repository")
}

#[derive(Default)]
struct PartialAuthor {
    name: Option<String>,
    email: Option<String>,
}

/// Parse porcelain blame output into ordered hunks.
pub(crate) fn parse_porcelain(out: &str) -> Result<Vec<BlameHunk>, String> {
    // (commit, final start line, line count) in output order.
    let mut groups: Vec<(GitOid, u32, u32)> = Vec::new();
    let mut authors: HashMap<GitOid, PartialAuthor> = HashMap::new();
    let mut current: Option<GitOid> = None;
    let mut content_lines: u64 = 0;

    for line in out.lines() {
        if line.starts_with('\t') {
            content_lines += 1;
            continue;
        }

        if let Some(header) = parse_header(line) {
            let (oid, final_line, count) = header?;
            if let Some(count) = count {
                groups.push((oid, final_line, count));
            }
            current = Some(oid);
            continue;
        }

        let Some(oid) = current else {
            return Err(format!("metadata before first header: {line:?}"));
        };
        if let Some(name) = line.strip_prefix("author ") {
            authors.entry(oid).or_default().name = Some(name.to_owned());
        } else if let Some(mail) = line.strip_prefix("author-mail ") {
            let mail = mail.trim_start_matches('<').trim_end_matches('>');
            authors.entry(oid).or_default().email = Some(mail.to_owned());
        }
    }

    let declared: u64 = groups.iter().map(|&(_, _, count)| u64::from(count)).sum();
    if declared != content_lines {
        return Err(format!(
            "headers declare {declared} line(s) but {content_lines} were echoed"
        ));
    }

    groups
        .into_iter()
        .map(|(commit, start_line, line_count)| {
            let author = authors
                .get(&commit)
                .and_then(|a| Some(Author::new(a.name.clone()?, a.email.clone()?)))
                .ok_or_else(|| format!("no author recorded for {commit}"))?;
            Ok(BlameHunk {
                commit,
                author,
                start_line,
                line_count,
            })
        })
        .collect()
}

/// Recognise a group header. Returns `None` for non-header lines.
fn parse_header(line: &str) -> Option<Result<(GitOid, u32, Option<u32>), String>> {
    let mut fields = line.split(' ');
    let oid: GitOid = fields.next()?.parse().ok()?;
    let _orig: u32 = fields.next()?.parse().ok()?;
    let final_line = match fields.next().map(str::parse::<u32>) {
        Some(Ok(n)) => n,
        _ => return Some(Err(format!("header without numeric final line: {line:?}"))),
    };
    let count = match fields.next().map(str::parse::<u32>) {
        None => None,
        Some(Ok(n)) => Some(n),
        Some(Err(_)) => return Some(Err(format!("header with non-numeric count: {line:?}"))),
    };
    Some(Ok((oid, final_line, count)))
}
