//! Shared helpers for blamefmt integration tests.
//!
//! Provides [`TestRepo`], a real git repository in a temporary directory with
//! helpers to commit as different authors, and two [`Formatter`] doubles so
//! the pipeline can run without clang-format installed.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use blamefmt::formatter::{Formatter, FormatterError};
use blamefmt::pipeline::{CommitOptions, GenerateOptions, Mode, RunOptions};
use blamefmt::replace::Edit;
use blamefmt_git::{Author, GixRepo};
use tempfile::TempDir;

pub const ALICE: &str = "Alice <alice@example.com>";
pub const BOB: &str = "Bob <bob@example.com>";

// ---------------------------------------------------------------------------
// TestRepo
// ---------------------------------------------------------------------------

/// A git repository in a temp dir, committer identity `Test User`.
pub struct TestRepo {
    _dir: TempDir,
    root: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let root = dir.path().canonicalize().expect("canonical temp dir");
        let repo = Self { _dir: dir, root };
        repo.git(&["init", "-q", "-b", "main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn open(&self) -> GixRepo {
        GixRepo::open(&self.root).expect("open test repo")
    }

    /// Run git and return stdout, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let out = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .expect("failed to run git");
        assert!(
            out.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8_lossy(&out.stdout).into_owned()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, content).expect("write file");
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).expect("read file")
    }

    /// Write `files` and commit them as `author` (`Name <email>`).
    pub fn commit_as(&self, author: &str, files: &[(&str, &str)]) -> String {
        for (rel, content) in files {
            self.write(rel, content);
            self.git(&["add", rel]);
        }
        self.git(&["commit", "-q", "-m", "change", &format!("--author={author}")]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"]).trim().to_owned()
    }

    pub fn commit_count(&self) -> usize {
        self.git(&["rev-list", "--count", "HEAD"])
            .trim()
            .parse()
            .expect("numeric rev-list count")
    }

    /// `%an|%cn|%s` of the last `n` commits, newest first.
    pub fn log(&self, n: usize) -> Vec<String> {
        self.git(&["log", &format!("-{n}"), "--format=%an|%cn|%s"])
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Author name per line of `rel` at HEAD.
    pub fn blame_authors(&self, rel: &str) -> Vec<String> {
        self.git(&["blame", "--line-porcelain", "HEAD", "--", rel])
            .lines()
            .filter_map(|l| l.strip_prefix("author "))
            .map(str::to_owned)
            .collect()
    }

    pub fn status(&self) -> String {
        self.git(&["status", "--porcelain"])
    }
}

// ---------------------------------------------------------------------------
// Formatter doubles
// ---------------------------------------------------------------------------

/// Rewrites `from` to `to` on every line containing it, proposing the whole
/// line as the edit the way a real formatter restates context.
pub struct LineFormatter {
    pub from: String,
    pub to: String,
    /// File names that make the formatter fail.
    pub failing: Vec<String>,
}

impl LineFormatter {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_owned(),
            to: to.to_owned(),
            failing: Vec::new(),
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.push(name.to_owned());
        self
    }
}

impl Formatter for LineFormatter {
    fn name(&self) -> &str {
        "line-formatter"
    }

    fn replacements(&self, path: &Path) -> Result<Vec<Edit>, FormatterError> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        if name.is_some_and(|n| self.failing.contains(&n)) {
            return Err(FormatterError::Failed {
                program: "line-formatter".to_owned(),
                status: "exit status: 1".to_owned(),
                stderr: "syntax error".to_owned(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| FormatterError::Spawn {
            program: "line-formatter".to_owned(),
            source,
        })?;
        let mut edits = Vec::new();
        let mut offset = 0;
        for line in content.split_inclusive('\n') {
            if line.contains(&self.from) {
                edits.push(Edit::new(offset, line.len(), line.replace(&self.from, &self.to)));
            }
            offset += line.len();
        }
        Ok(edits)
    }
}

/// Returns canned edits per file name.
#[derive(Default)]
pub struct FixedFormatter {
    pub edits: HashMap<String, Vec<Edit>>,
}

impl FixedFormatter {
    pub fn with(mut self, name: &str, edits: Vec<Edit>) -> Self {
        self.edits.insert(name.to_owned(), edits);
        self
    }
}

impl Formatter for FixedFormatter {
    fn name(&self) -> &str {
        "fixed-formatter"
    }

    fn replacements(&self, path: &Path) -> Result<Vec<Edit>, FormatterError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.edits.get(&name).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

pub fn options(mode: Mode) -> RunOptions {
    RunOptions {
        mode,
        jobs: 2,
        show_progress: false,
        generate: GenerateOptions {
            max_file_bytes: 256 * 1024,
            copyright: None,
        },
        commit: CommitOptions {
            message: "blamefmt: reformat and keep blame info".to_owned(),
            unattributed_message: "blamefmt: format uncommitted code".to_owned(),
            fallback_author: Some(Author::new("Format Bot", "bot@example.com")),
        },
    }
}
