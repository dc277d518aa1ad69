use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use blamefmt_git::{Author, GitError, GitOid, GitRepo, GixRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn setup_repo() -> (TempDir, GixRepo) {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "-q", "-b", "main"]);
    git(dir.path(), &["config", "user.email", "test@test.com"]);
    git(dir.path(), &["config", "user.name", "Test User"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);
    let repo = GixRepo::open(dir.path()).unwrap();
    (dir, repo)
}

fn commit_as(dir: &Path, author: &str, file: &str, content: &str) -> GitOid {
    std::fs::write(dir.join(file), content).unwrap();
    git(dir, &["add", file]);
    git(dir, &["commit", "-q", "-m", "change", &format!("--author={author}")]);
    git(dir, &["rev-parse", "HEAD"]).trim().parse().unwrap()
}

// ===========================================================================
// Rev-parse / config
// ===========================================================================

#[test]
fn rev_parse_head() {
    let (dir, repo) = setup_repo();
    let oid = commit_as(dir.path(), "Alice <alice@example.com>", "a.c", "int a;\n");
    assert_eq!(repo.rev_parse("HEAD").unwrap(), oid);
}

#[test]
fn rev_parse_missing() {
    let (_dir, repo) = setup_repo();
    let err = repo.rev_parse("HEAD").unwrap_err();
    assert!(matches!(err, GitError::NotFound { .. }), "{err}");
}

#[test]
fn repo_is_shared_across_worker_threads() {
    let (dir, repo) = setup_repo();
    let oid = commit_as(dir.path(), "Alice <alice@example.com>", "a.c", "int a;\n");
    let shared: &dyn GitRepo = &repo;

    std::thread::scope(|s| {
        let workers: Vec<_> = (0..4)
            .map(|_| s.spawn(|| shared.rev_parse("HEAD").unwrap()))
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), oid);
        }
    });
}

#[test]
fn read_config_values() {
    let (_dir, repo) = setup_repo();
    assert_eq!(
        repo.read_config("user.name").unwrap().as_deref(),
        Some("Test User")
    );
    assert_eq!(repo.read_config("blamefmt.nonexistent").unwrap(), None);
}

#[test]
fn discover_from_subdirectory() {
    let (dir, _repo) = setup_repo();
    let sub = dir.path().join("src/nested");
    std::fs::create_dir_all(&sub).unwrap();
    let repo = GixRepo::discover(&sub).unwrap();
    assert_eq!(repo.workdir(), dir.path().canonicalize().unwrap());
}

// ===========================================================================
// Blame
// ===========================================================================

#[test]
fn blame_attributes_lines_to_authors() {
    let (dir, repo) = setup_repo();
    let first = commit_as(
        dir.path(),
        "Alice <alice@example.com>",
        "main.c",
        "int main(){\nreturn 0;\n}\n",
    );
    let second = commit_as(
        dir.path(),
        "Bob <bob@example.com>",
        "main.c",
        "int main(){\nreturn 1;\n}\n",
    );

    let hunks = repo.blame_file(second, Path::new("main.c")).unwrap();
    let per_line: Vec<(u32, GitOid, String)> = hunks
        .iter()
        .flat_map(|h| {
            (h.start_line..h.start_line + h.line_count)
                .map(move |l| (l, h.commit, h.author.name.clone()))
        })
        .collect();

    assert_eq!(
        per_line,
        vec![
            (1, first, "Alice".to_owned()),
            (2, second, "Bob".to_owned()),
            (3, first, "Alice".to_owned()),
        ]
    );
    assert_eq!(hunks[1].author, Author::new("Bob", "bob@example.com"));
}

#[test]
fn blame_at_older_revision_ignores_later_commits() {
    let (dir, repo) = setup_repo();
    let first = commit_as(dir.path(), "Alice <alice@example.com>", "x.c", "a\nb\n");
    commit_as(dir.path(), "Bob <bob@example.com>", "x.c", "a\nc\n");

    let hunks = repo.blame_file(first, Path::new("x.c")).unwrap();
    assert!(hunks.iter().all(|h| h.commit == first));
    assert_eq!(hunks.iter().map(|h| h.line_count).sum::<u32>(), 2);
}

#[test]
fn blame_untracked_file_is_not_tracked() {
    let (dir, repo) = setup_repo();
    let head = commit_as(dir.path(), "Alice <alice@example.com>", "a.c", "int a;\n");
    std::fs::write(dir.path().join("new.c"), "int b;\n").unwrap();

    let err = repo.blame_file(head, Path::new("new.c")).unwrap_err();
    assert!(matches!(err, GitError::NotTracked { .. }), "{err}");
}

// ===========================================================================
// Stage / commit
// ===========================================================================

#[test]
fn stage_and_commit_with_author() {
    let (dir, repo) = setup_repo();
    let base = commit_as(dir.path(), "Alice <alice@example.com>", "a.c", "int a;\n");

    assert!(!repo.has_staged_changes().unwrap());
    std::fs::write(dir.path().join("a.c"), "int a = 0;\n").unwrap();
    repo.stage_paths(&[PathBuf::from("a.c")]).unwrap();
    assert!(repo.has_staged_changes().unwrap());

    let bob = Author::new("Bob", "bob@example.com");
    let oid = repo.commit_staged("reformat", Some(&bob)).unwrap();
    assert_ne!(oid, base);
    assert_eq!(repo.rev_parse("HEAD").unwrap(), oid);

    let ident = git(dir.path(), &["log", "-1", "--format=%an <%ae>|%cn|%s"]);
    assert_eq!(ident.trim(), "Bob <bob@example.com>|Test User|reformat");
    assert!(!repo.has_staged_changes().unwrap());
}

#[test]
fn commit_without_author_uses_configured_identity() {
    let (dir, repo) = setup_repo();
    commit_as(dir.path(), "Alice <alice@example.com>", "a.c", "int a;\n");
    std::fs::write(dir.path().join("b.c"), "int b;\n").unwrap();
    repo.stage_paths(&[dir.path().join("b.c")]).unwrap();
    repo.commit_staged("add b", None).unwrap();

    let author = git(dir.path(), &["log", "-1", "--format=%an"]);
    assert_eq!(author.trim(), "Test User");
}

#[test]
fn commit_with_nothing_staged_fails() {
    let (dir, repo) = setup_repo();
    commit_as(dir.path(), "Alice <alice@example.com>", "a.c", "int a;\n");
    let err = repo.commit_staged("empty", None).unwrap_err();
    assert!(matches!(err, GitError::CommandFailed { .. }), "{err}");
}
