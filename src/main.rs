use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use blamefmt::config::{BlamefmtConfig, CONFIG_FILE};
use blamefmt::discover::{Exclude, discover};
use blamefmt::formatter::ClangFormat;
use blamefmt::pipeline::{self, CommitOptions, GenerateOptions, Mode, RunOptions, RunSummary};
use blamefmt::telemetry;
use blamefmt_git::{Author, GitRepo, GixRepo};
use clap::Parser;

/// Reformat a repository with clang-format without losing `git blame`
///
/// Every formatting edit is attributed to the commit that last touched the
/// lines it changes, and the edits of each original author are committed
/// separately under that author's name. `git blame` keeps pointing at the
/// people who wrote the code instead of at one bulk reformat commit.
///
/// Edits to files with no history (untracked or never committed) go into a
/// final commit under the fallback author.
///
/// EXAMPLES:
///
///   # Preview which files would change
///   blamefmt --dry-run
///
///   # Reformat src/ with 8 workers, skipping vendored code
///   blamefmt --path src -j 8 --exclude third_party --exclude 'gen/*'
///
///   # Rewrite the files but leave committing to you
///   blamefmt --no-commit
#[derive(Parser)]
#[command(name = "blamefmt")]
#[command(version, about)]
struct Cli {
    /// Git repository to work in (default: discovered from --path or the
    /// current directory)
    #[arg(long, value_name = "DIR")]
    repo: Option<PathBuf>,

    /// File or directory to format (default: the repository root)
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Path or glob to leave alone; repeatable
    #[arg(long, value_name = "PATH|GLOB")]
    exclude: Vec<String>,

    /// Worker threads for generating edits (default: available cores)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Skip files larger than this many KiB
    #[arg(long, value_name = "KB")]
    limit: Option<u64>,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Rewrite files but do not commit
    #[arg(short = 'n', long)]
    no_commit: bool,

    /// Author of the commit holding unattributed edits
    #[arg(long, value_name = "NAME <EMAIL>")]
    author: Option<Author>,

    /// Copyright banner for files that have none
    #[arg(long, value_name = "TEXT", conflicts_with = "copyright_file")]
    copyright: Option<String>,

    /// Read the copyright banner from a file
    #[arg(long, value_name = "FILE")]
    copyright_file: Option<PathBuf>,

    /// clang-format style (passed as --style=)
    #[arg(long)]
    style: Option<String>,

    /// Configuration file (default: <repo>/.blamefmt.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Hide the progress bar and non-error diagnostics
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.quiet);
    let started = Instant::now();

    let cwd = std::env::current_dir().context("could not read current directory")?;
    let cwd = cwd.canonicalize().unwrap_or(cwd);
    let target = cli.path.as_deref().map_or_else(|| cwd.clone(), |p| cwd.join(p));
    let repo = open_repo(cli.repo.as_deref(), &target)?;

    let config_path = cli.config.clone().unwrap_or_else(|| {
        repo.as_ref()
            .map_or_else(|| cwd.clone(), |r| r.workdir().to_owned())
            .join(CONFIG_FILE)
    });
    let config = BlamefmtConfig::load(&config_path)?;

    let formatter = ClangFormat::new(
        &config.format.command,
        cli.style.as_deref().unwrap_or(&config.format.style),
    );
    let version = formatter
        .version()
        .with_context(|| format!("`{}` is required", config.format.command))?;
    tracing::debug!(%version, "formatter");

    let root = match (&cli.path, &repo) {
        (None, Some(repo)) => repo.workdir().to_owned(),
        _ => target
            .canonicalize()
            .with_context(|| format!("no such path: {}", target.display()))?,
    };
    let excludes = cli
        .exclude
        .iter()
        .map(|raw| Exclude::parse(raw, &cwd).with_context(|| format!("bad --exclude: {raw}")))
        .collect::<Result<Vec<_>>>()?;
    let files = discover(&root, &excludes, |p| config.wants(p));

    let options = run_options(&cli, &config, repo.as_ref())?;
    let summary = pipeline::run(
        repo.as_ref().map(|r| r as &dyn GitRepo),
        &formatter,
        &files,
        &options,
    )?;

    report(&summary, options.mode, started);
    Ok(())
}

fn open_repo(explicit: Option<&Path>, target: &Path) -> Result<Option<GixRepo>> {
    if let Some(dir) = explicit {
        let repo = GixRepo::discover(dir)
            .with_context(|| format!("{} is not a git repository", dir.display()))?;
        return Ok(Some(repo));
    }
    let start = if target.is_file() {
        target.parent().unwrap_or(target)
    } else {
        target
    };
    match GixRepo::discover(start) {
        Ok(repo) => Ok(Some(repo)),
        Err(e) => {
            tracing::warn!(error = %e, "not inside a git repository, formatting without commits");
            Ok(None)
        }
    }
}

fn run_options(cli: &Cli, config: &BlamefmtConfig, repo: Option<&GixRepo>) -> Result<RunOptions> {
    let mode = if cli.dry_run {
        Mode::DryRun
    } else if cli.no_commit {
        Mode::NoCommit
    } else {
        Mode::Commit
    };

    let copyright = match (&cli.copyright, &cli.copyright_file) {
        (Some(text), _) => Some(text.clone().into_bytes()),
        (None, Some(file)) => Some(
            std::fs::read(file)
                .with_context(|| format!("could not read copyright file {}", file.display()))?,
        ),
        (None, None) => config.format.copyright.clone().map(String::into_bytes),
    };

    let fallback_author = match (&cli.author, &config.commit.fallback_author) {
        (Some(author), _) | (None, Some(author)) => Some(author.clone()),
        (None, None) => repo.and_then(configured_identity),
    };

    let jobs = match cli.jobs {
        Some(0) => bail!("--jobs must be at least 1"),
        Some(n) => n,
        None => std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
    };

    Ok(RunOptions {
        mode,
        jobs,
        show_progress: !cli.quiet,
        generate: GenerateOptions {
            max_file_bytes: cli
                .limit
                .unwrap_or(config.format.max_file_kb)
                .saturating_mul(1024),
            copyright,
        },
        commit: CommitOptions {
            message: config.commit.message.clone(),
            unattributed_message: config.commit.unattributed_message.clone(),
            fallback_author,
        },
    })
}

/// `user.name` / `user.email` from git config, when both are set.
fn configured_identity(repo: &GixRepo) -> Option<Author> {
    let name = repo.read_config("user.name").ok().flatten()?;
    let email = repo.read_config("user.email").ok().flatten()?;
    Some(Author::new(name, email))
}

fn report(summary: &RunSummary, mode: Mode, started: Instant) {
    if mode == Mode::DryRun {
        for path in &summary.formatted {
            println!("{}", path.display());
        }
    }
    if let Some(applied) = &summary.applied {
        for group in applied.groups.iter().filter(|g| g.commit.is_some()) {
            let who = group
                .author
                .as_ref()
                .map_or_else(|| "configured user".to_owned(), ToString::to_string);
            println!(
                "{} {who}: {} edit(s) in {} file(s)",
                group.commit.map(|c| c.short()).unwrap_or_default(),
                group.edits,
                group.files
            );
        }
    }

    let verb = if mode == Mode::DryRun {
        "can be formatted"
    } else {
        "formatted"
    };
    println!(
        "Time elapsed: {:.2}s. {} of {} file(s) {verb}.",
        started.elapsed().as_secs_f64(),
        summary.formatted.len(),
        summary.files
    );
    if summary.skipped > 0 {
        println!("{} file(s) skipped, see warnings above.", summary.skipped);
    }
}
