//! Finding the files a run should format.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A `--exclude` entry: a path prefix or a glob.
#[derive(Clone, Debug)]
pub enum Exclude {
    Path(PathBuf),
    Glob(glob::Pattern),
}

impl Exclude {
    /// Relative paths and globs are anchored at `base`; absolute ones are
    /// taken as given.
    ///
    /// # Errors
    /// Returns the pattern error if `raw` looks like a glob but does not parse.
    pub fn parse(raw: &str, base: &Path) -> Result<Self, glob::PatternError> {
        if Path::new(raw).is_absolute() && raw.contains(['*', '?', '[']) {
            glob::Pattern::new(raw).map(Self::Glob)
        } else if raw.contains(['*', '?', '[']) {
            let base = glob::Pattern::escape(&base.to_string_lossy());
            glob::Pattern::new(&format!("{base}/{raw}")).map(Self::Glob)
        } else {
            Ok(Self::Path(base.join(raw)))
        }
    }

    fn matches(&self, path: &Path) -> bool {
        match self {
            Self::Path(prefix) => path.starts_with(prefix),
            Self::Glob(pattern) => pattern.matches_path(path),
        }
    }
}

/// Collect files under `root` accepted by `wanted`, pruning `.git` and every
/// entry matched by `excludes`. A `root` that is itself a file is returned
/// as-is. Results are sorted.
pub fn discover(root: &Path, excludes: &[Exclude], wanted: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_owned()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            let path = entry.path();
            if entry.file_type().is_dir() && entry.file_name() == ".git" {
                return false;
            }
            if excludes.iter().any(|e| e.matches(path)) {
                tracing::debug!(path = %path.display(), "excluded");
                return false;
            }
            true
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && wanted(entry.path()))
        .map(walkdir::DirEntry::into_path)
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for rel in [
            "src/a.c",
            "src/b.h",
            "src/readme.txt",
            "third_party/zlib/z.c",
            "build/gen/out.c",
            ".git/objects/x.c",
            "tests/t.c",
        ] {
            let p = dir.path().join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, "x\n").unwrap();
        }
        dir
    }

    fn c_or_h(path: &Path) -> bool {
        matches!(path.extension().and_then(|e| e.to_str()), Some("c" | "h"))
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .into_iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn walks_sorted_and_prunes_git() {
        let dir = tree();
        let files = discover(dir.path(), &[], c_or_h);
        assert_eq!(
            relative(dir.path(), files),
            ["build/gen/out.c", "src/a.c", "src/b.h", "tests/t.c", "third_party/zlib/z.c"]
        );
    }

    #[test]
    fn excludes_paths_and_globs() {
        let dir = tree();
        let excludes = [
            Exclude::parse("third_party", dir.path()).unwrap(),
            Exclude::parse("build/*", dir.path()).unwrap(),
            Exclude::parse("**/*.h", dir.path()).unwrap(),
        ];
        assert!(matches!(excludes[0], Exclude::Path(_)));
        assert!(matches!(excludes[1], Exclude::Glob(_)));

        let files = discover(dir.path(), &excludes, c_or_h);
        assert_eq!(relative(dir.path(), files), ["src/a.c", "tests/t.c"]);
    }

    #[test]
    fn single_file_root_is_returned_as_is() {
        let dir = tree();
        let file = dir.path().join("src/readme.txt");
        assert_eq!(discover(&file, &[], c_or_h), vec![file]);
    }

    #[test]
    fn bad_glob_is_rejected() {
        assert!(Exclude::parse("src/[", Path::new("/repo")).is_err());
    }
}
