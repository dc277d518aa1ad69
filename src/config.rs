//! Repository configuration (`.blamefmt.toml`).
//!
//! Defines the formatter invocation, which files are eligible, and how the
//! synthetic commits are labelled. Every field has a default, and command
//! line flags override whatever the file says.

use std::fmt;
use std::path::{Path, PathBuf};

use blamefmt_git::Author;
use serde::{Deserialize, Deserializer};

/// File name looked up at the repository root.
pub const CONFIG_FILE: &str = ".blamefmt.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
///
/// Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlamefmtConfig {
    #[serde(default)]
    pub format: FormatConfig,

    #[serde(default)]
    pub commit: CommitConfig,
}

// ---------------------------------------------------------------------------
// FormatConfig
// ---------------------------------------------------------------------------

/// Formatter invocation and file eligibility.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatConfig {
    /// Formatter executable (default: `"clang-format"`).
    #[serde(default = "default_command")]
    pub command: String,

    /// Value passed as `--style=` (default: `"file"`).
    #[serde(default = "default_style")]
    pub style: String,

    /// File extensions to format, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Files larger than this many KiB are skipped.
    #[serde(default = "default_max_file_kb")]
    pub max_file_kb: u64,

    /// Banner inserted at the top of files that carry no copyright notice.
    #[serde(default)]
    pub copyright: Option<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            style: default_style(),
            extensions: default_extensions(),
            max_file_kb: default_max_file_kb(),
            copyright: None,
        }
    }
}

fn default_command() -> String {
    "clang-format".to_owned()
}

fn default_style() -> String {
    "file".to_owned()
}

fn default_extensions() -> Vec<String> {
    ["c", "cc", "cpp", "cxx", "h", "hh", "hpp"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

const fn default_max_file_kb() -> u64 {
    256
}

// ---------------------------------------------------------------------------
// CommitConfig
// ---------------------------------------------------------------------------

/// Labels for the commits a run creates.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitConfig {
    /// Message of every per-author commit.
    #[serde(default = "default_message")]
    pub message: String,

    /// Message of the commit holding edits to files without history.
    #[serde(default = "default_unattributed_message")]
    pub unattributed_message: String,

    /// Author of that commit, as `Name <email>`. Defaults to git's
    /// configured identity.
    #[serde(default, deserialize_with = "deserialize_author")]
    pub fallback_author: Option<Author>,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            message: default_message(),
            unattributed_message: default_unattributed_message(),
            fallback_author: None,
        }
    }
}

fn default_message() -> String {
    "blamefmt: reformat and keep blame info".to_owned()
}

fn default_unattributed_message() -> String {
    "blamefmt: format uncommitted code".to_owned()
}

fn deserialize_author<'de, D>(deserializer: D) -> Result<Option<Author>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map(Some).map_err(serde::de::Error::custom)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl BlamefmtConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found), invalid
    /// TOML, unknown fields, or a malformed author.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start].matches('\n').count() + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }

    /// Whether `path` has one of the configured extensions.
    #[must_use]
    pub fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.format.extensions.iter().any(|e| e == ext))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
