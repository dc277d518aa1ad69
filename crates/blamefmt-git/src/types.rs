//! Core types for the blamefmt git abstraction layer.
//!
//! These types form the vocabulary shared between the [`GitRepo`](crate::GitRepo) trait and
//! the formatting engine. They contain no gix or CLI types;
//! the backend is an implementation detail.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// GitOid
// ---------------------------------------------------------------------------

/// A git object identifier (SHA-1, 20 bytes).
///
/// Stored as raw bytes for efficient comparison, hashing, and Copy semantics.
/// Displays as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GitOid([u8; 20]);

impl GitOid {
    /// Create a `GitOid` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// The abbreviated (12 hex characters) form used in log lines.
    #[must_use]
    pub fn short(&self) -> String {
        let mut full = self.to_string();
        full.truncate(12);
        full
    }
}

impl fmt::Display for GitOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for GitOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GitOid({self})")
    }
}

impl FromStr for GitOid {
    type Err = OidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40 {
            return Err(OidParseError {
                value: s.to_owned(),
                reason: format!("expected 40 hex characters, got {}", s.len()),
            });
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hi = hex_digit(chunk[0]).ok_or_else(|| OidParseError {
                value: s.to_owned(),
                reason: format!("invalid hex digit '{}'", chunk[0] as char),
            })?;
            let lo = hex_digit(chunk[1]).ok_or_else(|| OidParseError {
                value: s.to_owned(),
                reason: format!("invalid hex digit '{}'", chunk[1] as char),
            })?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

/// Error from parsing a hex string into a [`GitOid`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OidParseError {
    /// The raw value that failed.
    pub value: String,
    /// Why it failed.
    pub reason: String,
}

impl fmt::Display for OidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid OID {:?}: {}", self.value, self.reason)
    }
}

impl std::error::Error for OidParseError {}

const fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        // Accept uppercase for leniency during parsing
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Author
// ---------------------------------------------------------------------------

/// A commit author identity.
///
/// Compared structurally on `(name, email)`, so two commits by the same
/// person collapse to one map key regardless of where the value came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Author {
    /// Display name (`user.name`).
    pub name: String,
    /// Email address without angle brackets (`user.email`).
    pub email: String,
}

impl Author {
    /// Create an author from its parts.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// The `Name <email>` form accepted by `git commit --author`.
    #[must_use]
    pub fn ident(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

impl FromStr for Author {
    type Err = AuthorParseError;

    /// Parse `Name <email>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| AuthorParseError {
            value: s.to_owned(),
            reason: reason.to_owned(),
        };
        let trimmed = s.trim();
        let open = trimmed
            .find('<')
            .ok_or_else(|| err("expected `Name <email>`"))?;
        let rest = trimmed
            .strip_suffix('>')
            .ok_or_else(|| err("email must be closed with `>`"))?;
        let name = trimmed[..open].trim();
        if name.is_empty() {
            return Err(err("name must not be empty"));
        }
        let email = rest[open + 1..].trim();
        if email.contains(['<', '>']) {
            return Err(err("email must not contain angle brackets"));
        }
        Ok(Self::new(name, email))
    }
}

/// Error from parsing an [`Author`] identity string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorParseError {
    /// The raw value that failed.
    pub value: String,
    /// Why it failed.
    pub reason: String,
}

impl fmt::Display for AuthorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid author {:?}: {}", self.value, self.reason)
    }
}

impl std::error::Error for AuthorParseError {}

// ---------------------------------------------------------------------------
// BlameHunk
// ---------------------------------------------------------------------------

/// A run of contiguous lines that `git blame` attributes to one commit.
///
/// A file's hunks, in order, cover every line of the file at the blamed
/// revision exactly once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlameHunk {
    /// The commit that last touched these lines.
    pub commit: GitOid,
    /// Author of `commit`.
    pub author: Author,
    /// First line of the run in the blamed file (1-based).
    pub start_line: u32,
    /// Number of lines in the run (at least 1).
    pub line_count: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- GitOid --

    #[test]
    fn oid_roundtrip_hex() {
        let hex = "0123456789abcdef0123456789abcdef01234567";
        let oid: GitOid = hex.parse().unwrap();
        assert_eq!(oid.to_string(), hex);
        assert_eq!(oid.short(), "0123456789ab");
    }

    #[test]
    fn oid_from_bytes_displays_as_hex() {
        let oid = GitOid::from_bytes([0xab; 20]);
        assert_eq!(oid.to_string(), "ab".repeat(20));
        assert_eq!(oid.as_bytes(), &[0xab; 20]);
    }

    #[test]
    fn oid_rejects_short() {
        assert!("abc".parse::<GitOid>().is_err());
    }

    #[test]
    fn oid_rejects_non_hex() {
        let bad = "g".repeat(40);
        assert!(bad.parse::<GitOid>().is_err());
    }

    // -- Author --

    #[test]
    fn author_parses_ident() {
        let a: Author = "Alice Liddell <alice@example.com>".parse().unwrap();
        assert_eq!(a, Author::new("Alice Liddell", "alice@example.com"));
        assert_eq!(a.ident(), "Alice Liddell <alice@example.com>");
    }

    #[test]
    fn author_allows_empty_email() {
        let a: Author = "bot <>".parse().unwrap();
        assert_eq!(a.email, "");
    }

    #[test]
    fn author_rejects_missing_brackets() {
        assert!("alice".parse::<Author>().is_err());
        assert!("alice <alice@example.com".parse::<Author>().is_err());
        assert!(" <alice@example.com>".parse::<Author>().is_err());
    }

    #[test]
    fn author_equality_is_structural() {
        let a = Author::new("Alice", "a@x");
        let b: Author = "Alice <a@x>".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Author::new("Alice", "alice@y"));
    }
}
