//! Git abstraction layer for blamefmt.
//!
//! This crate defines the [`GitRepo`] trait, the single interface through
//! which the formatting engine talks to git. The engine never imports gix or
//! shells out to git itself; it depends on `blamefmt-git` and programs against
//! the trait, which keeps blame snapshots and commits swappable in tests.
//!
//! # Crate layout
//!
//! - [`repo`]: the [`GitRepo`] trait definition.
//! - [`types`]: value types used in trait signatures ([`GitOid`], [`Author`],
//!   [`BlameHunk`]).
//! - [`error`]: the [`GitError`] enum returned by all trait methods.

pub mod error;
pub mod repo;
pub mod types;

// gix/CLI-backed implementation modules
mod blame_impl;
mod cli;
mod commit_impl;
mod config_impl;
mod gix_repo;
mod index_impl;
mod refs_impl;

pub use gix_repo::GixRepo;

// Re-export the main trait and commonly used types at the crate root for
// ergonomic imports: `use blamefmt_git::{GitRepo, GitOid, GitError};`
pub use error::GitError;
pub use repo::GitRepo;
pub use types::{Author, AuthorParseError, BlameHunk, GitOid, OidParseError};
