//! blamefmt library crate.
//!
//! The primary interface is the `blamefmt` binary. This lib.rs exposes the
//! replacement engine, attribution, and pipeline so that integration tests
//! can drive a run against a scratch repository without going through the
//! CLI.

pub mod attribution;
pub mod config;
pub mod discover;
pub mod error;
pub mod formatter;
pub mod pipeline;
pub mod progress;
pub mod replace;
pub mod telemetry;
