//! Embeddable core library for declfix.
//!
//! Provides a clap-free, I/O-abstracted entry point that rewrites a directory of generated
//! model files.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`SourceRepo`](ports::SourceRepo) - list and read generated sources
//! - [`WritePort`](ports::WritePort) - write files and create directories
//!
//! The [`adapters`] module provides filesystem-backed and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run`](pipeline::run) - process every selected file and build the report + patch
//! - [`write_artifacts`](pipeline::write_artifacts) - persist report and patch

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export the domain config so callers don't need declfix-domain directly.
pub use declfix_domain::{ProcessConfig, VersionConstraint};
pub use declfix_types::report::RunMode;
