//! Shared DTOs for the declfix workspace.
//!
//! # Design constraints
//! - Declaration types are in-memory only; they never hit disk directly.
//! - Report types are serialized to disk. Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod decl;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const DECLFIX_REPORT_V1: &str = "declfix.report.v1";
}
