//! Error types for declfix-domain.
//!
//! Text anomalies in a source file are never errors here; they degrade to omitted references
//! or retained blocks. Only caller-supplied configuration can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// No strategy is registered under the requested key.
    #[error("unknown reorder strategy '{key}' (available: {available})")]
    UnknownStrategy { key: String, available: String },

    /// A caller-supplied pattern cannot be embedded in a generated annotation.
    #[error("invalid version pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
