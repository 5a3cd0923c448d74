//! Domain logic: turn one generated model file into a dependency-ordered one.
//!
//! This crate owns *what* the rewritten file looks like. It does not own file discovery,
//! reading or writing; that's the `declfix-core` crate.
//!
//! Per file the [`Processor`] runs: parse, version-constraint rewrite, duplicate collapse,
//! reference extraction, dependency resolution, reordering, forward-reference synthesis,
//! render.

mod constraint;
mod dedup;
mod error;
mod forward;
mod parser;
mod processor;
mod references;
pub mod reorder;
mod resolver;

pub use constraint::{DEFAULT_VERSION_FIELD, DEFAULT_VERSION_PATTERN, VersionConstraint};
pub use dedup::{CollapseSummary, DEFAULT_BINARY_TYPE, collapse_duplicates};
pub use error::DomainError;
pub use forward::forward_declarations;
pub use parser::{
    CLASS_MARKER, declaration_name, forward_ref_statement, is_forward_ref_line, parse_source,
    render_source,
};
pub use processor::{ProcessConfig, ProcessOutcome, Processor, process_source};
pub use references::{extract_references, references_in_line};
pub use reorder::{
    DEFAULT_MAX_PASSES, DEFAULT_STRATEGY, ReorderLimits, ReorderStats, ReorderStrategy,
    SccStrategy, StrategyMeta, StrategyRegistry, WindowStrategy, builtin_strategies,
    dependency_windows,
};
pub use resolver::{annotate_references, resolve_references};
