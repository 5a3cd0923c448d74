use std::collections::HashMap;

use declfix_types::report::{BlockMove, UnitSummary};
use tracing::{debug, info, warn};

use crate::constraint::VersionConstraint;
use crate::dedup::{DEFAULT_BINARY_TYPE, collapse_duplicates};
use crate::error::DomainError;
use crate::forward::forward_declarations;
use crate::parser::{parse_source, render_source};
use crate::reorder::{
    DEFAULT_MAX_PASSES, DEFAULT_STRATEGY, ReorderLimits, ReorderStrategy, builtin_strategies,
};
use crate::resolver::annotate_references;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    pub strategy: String,
    pub max_passes: u64,
    /// `None` leaves version fields untouched.
    pub version: Option<VersionConstraint>,
    /// `None` keeps every declaration, including the binary alias.
    pub binary_type: Option<String>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
            max_passes: DEFAULT_MAX_PASSES,
            version: Some(VersionConstraint::default()),
            binary_type: Some(DEFAULT_BINARY_TYPE.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub text: String,
    pub changed: bool,
    pub summary: UnitSummary,
}

/// Runs the per-file pipeline with one resolved strategy.
pub struct Processor {
    strategy: Box<dyn ReorderStrategy>,
    limits: ReorderLimits,
    version: Option<VersionConstraint>,
    binary_type: Option<String>,
}

impl Processor {
    pub fn new(config: &ProcessConfig) -> Result<Self, DomainError> {
        let strategy = builtin_strategies().create(&config.strategy)?;
        Ok(Self::with_strategy(strategy, config))
    }

    pub fn with_strategy(strategy: Box<dyn ReorderStrategy>, config: &ProcessConfig) -> Self {
        Self {
            strategy,
            limits: ReorderLimits {
                max_passes: config.max_passes,
            },
            version: config.version.clone(),
            binary_type: config.binary_type.clone(),
        }
    }

    pub fn strategy_key(&self) -> &'static str {
        self.strategy.meta().key
    }

    pub fn process(&self, text: &str) -> ProcessOutcome {
        let mut unit = parse_source(text);
        let blocks_in = unit.blocks.len() as u64;

        if unit.declared_names().len() != unit.blocks.len() {
            warn!("declaration names are not unique; first occurrence wins for lookups");
        }
        if !unit.stale_forward_refs.is_empty() {
            debug!(
                count = unit.stale_forward_refs.len(),
                "discarding stale forward declarations"
            );
        }

        let mut constrained = Vec::new();
        if let Some(version) = &self.version {
            for block in unit.blocks.iter_mut() {
                if version.apply(block) {
                    constrained.push(block.name.clone());
                }
            }
        }

        let collapse = collapse_duplicates(&mut unit.blocks, self.binary_type.as_deref());
        annotate_references(&mut unit.blocks);

        let before: HashMap<String, usize> = unit
            .blocks
            .iter()
            .enumerate()
            .map(|(idx, b)| (b.name.clone(), idx))
            .collect();
        let stats = self.strategy.reorder(&mut unit.blocks, &self.limits);
        let moves: Vec<BlockMove> = unit
            .blocks
            .iter()
            .enumerate()
            .filter_map(|(to, b)| {
                let from = before.get(&b.name).copied()?;
                (from != to).then(|| BlockMove {
                    name: b.name.clone(),
                    from,
                    to,
                })
            })
            .collect();

        let forward_refs = forward_declarations(&unit.blocks);
        let rendered = render_source(&unit, &forward_refs);
        let changed = rendered != text;

        info!(
            strategy = self.strategy_key(),
            blocks = unit.blocks.len(),
            collapsed = collapse.collapsed.len(),
            moved = moves.len(),
            forward_refs = forward_refs.len(),
            passes = stats.passes,
            converged = stats.converged,
            changed,
            "processed source unit"
        );

        ProcessOutcome {
            text: rendered,
            changed,
            summary: UnitSummary {
                strategy: self.strategy_key().to_string(),
                blocks_in,
                blocks_out: unit.blocks.len() as u64,
                collapsed: collapse.collapsed,
                dropped: collapse.dropped,
                constrained,
                moves,
                forward_refs,
                passes: stats.passes,
                converged: stats.converged,
            },
        }
    }
}

/// Process one file's text with a freshly resolved strategy.
pub fn process_source(text: &str, config: &ProcessConfig) -> Result<ProcessOutcome, DomainError> {
    Ok(Processor::new(config)?.process(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "from pydantic import BaseModel, constr\n\n\n";

    fn config(strategy: &str) -> ProcessConfig {
        ProcessConfig {
            strategy: strategy.to_string(),
            ..ProcessConfig::default()
        }
    }

    #[test]
    fn dependency_is_hoisted_and_move_recorded() {
        let input = format!(
            "{HEADER}class A(BaseModel):\n    b: B\n\n\nclass B(BaseModel):\n    x: str\n\n\nclass C(BaseModel):\n    a: A\n"
        );
        let outcome = process_source(&input, &ProcessConfig::default()).expect("process");

        let expected = format!(
            "{HEADER}class B(BaseModel):\n    x: str\n\n\nclass A(BaseModel):\n    b: B\n\n\nclass C(BaseModel):\n    a: A\n"
        );
        assert_eq!(outcome.text, expected);
        assert!(outcome.changed);
        assert!(outcome.summary.forward_refs.is_empty());
        assert!(outcome.summary.converged);
        assert_eq!(
            outcome.summary.moves,
            vec![
                BlockMove {
                    name: "B".into(),
                    from: 1,
                    to: 0
                },
                BlockMove {
                    name: "A".into(),
                    from: 0,
                    to: 1
                },
            ]
        );
    }

    #[test]
    fn ordered_input_is_unchanged() {
        let input = format!(
            "{HEADER}class B(BaseModel):\n    x: str\n\n\nclass A(BaseModel):\n    b: B\n"
        );
        for key in ["window", "scc"] {
            let outcome = process_source(&input, &config(key)).expect("process");
            assert!(!outcome.changed, "{key}");
            assert_eq!(outcome.text, input);
        }
    }

    #[test]
    fn self_reference_gets_forward_statement_once() {
        let input = format!(
            "{HEADER}class Part(BaseModel):\n    parts: Optional[List[Part]] = None\n"
        );
        let first = process_source(&input, &ProcessConfig::default()).expect("process");
        assert_eq!(
            first.text,
            format!(
                "{HEADER}class Part(BaseModel):\n    parts: Optional[List[Part]] = None\n\n\nPart.update_forward_refs()\n"
            )
        );

        let second = process_source(&first.text, &ProcessConfig::default()).expect("process");
        assert!(!second.changed);
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn duplicates_collapse_before_ordering() {
        let input = format!(
            "{HEADER}class Link1(BaseModel):\n    href: str\n\n\nclass Link(BaseModel):\n    href: str\n\n\nclass User(BaseModel):\n    link: Link1\n"
        );
        let outcome = process_source(&input, &ProcessConfig::default()).expect("process");

        assert_eq!(
            outcome.text,
            format!(
                "{HEADER}class Link(BaseModel):\n    href: str\n\n\nclass User(BaseModel):\n    link: Link\n"
            )
        );
        assert_eq!(outcome.summary.blocks_in, 3);
        assert_eq!(outcome.summary.blocks_out, 2);
    }

    #[test]
    fn duplicate_in_final_position_collapses() {
        let input = format!(
            "{HEADER}class User(BaseModel):\n    b: Base1\n\n\nclass Base(BaseModel):\n    l1: str\n    l2: int\n\n\nclass Base1(BaseModel):\n    l1: str\n    l2: int\n"
        );
        let outcome = process_source(&input, &ProcessConfig::default()).expect("process");

        assert_eq!(
            outcome.text,
            format!(
                "{HEADER}class Base(BaseModel):\n    l1: str\n    l2: int\n\n\nclass User(BaseModel):\n    b: Base\n"
            )
        );
        assert_eq!(outcome.summary.collapsed.len(), 1);
        assert_eq!(outcome.summary.blocks_out, 2);
    }

    #[test]
    fn hoisted_final_block_keeps_separators() {
        let input = format!("{HEADER}class A(BaseModel):\n    b: B\n\n\nclass B(BaseModel):\n    x: str\n");
        for key in ["window", "scc"] {
            let outcome = process_source(&input, &config(key)).expect("process");
            assert_eq!(
                outcome.text,
                format!("{HEADER}class B(BaseModel):\n    x: str\n\n\nclass A(BaseModel):\n    b: B\n"),
                "{key}"
            );
        }
    }

    #[test]
    fn crlf_line_endings_are_preserved() {
        let input = format!("{HEADER}class A(BaseModel):\n    b: B\n\n\nclass B(BaseModel):\n    x: str\n")
            .replace('\n', "\r\n");
        let outcome = process_source(&input, &ProcessConfig::default()).expect("process");

        assert_eq!(
            outcome.text,
            format!("{HEADER}class B(BaseModel):\n    x: str\n\n\nclass A(BaseModel):\n    b: B\n")
                .replace('\n', "\r\n")
        );
        let again = process_source(&outcome.text, &ProcessConfig::default()).expect("process");
        assert!(!again.changed);
    }

    #[test]
    fn version_field_is_constrained() {
        let input = format!(
            "{HEADER}class Metadata(BaseModel):\n    oscal_version: str = Field(..., alias='oscal-version')\n"
        );
        let outcome = process_source(&input, &ProcessConfig::default()).expect("process");
        assert!(outcome.text.contains(
            "    oscal_version: constr(regex=r'^1\\.[0-9]+\\.[0-9]+$') = Field(..., alias='oscal-version')\n"
        ));
        assert_eq!(outcome.summary.constrained, vec!["Metadata"]);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = process_source("", &config("topo")).err().expect("must fail");
        assert!(matches!(err, DomainError::UnknownStrategy { .. }));
    }

    #[test]
    fn empty_input_stays_empty() {
        let outcome = process_source("", &ProcessConfig::default()).expect("process");
        assert_eq!(outcome.text, "");
        assert!(!outcome.changed);
    }
}
