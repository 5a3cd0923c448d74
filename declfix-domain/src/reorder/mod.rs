//! Reordering strategies and the registry that selects between them.
//!
//! Each strategy permutes a block list in place. Neither adds nor removes blocks; the
//! forward-reference pass afterwards covers whatever ordering the strategy settles on.

mod scc;
mod window;

use std::collections::{BTreeMap, HashMap};

use declfix_types::decl::{DeclarationBlock, DependencyWindow};

use crate::error::DomainError;

pub use scc::SccStrategy;
pub use window::WindowStrategy;

pub const DEFAULT_MAX_PASSES: u64 = 1000;
pub const DEFAULT_STRATEGY: &str = "window";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderLimits {
    /// Upper bound on repair passes before accepting a best-effort order.
    pub max_passes: u64,
}

impl Default for ReorderLimits {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReorderStats {
    pub passes: u64,
    pub converged: bool,
    pub relocations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyMeta {
    pub key: &'static str,
    pub description: &'static str,
    /// Whether the strategy always terminates with every acyclic dependency satisfied.
    pub converges: bool,
}

pub trait ReorderStrategy: Send + Sync {
    fn meta(&self) -> StrategyMeta;

    fn reorder(&self, blocks: &mut Vec<DeclarationBlock>, limits: &ReorderLimits) -> ReorderStats;
}

type StrategyFactory = fn() -> Box<dyn ReorderStrategy>;

/// Strategies by key. Iteration is in key order.
#[derive(Default)]
pub struct StrategyRegistry {
    factories: BTreeMap<&'static str, (StrategyMeta, StrategyFactory)>,
}

impl StrategyRegistry {
    pub fn register(&mut self, factory: StrategyFactory) {
        let meta = factory().meta();
        self.factories.insert(meta.key, (meta, factory));
    }

    pub fn create(&self, key: &str) -> Result<Box<dyn ReorderStrategy>, DomainError> {
        self.factories
            .get(key)
            .map(|(_, factory)| factory())
            .ok_or_else(|| DomainError::UnknownStrategy {
                key: key.to_string(),
                available: self.keys().join(", "),
            })
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    pub fn metas(&self) -> Vec<StrategyMeta> {
        self.factories.values().map(|(meta, _)| *meta).collect()
    }
}

pub fn builtin_strategies() -> StrategyRegistry {
    let mut registry = StrategyRegistry::default();
    registry.register(|| Box::new(WindowStrategy));
    registry.register(|| Box::new(SccStrategy));
    registry
}

/// Name to current index. The first occurrence wins if a name is repeated.
pub(crate) fn index_by_name(blocks: &[DeclarationBlock]) -> HashMap<&str, usize> {
    let mut out = HashMap::with_capacity(blocks.len());
    for (idx, block) in blocks.iter().enumerate() {
        out.entry(block.name.as_str()).or_insert(idx);
    }
    out
}

/// Compute every block's window under the current ordering.
pub fn dependency_windows(blocks: &[DeclarationBlock]) -> Vec<DependencyWindow> {
    let Some(last_index) = blocks.len().checked_sub(1) else {
        return Vec::new();
    };
    let positions = index_by_name(blocks);

    let mut first_dependent: HashMap<&str, usize> = HashMap::new();
    for (idx, block) in blocks.iter().enumerate() {
        for name in &block.resolved_references {
            first_dependent.entry(name.as_str()).or_insert(idx);
        }
    }

    blocks
        .iter()
        .map(|block| DependencyWindow {
            earliest_dependent: first_dependent
                .get(block.name.as_str())
                .copied()
                .unwrap_or(last_index),
            latest_dependency: block
                .resolved_references
                .iter()
                .filter_map(|r| positions.get(r.as_str()).copied())
                .max()
                .unwrap_or(0),
        })
        .collect()
}
