//! Local-repair reordering over dependency windows.
//!
//! Keeps blocks close to their generated positions: only the first out-of-place block
//! triggers a move, and every move restarts the pass with fresh windows.

use declfix_types::decl::DeclarationBlock;
use tracing::{debug, warn};

use super::{ReorderLimits, ReorderStats, ReorderStrategy, StrategyMeta, dependency_windows};

#[derive(Debug, Default, Clone, Copy)]
pub struct WindowStrategy;

impl ReorderStrategy for WindowStrategy {
    fn meta(&self) -> StrategyMeta {
        StrategyMeta {
            key: "window",
            description: "Minimal local repair; keeps generated positions where dependencies allow",
            converges: false,
        }
    }

    fn reorder(&self, blocks: &mut Vec<DeclarationBlock>, limits: &ReorderLimits) -> ReorderStats {
        let mut stats = ReorderStats::default();

        while stats.passes < limits.max_passes {
            stats.passes += 1;

            let windows = dependency_windows(blocks);
            let pending = windows
                .iter()
                .enumerate()
                .find(|(i, w)| !w.contains(*i))
                .map(|(i, w)| (i, w.earliest_dependent));

            let Some((target, source)) = pending else {
                stats.converged = true;
                return stats;
            };

            let moved = blocks.remove(source);
            debug!(name = moved.name.as_str(), from = source, to = target, "relocate block");
            blocks.insert(target, moved);
            stats.relocations += 1;
        }

        // The final pass relocated something; re-check whether that settled the order.
        if dependency_windows(blocks)
            .iter()
            .enumerate()
            .all(|(i, w)| w.contains(i))
        {
            stats.converged = true;
        } else {
            warn!(
                passes = stats.passes,
                "reorder pass cap reached with relocations pending; keeping best-effort order"
            );
        }
        stats
    }
}
