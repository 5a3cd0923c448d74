//! Component-wise topological reordering.
//!
//! Blocks are grouped into strongly connected components (Tarjan), then components are
//! emitted in dependency order (Kahn). Ties go to the component holding the earliest
//! original position, so an already-valid order comes back unchanged. Blocks within one
//! component keep their original relative order; the forward-reference pass covers them.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use declfix_types::decl::DeclarationBlock;
use tracing::debug;

use super::{ReorderLimits, ReorderStats, ReorderStrategy, StrategyMeta, index_by_name};

#[derive(Debug, Default, Clone, Copy)]
pub struct SccStrategy;

impl ReorderStrategy for SccStrategy {
    fn meta(&self) -> StrategyMeta {
        StrategyMeta {
            key: "scc",
            description: "Topological order over strongly connected components; always converges",
            converges: true,
        }
    }

    fn reorder(&self, blocks: &mut Vec<DeclarationBlock>, _limits: &ReorderLimits) -> ReorderStats {
        let deps = dependency_edges(blocks);
        let components = strongly_connected(&deps);
        let order = component_order(&deps, &components);

        let relocations = order
            .iter()
            .enumerate()
            .filter(|(new, old)| *new != **old)
            .count() as u64;
        debug!(blocks = blocks.len(), relocations, "component ordering computed");

        let mut slots: Vec<Option<DeclarationBlock>> = blocks.drain(..).map(Some).collect();
        blocks.extend(order.into_iter().filter_map(|idx| slots[idx].take()));

        ReorderStats {
            passes: 1,
            converged: true,
            relocations,
        }
    }
}

/// `deps[i]` holds the original indices block `i` depends on.
fn dependency_edges(blocks: &[DeclarationBlock]) -> Vec<Vec<usize>> {
    let positions = index_by_name(blocks);
    blocks
        .iter()
        .map(|b| {
            b.resolved_references
                .iter()
                .filter_map(|r| positions.get(r.as_str()).copied())
                .collect()
        })
        .collect()
}

/// Tarjan's algorithm with an explicit work stack. Returns component id per node.
fn strongly_connected(deps: &[Vec<usize>]) -> Vec<usize> {
    const UNVISITED: usize = usize::MAX;

    let n = deps.len();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut component = vec![UNVISITED; n];
    let mut next_index = 0;
    let mut next_component = 0;

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        // (node, next edge to inspect)
        let mut work: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(frame) = work.last_mut() {
            let v = frame.0;
            if let Some(&w) = deps[v].get(frame.1) {
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if lowlink[v] == index[v] {
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component[w] = next_component;
                    if w == v {
                        break;
                    }
                }
                next_component += 1;
            }
        }
    }

    component
}

/// Kahn over the condensation, smallest original position first.
fn component_order(deps: &[Vec<usize>], component: &[usize]) -> Vec<usize> {
    let count = component.iter().copied().max().map_or(0, |m| m + 1);

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (node, &c) in component.iter().enumerate() {
        members[c].push(node);
    }

    let mut dependents: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
    let mut pending: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
    for (node, targets) in deps.iter().enumerate() {
        let from = component[node];
        for &target in targets {
            let to = component[target];
            if from != to {
                pending[from].insert(to);
                dependents[to].insert(from);
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<(usize, usize)>> = (0..count)
        .filter(|&c| pending[c].is_empty())
        .map(|c| Reverse((members[c][0], c)))
        .collect();

    let mut order = Vec::with_capacity(component.len());
    while let Some(Reverse((_, c))) = ready.pop() {
        order.extend(members[c].iter().copied());
        for &dependent in &dependents[c] {
            pending[dependent].remove(&c);
            if pending[dependent].is_empty() {
                ready.push(Reverse((members[dependent][0], dependent)));
            }
        }
    }
    order
}
