//! Forward-reference synthesis from a final ordering.

use std::collections::BTreeSet;

use declfix_types::decl::DeclarationBlock;

use crate::reorder::dependency_windows;

/// Names that need a forward-declaration statement, sorted.
///
/// A name qualifies if its block refers to itself, or if some block depending on it still
/// sits at a lower index.
pub fn forward_declarations(blocks: &[DeclarationBlock]) -> Vec<String> {
    let windows = dependency_windows(blocks);
    let names: BTreeSet<&str> = blocks
        .iter()
        .zip(&windows)
        .enumerate()
        .filter(|(idx, (block, window))| block.self_referencing || window.earliest_dependent < *idx)
        .map(|(_, (block, _))| block.name.as_str())
        .collect();
    names.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(name: &str, refs: &[&str], self_ref: bool) -> DeclarationBlock {
        let mut b = DeclarationBlock::new(name, format!("class {name}(BaseModel):"));
        b.resolved_references = refs.iter().map(|r| r.to_string()).collect();
        b.self_referencing = self_ref;
        b
    }

    #[test]
    fn acyclic_order_needs_nothing() {
        let blocks = vec![block("B", &[], false), block("A", &["B"], false)];
        assert!(forward_declarations(&blocks).is_empty());
    }

    #[test]
    fn later_member_of_cycle_is_declared() {
        let blocks = vec![block("A", &["B"], false), block("B", &["A"], false)];
        assert_eq!(forward_declarations(&blocks), vec!["B"]);
    }

    #[test]
    fn self_reference_is_declared_and_output_is_sorted() {
        let blocks = vec![
            block("Zeta", &[], true),
            block("Part", &["Zeta"], true),
            block("Alpha", &[], false),
        ];
        assert_eq!(forward_declarations(&blocks), vec!["Part", "Zeta"]);
    }
}
