//! Dependency resolution against the names declared in one unit.

use std::collections::BTreeSet;

use declfix_types::decl::DeclarationBlock;

use crate::references::extract_references;

/// Fill `raw_references` from each block's body text, then resolve.
pub fn annotate_references(blocks: &mut [DeclarationBlock]) {
    for block in blocks.iter_mut() {
        block.raw_references = extract_references(block.body());
    }
    resolve_references(blocks);
}

/// Restrict raw references to declared names and flag self-reference.
///
/// Needs the full declared-name set, so it runs only once every block is known.
pub fn resolve_references(blocks: &mut [DeclarationBlock]) {
    let declared: BTreeSet<String> = blocks.iter().map(|b| b.name.clone()).collect();

    for block in blocks.iter_mut() {
        block.self_referencing = block.raw_references.contains(&block.name);
        block.resolved_references = block
            .raw_references
            .iter()
            .filter(|r| **r != block.name && declared.contains(*r))
            .cloned()
            .collect();
    }
}
