//! Duplicate collapse for numerically suffixed declarations.
//!
//! The generator emits `Link1`, `Link2`, ... when the same shape appears under several
//! schema paths. A suffixed block whose body matches its stripped-digit base is removed and
//! every mention of it is rewritten to the base name.

use std::collections::BTreeMap;

use declfix_types::decl::DeclarationBlock;
use declfix_types::report::CollapsedDuplicate;
use regex::Regex;
use tracing::debug;

pub const DEFAULT_BINARY_TYPE: &str = "Base64";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseSummary {
    /// Removed duplicates and the surviving base each one now points at.
    pub collapsed: Vec<CollapsedDuplicate>,
    /// Built-in alias declarations dropped unconditionally.
    pub dropped: Vec<String>,
}

/// Remove duplicate declarations and rewrite references to them.
///
/// `binary_type` names a built-in alias that is always dropped, duplicate or not.
pub fn collapse_duplicates(
    blocks: &mut Vec<DeclarationBlock>,
    binary_type: Option<&str>,
) -> CollapseSummary {
    let mut summary = CollapseSummary::default();

    if let Some(builtin) = binary_type {
        blocks.retain(|b| {
            if b.name == builtin {
                summary.dropped.push(b.name.clone());
                false
            } else {
                true
            }
        });
    }

    let duplicate_of = find_duplicates(blocks);
    if duplicate_of.is_empty() {
        return summary;
    }

    blocks.retain(|b| !duplicate_of.contains_key(&b.name));

    let rewrites: Vec<(Regex, String)> = duplicate_of
        .keys()
        .filter_map(|dup| {
            let base = surviving_base(dup, &duplicate_of);
            debug!(duplicate = dup.as_str(), base = base.as_str(), "collapse duplicate");
            summary.collapsed.push(CollapsedDuplicate {
                duplicate: dup.clone(),
                base: base.clone(),
            });
            word_pattern(dup).map(|re| (re, base))
        })
        .collect();

    for block in blocks.iter_mut() {
        for line in block.body_lines.iter_mut() {
            for (re, base) in &rewrites {
                if re.is_match(line) {
                    *line = re.replace_all(line, base.as_str()).into_owned();
                }
            }
        }
    }

    summary
}

/// Map each duplicate name to the base it duplicates (one stripped digit).
fn find_duplicates(blocks: &[DeclarationBlock]) -> BTreeMap<String, String> {
    let by_name: BTreeMap<&str, &DeclarationBlock> =
        blocks.iter().map(|b| (b.name.as_str(), b)).collect();

    let mut out = BTreeMap::new();
    for block in blocks {
        let Some(last) = block.name.chars().last() else {
            continue;
        };
        if !last.is_ascii_digit() {
            continue;
        }
        let base_name = &block.name[..block.name.len() - 1];
        let Some(base) = by_name.get(base_name) else {
            continue;
        };
        if base.body_lines.len() == block.body_lines.len() && base.body() == block.body() {
            out.insert(block.name.clone(), base_name.to_string());
        }
    }
    out
}

/// Follow `X12 -> X1 -> X` chains to a name that was not itself collapsed.
fn surviving_base(name: &str, duplicate_of: &BTreeMap<String, String>) -> String {
    let mut current = name;
    // Each hop strips one character, so the chain is bounded by the name length.
    while let Some(next) = duplicate_of.get(current) {
        current = next;
    }
    current.to_string()
}

fn word_pattern(name: &str) -> Option<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(name))).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(name: &str, body: &[&str]) -> DeclarationBlock {
        let mut b = DeclarationBlock::new(name, format!("class {name}(BaseModel):"));
        for line in body {
            b.push_line(*line);
        }
        b
    }

    fn names(blocks: &[DeclarationBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn identical_suffixed_block_is_collapsed_and_references_rewritten() {
        let mut blocks = vec![
            block("Base", &["    l1: str", "    l2: int"]),
            block("Base1", &["    l1: str", "    l2: int"]),
            block("User", &["    a: Base1", "    b: List[Base1]", "    c: Base10"]),
        ];
        let summary = collapse_duplicates(&mut blocks, None);

        assert_eq!(names(&blocks), vec!["Base", "User"]);
        assert_eq!(
            summary.collapsed,
            vec![CollapsedDuplicate {
                duplicate: "Base1".to_string(),
                base: "Base".to_string(),
            }]
        );
        assert_eq!(
            blocks[1].body_lines,
            vec![
                "class User(BaseModel):",
                "    a: Base",
                "    b: List[Base]",
                "    c: Base10",
            ]
        );
    }

    #[test]
    fn differing_bodies_are_not_duplicates() {
        let mut blocks = vec![
            block("Link", &["    href: str"]),
            block("Link1", &["    href: str", "    rel: str"]),
            block("Port", &["    n: int"]),
            block("Port2", &["    n: str"]),
        ];
        let summary = collapse_duplicates(&mut blocks, None);
        assert!(summary.collapsed.is_empty());
        assert_eq!(blocks.len(), 4);
    }

    #[test]
    fn missing_base_keeps_suffixed_block() {
        let mut blocks = vec![block("Orphan1", &["    x: int"])];
        collapse_duplicates(&mut blocks, None);
        assert_eq!(names(&blocks), vec!["Orphan1"]);
    }

    #[test]
    fn chains_resolve_to_surviving_base() {
        let mut blocks = vec![
            block("Role", &["    id: str"]),
            block("Role1", &["    id: str"]),
            block("Role12", &["    id: str"]),
            block("Party", &["    roles: List[Role12]"]),
        ];
        let summary = collapse_duplicates(&mut blocks, None);

        assert_eq!(names(&blocks), vec!["Role", "Party"]);
        assert_eq!(blocks[1].body_lines[1], "    roles: List[Role]");
        assert!(summary.collapsed.iter().all(|c| c.base == "Role"));
    }

    #[test]
    fn binary_type_is_always_dropped() {
        let mut blocks = vec![
            block("Base64", &["    __root__: str"]),
            block("Resource", &["    base64: Optional[Base64] = None"]),
        ];
        let summary = collapse_duplicates(&mut blocks, Some(DEFAULT_BINARY_TYPE));

        assert_eq!(names(&blocks), vec!["Resource"]);
        assert_eq!(summary.dropped, vec!["Base64"]);
        assert_eq!(blocks[0].body_lines[1], "    base64: Optional[Base64] = None");
    }

    #[test]
    fn signature_line_is_ignored_in_comparison() {
        let mut blocks = vec![
            DeclarationBlock::new("Prop", "class Prop(OscalBaseModel):"),
            DeclarationBlock::new("Prop1", "class Prop1(OscalBaseModel):"),
        ];
        collapse_duplicates(&mut blocks, None);
        assert_eq!(names(&blocks), vec!["Prop"]);
    }

    #[test]
    fn parsed_duplicate_in_last_position_is_collapsed() {
        let text = "class User(BaseModel):\n    b: Base1\n\n\nclass Base(BaseModel):\n    l1: str\n    l2: int\n\n\nclass Base1(BaseModel):\n    l1: str\n    l2: int\n";
        let mut unit = crate::parser::parse_source(text);
        let summary = collapse_duplicates(&mut unit.blocks, None);

        assert_eq!(names(&unit.blocks), vec!["User", "Base"]);
        assert_eq!(summary.collapsed.len(), 1);
        assert_eq!(unit.blocks[0].body_lines[1], "    b: Base");
    }
}
