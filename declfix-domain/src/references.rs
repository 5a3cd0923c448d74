//! Reference extraction: three independent textual scans per body line.
//!
//! The scans know nothing about which names are declared. They over-collect (primitive
//! types, container names, regex fragments) and the resolver filters.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // `name: Token` where Token has no brackets or whitespace.
    static ref SCALAR_FIELD: Regex =
        Regex::new(r"^\s*\w+\s*:\s*([^\s\[\]]+)").unwrap_or_else(|e| panic!("regex: {e}"));
    // Innermost `[...]` group; one or two comma-separated tokens are taken from it.
    static ref INNERMOST_BRACKET: Regex =
        Regex::new(r"\[([^\[\]]+)\]").unwrap_or_else(|e| panic!("regex: {e}"));
    // First alternative of `Optional[Union[...`.
    static ref OPTIONAL_UNION: Regex =
        Regex::new(r"Optional\[Union\[([^,\]]+)").unwrap_or_else(|e| panic!("regex: {e}"));
}

/// Collect every reference-looking token from the given body lines.
pub fn extract_references<S: AsRef<str>>(lines: &[S]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for line in lines {
        references_in_line(line.as_ref(), &mut out);
    }
    out
}

/// Apply all three scans to one line, unioning matches into `out`.
pub fn references_in_line(line: &str, out: &mut BTreeSet<String>) {
    if let Some(caps) = SCALAR_FIELD.captures(line) {
        let token = caps[1]
            .split(['(', '=', ','])
            .next()
            .unwrap_or_default();
        add_if_good(token, out);
    }

    for caps in INNERMOST_BRACKET.captures_iter(line) {
        for token in caps[1].split(',').take(2) {
            add_if_good(token, out);
        }
    }

    for caps in OPTIONAL_UNION.captures_iter(line) {
        add_if_good(&caps[1], out);
    }
}

fn add_if_good(token: &str, out: &mut BTreeSet<String>) {
    let token = token.trim().trim_matches(|c: char| c == '\'' || c == '"').trim();
    if token.is_empty() || token.contains('.') {
        return;
    }
    out.insert(token.to_string());
}
