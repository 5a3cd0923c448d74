//! Block parser and renderer for generated model modules.

use declfix_types::decl::{DeclarationBlock, LineEnding, SourceUnit};
use lazy_static::lazy_static;
use regex::Regex;

/// Column-zero token that opens a declaration.
pub const CLASS_MARKER: &str = "class ";

const FORWARD_REF_CALL: &str = ".update_forward_refs()";

/// Blank lines emitted between blocks and before the forward-declaration statements.
const SEPARATOR: [&str; 2] = ["", ""];

lazy_static! {
    static ref FORWARD_REF_LINE: Regex =
        Regex::new(r"^\w+\.update_forward_refs\(\)\s*$").unwrap_or_else(|e| panic!("regex: {e}"));
}

/// Extract the declared name from a marker line: everything after the marker up to the first
/// `(`, or up to the first `:` when the declaration has no base list.
pub fn declaration_name(line: &str) -> String {
    let rest = line.strip_prefix(CLASS_MARKER).unwrap_or(line);
    let end = rest
        .find('(')
        .or_else(|| rest.find(':'))
        .unwrap_or(rest.len());
    rest[..end].trim().to_string()
}

pub fn is_forward_ref_line(line: &str) -> bool {
    FORWARD_REF_LINE.is_match(line)
}

pub fn forward_ref_statement(name: &str) -> String {
    format!("{name}{FORWARD_REF_CALL}")
}

/// Split one generated file into a preamble and its declaration blocks.
///
/// Forward-declaration statements after the first declaration are dropped into
/// `stale_forward_refs`. Blank lines trailing a block are separators and are dropped;
/// everything else is kept verbatim.
pub fn parse_source(text: &str) -> SourceUnit {
    let mut unit = SourceUnit {
        line_ending: LineEnding::detect(text),
        ..SourceUnit::default()
    };
    let mut current: Option<DeclarationBlock> = None;

    for line in text.lines() {
        if line.starts_with(CLASS_MARKER) {
            if let Some(block) = current.take() {
                push_block(&mut unit, block);
            }
            current = Some(DeclarationBlock::new(declaration_name(line), line));
            continue;
        }

        match current.as_mut() {
            None => unit.preamble.push(line.to_string()),
            Some(_) if is_forward_ref_line(line) => unit.stale_forward_refs.push(line.to_string()),
            Some(block) => block.push_line(line),
        }
    }

    if let Some(block) = current {
        push_block(&mut unit, block);
    }

    unit
}

fn push_block(unit: &mut SourceUnit, mut block: DeclarationBlock) {
    block.trim_trailing_blank_lines();
    unit.blocks.push(block);
}

/// Serialize a unit back to text, appending one forward-declaration statement per name.
///
/// Blocks and the statement group are each preceded by two blank lines, except at the
/// top of the file. A unit without blocks keeps its preamble verbatim. Output uses the
/// unit's line ending and ends with exactly one.
pub fn render_source(unit: &SourceUnit, forward_refs: &[String]) -> String {
    let statements: Vec<String> = forward_refs
        .iter()
        .map(|name| forward_ref_statement(name))
        .collect();
    let mut lines: Vec<&str> = unit.preamble.iter().map(String::as_str).collect();

    if !unit.blocks.is_empty() {
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        for block in &unit.blocks {
            if !lines.is_empty() {
                lines.extend(SEPARATOR);
            }
            lines.extend(block.body_lines.iter().map(String::as_str));
        }

        if !statements.is_empty() {
            lines.extend(SEPARATOR);
            lines.extend(statements.iter().map(String::as_str));
        }
    }

    join_lines(&lines, unit.line_ending)
}

fn join_lines(lines: &[&str], ending: LineEnding) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join(ending.as_str());
    out.push_str(ending.as_str());
    out
}
