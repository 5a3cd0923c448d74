//! Declaration blocks and the source unit they belong to.

use std::collections::BTreeSet;

/// A declaration name. Equality is exact-string.
pub type Identifier = String;

/// One named declaration: its signature line plus every body line up to the next declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationBlock {
    pub name: Identifier,

    /// Signature line first, then the body verbatim. Trailing blank separator lines are
    /// not part of the block; the renderer re-emits them.
    pub body_lines: Vec<String>,

    /// Every token that looks like a referenced declaration name, own name included.
    pub raw_references: BTreeSet<Identifier>,

    /// `raw_references` restricted to names declared in the same unit, minus `name`.
    pub resolved_references: BTreeSet<Identifier>,

    pub self_referencing: bool,
}

impl DeclarationBlock {
    pub fn new(name: impl Into<Identifier>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body_lines: vec![signature.into()],
            raw_references: BTreeSet::new(),
            resolved_references: BTreeSet::new(),
            self_referencing: false,
        }
    }

    /// Lines after the signature.
    pub fn body(&self) -> &[String] {
        self.body_lines.get(1..).unwrap_or_default()
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.body_lines.push(line.into());
    }

    /// Drop trailing blank lines, never the signature.
    pub fn trim_trailing_blank_lines(&mut self) {
        while self.body_lines.len() > 1
            && self.body_lines.last().is_some_and(|l| l.trim().is_empty())
        {
            self.body_lines.pop();
        }
    }
}

/// Line terminator of a source file, taken from its first line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if text[..idx].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One generated file, split into a preamble and its declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceUnit {
    /// Lines before the first declaration (license, imports). Emitted unchanged apart from
    /// trailing blank lines when declarations follow.
    pub preamble: Vec<String>,

    pub blocks: Vec<DeclarationBlock>,

    /// Forward-declaration statements found on parse. They are discarded and recomputed.
    pub stale_forward_refs: Vec<String>,

    pub line_ending: LineEnding,
}

impl SourceUnit {
    pub fn declared_names(&self) -> BTreeSet<&str> {
        self.blocks.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn block_names(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.name.as_str()).collect()
    }
}

/// Permissible index range for one block under the current ordering.
///
/// Recomputed from scratch on every pass; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyWindow {
    /// Index of the first block that depends on this one, or the last valid index if none does.
    pub earliest_dependent: usize,

    /// Highest index among this block's dependencies, or 0 if it has none.
    pub latest_dependency: usize,
}

impl DependencyWindow {
    pub fn contains(&self, index: usize) -> bool {
        self.latest_dependency <= index && index <= self.earliest_dependent
    }
}
