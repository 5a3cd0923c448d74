//! Version-field constraint rewrite.
//!
//! Every generated declaration must agree on one version format, so the annotation of the
//! version field is overwritten no matter what the source schema said.

use declfix_types::decl::DeclarationBlock;

use crate::error::DomainError;

pub const DEFAULT_VERSION_FIELD: &str = "oscal_version";
pub const DEFAULT_VERSION_PATTERN: &str = r"^1\.[0-9]+\.[0-9]+$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    field: String,
    pattern: String,
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self {
            field: DEFAULT_VERSION_FIELD.to_string(),
            pattern: DEFAULT_VERSION_PATTERN.to_string(),
        }
    }
}

impl VersionConstraint {
    /// The pattern is embedded in a raw single-quoted string, so it cannot contain `'`.
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Result<Self, DomainError> {
        let pattern = pattern.into();
        if pattern.contains('\'') {
            return Err(DomainError::InvalidPattern {
                pattern,
                reason: "single quotes are not allowed".to_string(),
            });
        }
        if pattern.is_empty() {
            return Err(DomainError::InvalidPattern {
                pattern,
                reason: "pattern is empty".to_string(),
            });
        }
        Ok(Self {
            field: field.into(),
            pattern,
        })
    }

    pub fn annotation(&self) -> String {
        format!("constr(regex=r'{}')", self.pattern)
    }

    /// Rewrite the version field in the block body. Returns true if any line changed.
    pub fn apply(&self, block: &mut DeclarationBlock) -> bool {
        let mut changed = false;
        for line in block.body_lines.iter_mut().skip(1) {
            if let Some(rewritten) = self.rewrite_line(line)
                && rewritten != *line
            {
                *line = rewritten;
                changed = true;
            }
        }
        changed
    }

    /// Rewrite one line if it declares the version field. A default is kept and written
    /// back as ` = <default>`.
    pub fn rewrite_line(&self, line: &str) -> Option<String> {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        let rest = trimmed.strip_prefix(self.field.as_str())?;
        let annotation_and_default = rest.trim_start().strip_prefix(':')?;
        let tail = match default_offset(annotation_and_default) {
            Some(offset) => format!(" = {}", annotation_and_default[offset + 1..].trim()),
            None => String::new(),
        };
        Some(format!(
            "{indent}{}: {}{tail}",
            self.field,
            self.annotation()
        ))
    }
}

/// Byte offset of the first `=` outside brackets and quotes, if any.
fn default_offset(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth: i32 = 0;
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}
