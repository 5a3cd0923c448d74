use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Rewrite changed files in place.
    #[default]
    Fix,
    /// Compute rewrites and a patch, write nothing.
    DryRun,
    /// Like `DryRun`, but pending rewrites are a policy block.
    Check,
}

impl RunMode {
    pub fn writes(self) -> bool {
        matches!(self, RunMode::Fix)
    }
}

/// Report for one batch of generated files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema: String,
    pub tool: ToolInfo,

    #[serde(default)]
    pub run: RunInfo,

    pub mode: RunMode,
    pub strategy: String,

    #[serde(default)]
    pub counts: RunCounts,

    #[serde(default)]
    pub units: Vec<UnitReport>,
}

impl RunReport {
    pub fn new(tool: ToolInfo, mode: RunMode, strategy: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::DECLFIX_REPORT_V1.to_string(),
            tool,
            run: RunInfo::default(),
            mode,
            strategy: strategy.into(),
            counts: RunCounts::default(),
            units: vec![],
        }
    }

    /// Recompute `counts` from `units`.
    pub fn tally(&mut self) {
        let mut counts = RunCounts {
            files: self.units.len() as u64,
            ..RunCounts::default()
        };
        for unit in &self.units {
            match unit.status {
                UnitStatus::Unchanged => counts.unchanged += 1,
                UnitStatus::Rewritten | UnitStatus::WouldRewrite => counts.rewritten += 1,
                UnitStatus::Blocked => counts.blocked += 1,
                UnitStatus::Failed => counts.failed += 1,
            }
            if let Some(summary) = &unit.summary {
                counts.forward_refs += summary.forward_refs.len() as u64;
                counts.collapsed += summary.collapsed.len() as u64;
                if !summary.converged {
                    counts.unconverged += 1;
                }
            }
        }
        self.counts = counts;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub files: u64,
    pub unchanged: u64,
    pub rewritten: u64,
    pub blocked: u64,
    pub failed: u64,
    pub forward_refs: u64,
    pub collapsed: u64,
    pub unconverged: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Unchanged,
    Rewritten,
    WouldRewrite,
    /// The file changed on disk between read and write.
    Blocked,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitReport {
    pub path: String,
    pub status: UnitStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_before: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_after: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<UnitSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What the per-file pipeline did to one source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub strategy: String,
    pub blocks_in: u64,
    pub blocks_out: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collapsed: Vec<CollapsedDuplicate>,

    /// Built-in alias declarations dropped unconditionally.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<String>,

    /// Blocks whose version field annotation was rewritten.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constrained: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moves: Vec<BlockMove>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forward_refs: Vec<String>,

    pub passes: u64,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedDuplicate {
    pub duplicate: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMove {
    pub name: String,
    pub from: usize,
    pub to: usize,
}
