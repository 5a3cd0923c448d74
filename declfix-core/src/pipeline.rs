//! Multi-file driver, extracted from the CLI.
//!
//! The entry point is I/O-agnostic: all reads and writes go through the port traits.
//! Files are processed one at a time, in path order, with no state shared between them.

use std::collections::BTreeMap;

use crate::ports::{SourceRepo, WritePort};
use crate::settings::RunSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use declfix_domain::Processor;
use declfix_render::render_report_md;
use declfix_types::report::{RunMode, RunReport, ToolInfo, UnitReport, UnitStatus};
use diffy::PatchFormatter;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

/// Error type for pipeline results.  Exit code 2 = policy block, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("policy block")]
    PolicyBlock,
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::PolicyBlock => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run`.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub patch: String,
    /// Check mode found pending rewrites, or a file changed under us before writing.
    pub policy_block: bool,
}

impl RunOutcome {
    pub fn failed(&self) -> u64 {
        self.report.counts.failed
    }
}

/// Process every selected source. Returns the report and a unified patch of all rewrites.
///
/// Per-file failures are recorded in the report and do not stop the run. Only setup
/// problems (unknown strategy, unreadable root) are returned as errors.
pub fn run(
    settings: &RunSettings,
    repo: &dyn SourceRepo,
    writer: &dyn WritePort,
    tool: ToolInfo,
) -> Result<RunOutcome, ToolError> {
    let processor = Processor::new(&settings.process).context("configure processor")?;
    let paths = repo
        .list_sources(&settings.filter())
        .with_context(|| format!("list sources under {}", repo.root()))?;
    debug!(files = paths.len(), root = %repo.root(), "sources selected");

    let mut report = RunReport::new(tool, settings.mode, processor.strategy_key());
    report.run.started_at = Some(Utc::now());

    let mut before = BTreeMap::new();
    let mut after = BTreeMap::new();

    for rel in &paths {
        let unit = process_one(&processor, settings.mode, repo, writer, rel);
        if let (Some(old), Some(new)) = (&unit.original, &unit.rewritten) {
            before.insert(rel.clone(), old.clone());
            after.insert(rel.clone(), new.clone());
        }
        report.units.push(unit.report);
    }

    report.run.ended_at = Some(Utc::now());
    report.tally();

    let policy_block = report.counts.blocked > 0
        || (settings.mode == RunMode::Check && report.counts.rewritten > 0);

    info!(
        files = report.counts.files,
        rewritten = report.counts.rewritten,
        failed = report.counts.failed,
        blocked = report.counts.blocked,
        policy_block,
        "run finished"
    );

    Ok(RunOutcome {
        report,
        patch: render_patch(&before, &after),
        policy_block,
    })
}

struct ProcessedUnit {
    report: UnitReport,
    /// Set only when the text changed and the change is reported in the patch.
    original: Option<String>,
    rewritten: Option<String>,
}

fn process_one(
    processor: &Processor,
    mode: RunMode,
    repo: &dyn SourceRepo,
    writer: &dyn WritePort,
    rel: &Utf8Path,
) -> ProcessedUnit {
    let mut unit = UnitReport {
        path: rel.to_string(),
        status: UnitStatus::Unchanged,
        sha256_before: None,
        sha256_after: None,
        summary: None,
        error: None,
    };

    let text = match repo.read_source(rel) {
        Ok(text) => text,
        Err(e) => {
            warn!(file = %rel, error = %format!("{e:#}"), "failed to read source");
            unit.status = UnitStatus::Failed;
            unit.error = Some(format!("{e:#}"));
            return ProcessedUnit {
                report: unit,
                original: None,
                rewritten: None,
            };
        }
    };

    let sha_before = sha256_hex(text.as_bytes());
    unit.sha256_before = Some(sha_before.clone());

    let outcome = processor.process(&text);
    if !outcome.summary.converged {
        warn!(
            file = %rel,
            passes = outcome.summary.passes,
            "reordering did not converge; keeping best-effort order"
        );
    }
    unit.summary = Some(outcome.summary);

    if !outcome.changed {
        unit.sha256_after = Some(sha_before);
        return ProcessedUnit {
            report: unit,
            original: None,
            rewritten: None,
        };
    }

    unit.sha256_after = Some(sha256_hex(outcome.text.as_bytes()));

    if !mode.writes() {
        unit.status = UnitStatus::WouldRewrite;
    } else {
        match write_checked(repo, writer, rel, &sha_before, &outcome.text) {
            Ok(()) => unit.status = UnitStatus::Rewritten,
            Err(WriteFailure::Changed) => {
                warn!(file = %rel, "file changed since it was read; not writing");
                unit.status = UnitStatus::Blocked;
                unit.error = Some("precondition failed: file changed since it was read".into());
            }
            Err(WriteFailure::Io(e)) => {
                warn!(file = %rel, error = %format!("{e:#}"), "failed to write source");
                unit.status = UnitStatus::Failed;
                unit.error = Some(format!("{e:#}"));
            }
        }
    }

    let reported = matches!(unit.status, UnitStatus::Rewritten | UnitStatus::WouldRewrite);
    ProcessedUnit {
        report: unit,
        original: reported.then_some(text),
        rewritten: reported.then_some(outcome.text),
    }
}

enum WriteFailure {
    Changed,
    Io(anyhow::Error),
}

/// Write only if the file still hashes to what was processed.
fn write_checked(
    repo: &dyn SourceRepo,
    writer: &dyn WritePort,
    rel: &Utf8Path,
    expected_sha: &str,
    contents: &str,
) -> Result<(), WriteFailure> {
    let current = repo.read_source(rel).map_err(WriteFailure::Io)?;
    if sha256_hex(current.as_bytes()) != expected_sha {
        return Err(WriteFailure::Changed);
    }
    writer
        .write_file(&repo.root().join(rel), contents.as_bytes())
        .map_err(WriteFailure::Io)
}

/// Write `report.json`, `report.md` and `patch.diff` to the output directory.
pub fn write_artifacts(
    outcome: &RunOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    let report_md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;

    Ok(())
}

fn render_patch(
    before: &BTreeMap<Utf8PathBuf, String>,
    after: &BTreeMap<Utf8PathBuf, String>,
) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for (path, old) in before {
        let new = after.get(path).unwrap_or(old);
        if old == new {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

        let patch = diffy::create_patch(old, new);
        let body = formatter.fmt_patch(&patch).to_string();
        // diffy writes placeholder file names; keep only the hunks.
        let hunks = body
            .split_once("\n+++ ")
            .and_then(|(_, rest)| rest.split_once('\n'))
            .map_or(body.as_str(), |(_, hunks)| hunks);
        out.push_str(hunks);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
