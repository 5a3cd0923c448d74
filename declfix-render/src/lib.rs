//! Rendering helpers (markdown) for human-readable artifacts.

use declfix_types::report::{RunMode, RunReport, UnitReport, UnitStatus};

pub fn render_report_md(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str("# declfix report\n\n");
    out.push_str(&format!(
        "- Mode: `{}`\n- Strategy: `{}`\n",
        mode_label(report.mode),
        report.strategy
    ));
    let c = &report.counts;
    out.push_str(&format!(
        "- Files: {} (unchanged {}, rewritten {}, blocked {}, failed {})\n",
        c.files, c.unchanged, c.rewritten, c.blocked, c.failed
    ));
    out.push_str(&format!(
        "- Forward declarations: {}\n- Collapsed duplicates: {}\n",
        c.forward_refs, c.collapsed
    ));
    if c.unconverged > 0 {
        out.push_str(&format!(
            "- Unconverged files: {} (best-effort order kept)\n",
            c.unconverged
        ));
    }
    out.push('\n');

    out.push_str("## Files\n\n");
    if report.units.is_empty() {
        out.push_str("_No files processed._\n");
        return out;
    }

    for (i, unit) in report.units.iter().enumerate() {
        render_unit(&mut out, i + 1, unit);
    }

    out
}

fn render_unit(out: &mut String, n: usize, unit: &UnitReport) {
    out.push_str(&format!("### {}. {}\n\n", n, unit.path));
    out.push_str(&format!("- Status: `{}`\n", status_label(unit.status)));
    if let Some(err) = &unit.error {
        out.push_str(&format!("- Error: {}\n", err));
    }

    if let Some(s) = &unit.summary {
        out.push_str(&format!(
            "- Blocks: {} → {}\n- Passes: {}{}\n",
            s.blocks_in,
            s.blocks_out,
            s.passes,
            if s.converged { "" } else { " (cap reached)" }
        ));
        if !s.moves.is_empty() {
            out.push_str(&format!("- Moved: {}\n", s.moves.len()));
        }
        if !s.forward_refs.is_empty() {
            out.push_str(&format!(
                "- Forward declarations: {}\n",
                s.forward_refs.join(", ")
            ));
        }
        if !s.constrained.is_empty() {
            out.push_str(&format!(
                "- Version constrained: {}\n",
                s.constrained.join(", ")
            ));
        }
        if !s.dropped.is_empty() {
            out.push_str(&format!("- Dropped: {}\n", s.dropped.join(", ")));
        }
        if !s.collapsed.is_empty() {
            out.push_str("\n**Collapsed duplicates**\n\n");
            for c in &s.collapsed {
                out.push_str(&format!("- `{}` → `{}`\n", c.duplicate, c.base));
            }
        }
    }

    out.push('\n');
}

fn mode_label(m: RunMode) -> &'static str {
    match m {
        RunMode::Fix => "fix",
        RunMode::DryRun => "dry_run",
        RunMode::Check => "check",
    }
}

fn status_label(s: UnitStatus) -> &'static str {
    match s {
        UnitStatus::Unchanged => "unchanged",
        UnitStatus::Rewritten => "rewritten",
        UnitStatus::WouldRewrite => "would_rewrite",
        UnitStatus::Blocked => "blocked",
        UnitStatus::Failed => "failed",
    }
}
