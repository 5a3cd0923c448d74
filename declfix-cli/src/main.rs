mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use config::{ConfigMerger, RunArgs};
use declfix_core::RunMode;
use declfix_core::adapters::{FsSourceRepo, FsWritePort};
use declfix_core::pipeline::{RunOutcome, ToolError, run, write_artifacts};
use declfix_domain::builtin_strategies;
use declfix_types::report::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "declfix",
    version,
    about = "Reorders generated model declarations so every type is declared after its dependencies."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rewrite generated model files in place (or preview with --dry-run).
    Fix(FixArgs),
    /// Exit 2 if any file would be rewritten; prints the pending patch.
    Check(SelectArgs),
    /// List available reordering strategies.
    Strategies(StrategiesArgs),
}

#[derive(Debug, Args)]
struct SelectArgs {
    /// Directory holding the generated files and optional declfix.toml.
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// File stem to process (repeatable). Extends [files].stems.
    #[arg(long = "stem")]
    stems: Vec<String>,

    /// Glob relative to the root (default: *.py).
    #[arg(long)]
    pattern: Option<String>,

    /// Reordering strategy key (see `declfix strategies`).
    #[arg(long)]
    strategy: Option<String>,

    /// Repair pass cap for the window strategy.
    #[arg(long)]
    max_passes: Option<u64>,

    /// Leave the version field annotation untouched.
    #[arg(long, default_value_t = false)]
    no_version_constraint: bool,

    /// Write report.json, report.md and patch.diff here.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Args)]
struct FixArgs {
    #[command(flatten)]
    select: SelectArgs,

    /// Print the patch instead of writing files.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct StrategiesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.cmd {
        Command::Fix(args) => {
            let mode = if args.dry_run {
                RunMode::DryRun
            } else {
                RunMode::Fix
            };
            cmd_run(args.select, mode)
        }
        Command::Check(args) => cmd_run(args, RunMode::Check),
        Command::Strategies(args) => cmd_strategies(args).map_err(ToolError::from),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(ToolError::PolicyBlock) => {
            info!("policy block: files would change");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn cmd_run(args: SelectArgs, mode: RunMode) -> Result<(), ToolError> {
    let root = args.root.clone();
    let file_config = config::load_or_default(&root).context("load declfix.toml config")?;
    let run_args = RunArgs {
        stems: args.stems,
        pattern: args.pattern,
        strategy: args.strategy,
        max_passes: args.max_passes,
        out_dir: args.out_dir,
        no_version_constraint: args.no_version_constraint,
    };
    let settings = ConfigMerger::new(file_config).merge_run_args(root.clone(), mode, &run_args)?;
    debug!(
        "merged config: stems={:?}, pattern={}, strategy={}, max_passes={}",
        settings.stems, settings.pattern, settings.process.strategy, settings.process.max_passes
    );

    let repo = FsSourceRepo::new(root);
    let writer = FsWritePort;
    let outcome = run(&settings, &repo, &writer, tool_info())?;

    if let Some(out_dir) = &settings.out_dir {
        write_artifacts(&outcome, out_dir, &writer)
            .with_context(|| format!("write artifacts to {}", out_dir))?;
        info!("wrote report to {}", out_dir);
    }

    if mode != RunMode::Fix {
        print!("{}", outcome.patch);
    }
    print_summary(&outcome, mode);

    if outcome.failed() > 0 {
        let failed = outcome.failed();
        return Err(anyhow::anyhow!("{failed} file(s) failed; see log for details").into());
    }
    if outcome.policy_block {
        return Err(ToolError::PolicyBlock);
    }
    Ok(())
}

fn print_summary(outcome: &RunOutcome, mode: RunMode) {
    let c = &outcome.report.counts;
    let verb = match mode {
        RunMode::Fix => "rewritten",
        RunMode::DryRun | RunMode::Check => "would be rewritten",
    };
    eprintln!(
        "declfix: {} of {} file(s) {} ({} forward declaration(s), {} duplicate(s) collapsed)",
        c.rewritten, c.files, verb, c.forward_refs, c.collapsed
    );
    if c.unconverged > 0 {
        eprintln!(
            "declfix: {} file(s) hit the pass cap; best-effort order kept",
            c.unconverged
        );
    }
    if c.blocked > 0 {
        eprintln!(
            "declfix: {} file(s) changed on disk during the run; not written",
            c.blocked
        );
    }
}

fn cmd_strategies(args: StrategiesArgs) -> anyhow::Result<()> {
    let registry = builtin_strategies();
    match args.format {
        OutputFormat::Text => {
            println!("Available strategies:\n");
            println!("  {:<10} {:<10} DESCRIPTION", "KEY", "CONVERGES");
            println!("  {:<10} {:<10} -----------", "---", "---------");
            for meta in registry.metas() {
                println!(
                    "  {:<10} {:<10} {}",
                    meta.key,
                    if meta.converges { "yes" } else { "no" },
                    meta.description
                );
            }
        }
        OutputFormat::Json => {
            let strategies: Vec<_> = registry
                .metas()
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "key": m.key,
                        "description": m.description,
                        "converges": m.converges,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&strategies)?);
        }
    }
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "declfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
