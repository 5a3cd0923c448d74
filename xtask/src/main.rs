use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_err as fs;
use std::path::Path;
use std::process::Command as ProcessCommand;

const FIXTURES_DIR: &str = "tests/fixtures";

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by declfix.
    PrintSchemas,
    /// Scaffold tests/fixtures/<name>/input.py for a new golden case.
    NewFixture { name: String },
    /// Bless golden fixtures (overwrite expected outputs).
    BlessFixtures,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", declfix_types::schema::DECLFIX_REPORT_V1);
        }
        Command::NewFixture { name } => {
            let dir = Path::new(FIXTURES_DIR).join(&name);
            if dir.exists() {
                anyhow::bail!("fixture {} already exists", dir.display());
            }
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
            fs::write(
                dir.join("input.py"),
                "from pydantic import BaseModel\n\n\nclass Example(BaseModel):\n    id: str\n",
            )?;
            println!(
                "created {}/input.py; edit it, then run `cargo run -p xtask -- bless-fixtures` and add a test",
                dir.display()
            );
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "declfix-domain", "--test", "golden_fixtures"])
                .env("DECLFIX_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
    }
    Ok(())
}
