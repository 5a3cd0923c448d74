//! End-to-end CLI tests: argument parsing, exit codes and on-disk effects.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UNORDERED: &str = "\
from pydantic import BaseModel


class Catalog(BaseModel):
    metadata: Metadata


class Metadata(BaseModel):
    title: str
";

const ORDERED: &str = "\
from pydantic import BaseModel


class Metadata(BaseModel):
    title: str


class Catalog(BaseModel):
    metadata: Metadata
";

fn declfix() -> Command {
    Command::cargo_bin("declfix").expect("declfix binary")
}

fn create_models_dir(files: &[(&str, &str)]) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    for (name, contents) in files {
        fs::write(td.path().join(name), contents).unwrap();
    }
    td
}

fn read(root: &Path, name: &str) -> String {
    fs::read_to_string(root.join(name)).unwrap()
}

#[test]
fn test_fix_rewrites_in_place() {
    let temp = create_models_dir(&[("catalog.py", UNORDERED), ("ordered.py", ORDERED)]);

    declfix()
        .current_dir(temp.path())
        .arg("fix")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 of 2 file(s) rewritten"));

    let rewritten = read(temp.path(), "catalog.py");
    assert!(rewritten.find("class Metadata").unwrap() < rewritten.find("class Catalog").unwrap());
    assert_eq!(read(temp.path(), "ordered.py"), ORDERED);
}

#[test]
fn test_fix_is_idempotent() {
    let temp = create_models_dir(&[("catalog.py", UNORDERED)]);

    declfix().current_dir(temp.path()).arg("fix").assert().success();
    let first = read(temp.path(), "catalog.py");

    declfix()
        .current_dir(temp.path())
        .arg("fix")
        .assert()
        .success()
        .stderr(predicate::str::contains("0 of 1 file(s) rewritten"));
    assert_eq!(read(temp.path(), "catalog.py"), first);
}

#[test]
fn test_dry_run_prints_patch_and_leaves_files() {
    let temp = create_models_dir(&[("catalog.py", UNORDERED)]);

    declfix()
        .arg("fix")
        .arg("--dry-run")
        .arg("--root")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("diff --git a/catalog.py b/catalog.py"))
        .stdout(
            predicate::str::contains("+class Metadata(BaseModel):")
                .or(predicate::str::contains("+class Catalog(BaseModel):")),
        );

    assert_eq!(read(temp.path(), "catalog.py"), UNORDERED);
}

#[test]
fn test_check_exits_2_on_pending_changes() {
    let temp = create_models_dir(&[("catalog.py", UNORDERED)]);

    declfix()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("catalog.py"));
}

#[test]
fn test_check_exits_0_when_clean() {
    let temp = create_models_dir(&[("catalog.py", ORDERED)]);

    declfix()
        .current_dir(temp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_repeated_stem_flags_accumulate() {
    let temp = create_models_dir(&[
        ("catalog.py", UNORDERED),
        ("profile.py", UNORDERED),
        ("ssp.py", UNORDERED),
    ]);

    declfix()
        .current_dir(temp.path())
        .arg("fix")
        .arg("--stem")
        .arg("catalog")
        .arg("--stem")
        .arg("ssp")
        .assert()
        .success()
        .stderr(predicate::str::contains("2 of 2 file(s) rewritten"));

    assert_eq!(read(temp.path(), "profile.py"), UNORDERED);
    assert_ne!(read(temp.path(), "ssp.py"), UNORDERED);
}

#[test]
fn test_config_file_selects_stems() {
    let temp = create_models_dir(&[
        ("catalog.py", UNORDERED),
        ("profile.py", UNORDERED),
        ("declfix.toml", "[files]\nstems = [\"profile\"]\n"),
    ]);

    declfix()
        .current_dir(temp.path())
        .arg("fix")
        .assert()
        .success();

    assert_eq!(read(temp.path(), "catalog.py"), UNORDERED);
    assert_ne!(read(temp.path(), "profile.py"), UNORDERED);
}

#[test]
fn test_invalid_config_is_tool_error() {
    let temp = create_models_dir(&[("declfix.toml", "[reorder]\nstrategy = 3\n")]);

    declfix()
        .current_dir(temp.path())
        .arg("fix")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("declfix.toml"));
}

#[test]
fn test_unknown_strategy_is_tool_error() {
    let temp = create_models_dir(&[("catalog.py", UNORDERED)]);

    declfix()
        .current_dir(temp.path())
        .arg("fix")
        .arg("--strategy")
        .arg("bogus")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown reorder strategy 'bogus'"));

    assert_eq!(read(temp.path(), "catalog.py"), UNORDERED);
}

#[test]
fn test_out_dir_receives_artifacts() {
    let temp = create_models_dir(&[("catalog.py", UNORDERED)]);
    let out = temp.path().join("artifacts");

    declfix()
        .current_dir(temp.path())
        .arg("fix")
        .arg("--dry-run")
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success();

    let report = read(&out, "report.json");
    assert!(report.contains("\"schema\": \"declfix.report.v1\""));
    assert!(report.contains("\"would_rewrite\""));
    assert!(read(&out, "report.md").starts_with("# declfix report"));
    assert!(read(&out, "patch.diff").contains("catalog.py"));
}

#[test]
fn test_strategies_text_format() {
    declfix()
        .arg("strategies")
        .assert()
        .success()
        .stdout(predicate::str::contains("window"))
        .stdout(predicate::str::contains("scc"));
}

#[test]
fn test_strategies_json_format() {
    let output = declfix()
        .arg("strategies")
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let keys: Vec<&str> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["scc", "window"]);
}

#[test]
fn test_strategies_invalid_format() {
    declfix()
        .arg("strategies")
        .arg("--format")
        .arg("yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_no_subcommand_shows_usage() {
    declfix()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
