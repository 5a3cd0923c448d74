//! Configuration file loading for declfix.
//!
//! Discovers and loads `declfix.toml` from the models root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use declfix_core::settings::{DEFAULT_PATTERN, RunSettings};
use declfix_core::{ProcessConfig, RunMode, VersionConstraint};
use declfix_domain::{
    DEFAULT_BINARY_TYPE, DEFAULT_MAX_PASSES, DEFAULT_STRATEGY, DEFAULT_VERSION_FIELD,
    DEFAULT_VERSION_PATTERN,
};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "declfix.toml";

/// Top-level configuration from declfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeclfixConfig {
    pub files: FilesConfig,
    pub reorder: ReorderConfig,
    pub rewrite: RewriteConfig,
}

/// Which generated files to process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    /// File stems to process. Empty means every file matching `pattern`.
    pub stems: Vec<String>,

    /// Glob relative to the root.
    pub pattern: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            stems: Vec::new(),
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReorderConfig {
    pub strategy: String,
    pub max_passes: u64,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            strategy: DEFAULT_STRATEGY.to_string(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Text rewrites applied before reordering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Replace the version field's annotation with a constrained string.
    pub constrain_version: bool,
    pub version_field: String,
    pub version_pattern: String,

    /// Built-in alias declaration to drop. Empty keeps everything.
    pub binary_type: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            constrain_version: true,
            version_field: DEFAULT_VERSION_FIELD.to_string(),
            version_pattern: DEFAULT_VERSION_PATTERN.to_string(),
            binary_type: DEFAULT_BINARY_TYPE.to_string(),
        }
    }
}

/// Discover the declfix.toml config file.
///
/// Returns `None` if no config file is found in `root`.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a declfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<DeclfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<DeclfixConfig> {
    let config: DeclfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the root, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<DeclfixConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(DeclfixConfig::default()),
    }
}

/// CLI values for a `fix` or `check` run. `None` defers to the config file.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub stems: Vec<String>,
    pub pattern: Option<String>,
    pub strategy: Option<String>,
    pub max_passes: Option<u64>,
    pub out_dir: Option<Utf8PathBuf>,
    pub no_version_constraint: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: DeclfixConfig,
}

impl ConfigMerger {
    pub fn new(config: DeclfixConfig) -> Self {
        Self { config }
    }

    /// Merge with run CLI arguments into clap-free settings.
    ///
    /// CLI `stems` extend the config file list; every other CLI value overrides.
    pub fn merge_run_args(
        self,
        root: Utf8PathBuf,
        mode: RunMode,
        args: &RunArgs,
    ) -> anyhow::Result<RunSettings> {
        let mut stems = self.config.files.stems;
        for stem in &args.stems {
            if !stems.contains(stem) {
                stems.push(stem.clone());
            }
        }

        let rewrite = self.config.rewrite;
        let version = if rewrite.constrain_version && !args.no_version_constraint {
            Some(
                VersionConstraint::new(rewrite.version_field, rewrite.version_pattern)
                    .context("invalid [rewrite] version settings")?,
            )
        } else {
            None
        };
        let binary_type = Some(rewrite.binary_type).filter(|b| !b.is_empty());

        Ok(RunSettings {
            root,
            pattern: args.pattern.clone().unwrap_or(self.config.files.pattern),
            stems,
            mode,
            out_dir: args.out_dir.clone(),
            process: ProcessConfig {
                strategy: args.strategy.clone().unwrap_or(self.config.reorder.strategy),
                max_passes: args.max_passes.unwrap_or(self.config.reorder.max_passes),
                version,
                binary_type,
            },
        })
    }
}
