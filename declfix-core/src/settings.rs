//! Clap-free settings for the run pipeline.

use camino::Utf8PathBuf;
use declfix_domain::ProcessConfig;
use declfix_types::report::RunMode;

use crate::ports::SourceFilter;

pub const DEFAULT_PATTERN: &str = "*.py";

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub root: Utf8PathBuf,

    // Selection
    pub pattern: String,
    pub stems: Vec<String>,

    pub mode: RunMode,

    /// Where `report.json`, `report.md` and `patch.diff` go. `None` writes nothing.
    pub out_dir: Option<Utf8PathBuf>,

    pub process: ProcessConfig,
}

impl RunSettings {
    pub fn filter(&self) -> SourceFilter {
        SourceFilter {
            pattern: self.pattern.clone(),
            stems: self.stems.clone(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            pattern: DEFAULT_PATTERN.to_string(),
            stems: Vec::new(),
            mode: RunMode::default(),
            out_dir: None,
            process: ProcessConfig::default(),
        }
    }
}
