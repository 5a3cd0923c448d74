//! Port traits abstracting all I/O away from the pipeline.

use camino::{Utf8Path, Utf8PathBuf};

/// Which files under the root to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    /// Glob relative to the root.
    pub pattern: String,
    /// File stems to keep. Empty keeps every match.
    pub stems: Vec<String>,
}

impl SourceFilter {
    pub fn keeps_stem(&self, path: &Utf8Path) -> bool {
        self.stems.is_empty()
            || path
                .file_stem()
                .is_some_and(|stem| self.stems.iter().any(|s| s == stem))
    }
}

/// Generated source files, addressed by path relative to `root()`.
pub trait SourceRepo {
    fn root(&self) -> &Utf8Path;

    /// Matching relative paths, sorted.
    fn list_sources(&self, filter: &SourceFilter) -> anyhow::Result<Vec<Utf8PathBuf>>;

    fn read_source(&self, rel: &Utf8Path) -> anyhow::Result<String>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
