//! Default filesystem-backed port implementations.

use std::collections::BTreeMap;

use crate::ports::{SourceFilter, SourceRepo, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::{MatchOptions, Pattern, glob};
use tracing::debug;

/// Reads generated sources from a directory.
#[derive(Debug, Clone)]
pub struct FsSourceRepo {
    root: Utf8PathBuf,
}

impl FsSourceRepo {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceRepo for FsSourceRepo {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn list_sources(&self, filter: &SourceFilter) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let pattern = format!("{}/{}", Pattern::escape(self.root.as_str()), filter.pattern);
        debug!(pattern = %pattern, "scanning for generated sources");

        let mut out = Vec::new();
        for entry in glob(&pattern).with_context(|| format!("glob {}", pattern))? {
            let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
            let path = Utf8PathBuf::from_path_buf(path)
                .map_err(|p| anyhow::anyhow!("non-utf8 path: {}", p.display()))?;
            if !path.is_file() {
                continue;
            }
            let rel = path
                .strip_prefix(&self.root)
                .map(Utf8Path::to_path_buf)
                .unwrap_or(path);
            if filter.keeps_stem(&rel) {
                out.push(rel);
            }
        }

        // Deterministic order matters.
        out.sort();
        Ok(out)
    }

    fn read_source(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        let path = self.root.join(rel);
        fs::read_to_string(&path).with_context(|| format!("read {}", path))
    }
}

/// In-memory sources for embedding and testing.
///
/// Matching uses the same glob semantics as the filesystem scan: `*` never crosses a `/`.
#[derive(Debug, Clone, Default)]
pub struct InMemorySourceRepo {
    root: Utf8PathBuf,
    files: BTreeMap<Utf8PathBuf, String>,
}

impl InMemorySourceRepo {
    pub fn new<P, S>(root: impl Into<Utf8PathBuf>, files: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: Into<Utf8PathBuf>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            files: files
                .into_iter()
                .map(|(p, s)| (p.into(), s.into()))
                .collect(),
        }
    }
}

impl SourceRepo for InMemorySourceRepo {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn list_sources(&self, filter: &SourceFilter) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let pattern = Pattern::new(&filter.pattern)
            .with_context(|| format!("invalid file pattern {}", filter.pattern))?;
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        Ok(self
            .files
            .keys()
            .filter(|p| pattern.matches_with(p.as_str(), options) && filter.keeps_stem(p))
            .cloned()
            .collect())
    }

    fn read_source(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        self.files
            .get(rel)
            .cloned()
            .with_context(|| format!("read {}", rel))
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
