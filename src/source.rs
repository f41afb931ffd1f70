//! Candidate files for cross-file search.
//!
//! A [`CandidateSource`] enumerates files that plausibly hold a symbol and
//! reads them. The navigator drives it one file at a time and stops at the
//! first match, so enumeration order is significant.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::cache::ParseCache;
use crate::config::Config;
use crate::errors::SearchError;
use crate::parser;
use crate::types::Root;
use crate::walker::{Walker, hint_globs};

#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Files whose name contains any of `hints` (case-insensitive), in a
    /// stable order. Empty hints are ignored.
    async fn candidates(&self, hints: &[String]) -> Result<Vec<PathBuf>, SearchError>;

    async fn read(&self, path: &Path) -> Result<String, SearchError>;

    /// Read and parse a candidate.
    async fn load(&self, path: &Path) -> Result<Arc<Root>, SearchError> {
        let text = self.read(path).await?;
        Ok(Arc::new(parser::parse(&path.to_string_lossy(), &text)))
    }
}

#[async_trait]
impl<S: CandidateSource + ?Sized> CandidateSource for Arc<S> {
    async fn candidates(&self, hints: &[String]) -> Result<Vec<PathBuf>, SearchError> {
        (**self).candidates(hints).await
    }

    async fn read(&self, path: &Path) -> Result<String, SearchError> {
        (**self).read(path).await
    }

    async fn load(&self, path: &Path) -> Result<Arc<Root>, SearchError> {
        (**self).load(path).await
    }
}

// ---------------------------------------------------------------------------
// Workspace on disk
// ---------------------------------------------------------------------------

/// Searches one or more directory trees with the gitignore-aware walker.
pub struct WorkspaceSource {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    ignore: Vec<String>,
    cache: ParseCache,
}

impl WorkspaceSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            roots: vec![root.as_ref().to_path_buf()],
            extensions: crate::config::DEFAULT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            ignore: Vec::new(),
            cache: ParseCache::new(),
        }
    }

    /// The workspace root followed by the configured extra roots.
    pub fn from_config<P: AsRef<Path>>(root: P, config: &Config) -> Self {
        let mut source = Self::new(root).extensions(config.search.extensions.clone());
        source.roots.extend(config.search.roots.iter().cloned());
        source.ignore = config.ignore.patterns.clone();
        source
    }

    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }
}

#[async_trait]
impl CandidateSource for WorkspaceSource {
    async fn candidates(&self, hints: &[String]) -> Result<Vec<PathBuf>, SearchError> {
        let globs = hint_globs(hints, &self.extensions);
        if globs.is_empty() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for root in &self.roots {
            let walker = Walker::new(root)
                .include(globs.clone())
                .exclude(self.ignore.clone());
            let found = tokio::task::spawn_blocking(move || walker.collect_paths()).await??;
            debug!(root = %root.display(), ?hints, count = found.len(), "enumerated candidates");
            for path in found {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
        Ok(paths)
    }

    async fn read(&self, path: &Path) -> Result<String, SearchError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SearchError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn load(&self, path: &Path) -> Result<Arc<Root>, SearchError> {
        let text = self.read(path).await?;
        Ok(self.cache.get_or_parse(path, &text))
    }
}

// ---------------------------------------------------------------------------
// In-memory files
// ---------------------------------------------------------------------------

/// Named in-memory files, enumerated in insertion order. Useful for
/// embedding and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: Vec<(PathBuf, String)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.push((path.into(), text.into()));
        self
    }
}

#[async_trait]
impl CandidateSource for MemorySource {
    async fn candidates(&self, hints: &[String]) -> Result<Vec<PathBuf>, SearchError> {
        let hints: Vec<String> = hints
            .iter()
            .filter(|h| !h.is_empty())
            .map(|h| h.to_ascii_lowercase())
            .collect();
        Ok(self
            .files
            .iter()
            .filter(|(path, _)| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_ascii_lowercase())
                    .unwrap_or_default();
                hints.iter().any(|h| name.contains(h.as_str()))
            })
            .map(|(path, _)| path.clone())
            .collect())
    }

    async fn read(&self, path: &Path) -> Result<String, SearchError> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, text)| text.clone())
            .ok_or_else(|| SearchError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            })
    }
}
