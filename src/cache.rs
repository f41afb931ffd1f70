//! Parse cache for candidate files, keyed by path and content hash.
//!
//! A file whose content hash is unchanged is never re-parsed; an edited
//! file replaces its entry. Nothing is evicted on its own: a long-lived
//! owner drops stale paths with [`ParseCache::retain`] or
//! [`ParseCache::clear`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;
use xxhash_rust::xxh3::xxh3_64;

use crate::parser;
use crate::types::Root;

#[derive(Debug, Default)]
pub struct ParseCache {
    entries: Mutex<HashMap<PathBuf, (u64, Arc<Root>)>>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the tree for `text`, parsing only when `path` is new or its
    /// content changed since the last call.
    pub fn get_or_parse(&self, path: &Path, text: &str) -> Arc<Root> {
        let hash = xxh3_64(text.as_bytes());
        {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some((h, root)) = entries.get(path)
                && *h == hash
            {
                trace!(path = %path.display(), "parse cache hit");
                return Arc::clone(root);
            }
        }

        // Parse outside the lock; a racing insert for the same content is
        // harmless.
        let root = Arc::new(parser::parse(&path.to_string_lossy(), text));
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), (hash, Arc::clone(&root)));
        root
    }

    /// Keep only the entries whose path satisfies `keep`.
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(&Path) -> bool,
    {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|path, _| keep(path));
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: &str = "procedure p is begin null; end;";
    const V2: &str = "procedure q is begin null; end;";

    #[test]
    fn unchanged_content_reuses_tree() {
        let cache = ParseCache::new();
        let a = cache.get_or_parse(Path::new("p.prc"), V1);
        let b = cache.get_or_parse(Path::new("p.prc"), V1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_content_reparses() {
        let cache = ParseCache::new();
        let a = cache.get_or_parse(Path::new("p.prc"), V1);
        let b = cache.get_or_parse(Path::new("p.prc"), V2);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b[b.symbols()[0]].name, "q");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn retain_drops_vanished_paths() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.prc");
        std::fs::write(&kept, V1).unwrap();
        let gone = dir.path().join("gone.prc");

        let cache = ParseCache::new();
        let first = cache.get_or_parse(&kept, V1);
        cache.get_or_parse(&gone, V2);
        assert_eq!(cache.len(), 2);

        cache.retain(Path::exists);
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&first, &cache.get_or_parse(&kept, V1)));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn file_name_comes_from_path() {
        let cache = ParseCache::new();
        let root = cache.get_or_parse(Path::new("db/p.prc"), V1);
        assert!(root.file_name().ends_with("p.prc"));
        assert!(!cache.is_empty());
    }
}
