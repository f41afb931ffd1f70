//! File walker with gitignore support and default exclusions.
//!
//! Wraps the `ignore` crate's `WalkBuilder` to provide a file walker that:
//! - Respects `.gitignore` rules
//! - Skips common build/dependency directories by default
//! - Skips hidden files/directories except `.github`
//! - Narrows the walk to case-insensitive file-name globs
//! - Applies extra exclusion globs from configuration

use std::path::{Path, PathBuf};

use ignore::{DirEntry, WalkBuilder};
use ignore::overrides::OverrideBuilder;

use crate::errors::SearchError;

/// Directories that are always excluded from walks, regardless of `.gitignore`.
const DEFAULT_EXCLUSIONS: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "build",
    "dist",
    "__pycache__",
    ".venv",
];

/// Hidden directory names that are NOT excluded (i.e., they are allowed
/// even though hidden directories are otherwise skipped).
const HIDDEN_ALLOWLIST: &[&str] = &[".github"];

/// Build `*hint*.ext` globs for every (hint, extension) pair.
///
/// Empty hints are skipped. Matching is case-insensitive once the globs
/// are handed to [`Walker::include`].
pub fn hint_globs(hints: &[String], extensions: &[String]) -> Vec<String> {
    let mut globs = Vec::new();
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        for ext in extensions {
            let ext = ext.trim_start_matches('.');
            globs.push(format!("*{}*.{ext}", escape_glob(hint)));
        }
    }
    globs
}

/// Escape glob metacharacters so identifiers like `v$x` or `a[1]` match
/// literally.
fn escape_glob(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | '\\' | '!') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A file-system walker that respects `.gitignore` and applies default
/// exclusions.
pub struct Walker {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Walker {
    /// Create a new walker rooted at the given path.
    ///
    /// The path may be a subdirectory of a repository; the walker will still
    /// respect `.gitignore` files from parent directories.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Only yield files whose name matches one of these globs.
    pub fn include(mut self, globs: Vec<String>) -> Self {
        self.include = globs;
        self
    }

    /// Skip paths matching these globs in addition to the defaults.
    pub fn exclude(mut self, globs: Vec<String>) -> Self {
        self.exclude = globs;
        self
    }

    /// Build the underlying `WalkBuilder` with all our configuration applied.
    fn make_builder(&self) -> Result<WalkBuilder, SearchError> {
        let mut builder = WalkBuilder::new(&self.root);

        // Let the ignore crate handle .gitignore, .ignore, etc.
        builder.standard_filters(true);

        // We disable the built-in hidden filter because we need a more
        // nuanced policy (skip hidden except for allowlisted names).
        builder.hidden(false);

        // A glob without `!` means "include only", with `!` means "exclude".
        // Case folding must be set before any glob is added.
        let mut overrides = OverrideBuilder::new(&self.root);
        overrides
            .case_insensitive(true)
            .map_err(|e| SearchError::Pattern(e.to_string()))?;
        for glob in &self.include {
            overrides
                .add(glob)
                .map_err(|e| SearchError::Pattern(e.to_string()))?;
        }
        for dir in DEFAULT_EXCLUSIONS {
            overrides
                .add(&format!("!{dir}/"))
                .map_err(|e| SearchError::Pattern(e.to_string()))?;
        }
        for pattern in &self.exclude {
            overrides
                .add(&format!("!{pattern}"))
                .map_err(|e| SearchError::Pattern(e.to_string()))?;
        }
        builder.overrides(
            overrides
                .build()
                .map_err(|e| SearchError::Pattern(e.to_string()))?,
        );

        // Custom filter: skip hidden entries (name starts with `.`) unless
        // they appear in the allowlist.
        builder.filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') {
                // The root entry itself (depth 0) always passes through.
                if entry.depth() == 0 {
                    return true;
                }
                return HIDDEN_ALLOWLIST.iter().any(|a| *a == &*name);
            }
            true
        });

        Ok(builder)
    }

    /// Walk the file tree and collect matching file paths, sorted so that
    /// callers see a stable enumeration order.
    ///
    /// A missing root or any entry the walk cannot read is an error.
    pub fn collect_paths(&self) -> Result<Vec<PathBuf>, SearchError> {
        if !self.root.exists() {
            return Err(SearchError::Walk(format!(
                "{} does not exist",
                self.root.display()
            )));
        }
        let builder = self.make_builder()?;
        collect_files(builder.build())
    }
}

/// Keep the regular files of a walk, sorted. The first walk error aborts.
fn collect_files<I>(entries: I) -> Result<Vec<PathBuf>, SearchError>
where
    I: IntoIterator<Item = Result<DirEntry, ignore::Error>>,
{
    let mut paths = Vec::new();
    for result in entries {
        let entry = result?;
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}
