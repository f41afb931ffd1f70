//! `plnav` settings: candidate extensions and extra search roots, package
//! synonyms, output format and ignore globs.
//!
//! Built-in defaults are overlaid by `~/.plnav/config.toml` and then by
//! `<workspace>/.plnav/config.toml`. A layer changes only the keys it sets;
//! lists are replaced whole, `[synonyms]` merges per alias.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File extensions searched for PL/SQL sources when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "sql", "pks", "pkb", "pls", "plb", "pck", "pkg", "prc", "fnc", "trg", "tps", "tpb",
];

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub search: SearchConfig,
    /// Alias -> package name, consulted before cross-file search.
    pub synonyms: BTreeMap<String, String>,
    pub output: OutputConfig,
    pub ignore: IgnoreConfig,
}

/// Cross-file search settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Extensions (without the dot) of candidate files.
    pub extensions: Vec<String>,
    /// Extra directories searched after the workspace root.
    pub roots: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Grep,
    Json,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputConfig {
    pub default_format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IgnoreConfig {
    /// Globs excluded from candidate enumeration.
    pub patterns: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            roots: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// File layers
// ---------------------------------------------------------------------------

/// One `config.toml` as written; `None` means the key is absent.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigOverlay {
    search: Option<SearchOverlay>,
    synonyms: Option<BTreeMap<String, String>>,
    output: Option<OutputOverlay>,
    ignore: Option<IgnoreOverlay>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SearchOverlay {
    extensions: Option<Vec<String>>,
    roots: Option<Vec<PathBuf>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputOverlay {
    default_format: Option<OutputFormat>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct IgnoreOverlay {
    patterns: Option<Vec<String>>,
}

impl Config {
    /// Relative `roots` resolve against `base`, the directory holding the
    /// layer's `.plnav` folder. Extensions lose a leading dot.
    fn apply_overlay(&mut self, overlay: ConfigOverlay, base: Option<&Path>) {
        if let Some(s) = overlay.search {
            if let Some(v) = s.extensions {
                self.search.extensions = v
                    .into_iter()
                    .map(|e| e.trim_start_matches('.').to_string())
                    .collect();
            }
            if let Some(v) = s.roots {
                self.search.roots = v
                    .into_iter()
                    .map(|r| match base {
                        Some(b) if r.is_relative() => b.join(r),
                        _ => r,
                    })
                    .collect();
            }
        }
        if let Some(syn) = overlay.synonyms {
            self.synonyms.extend(syn);
        }
        if let Some(out) = overlay.output
            && let Some(v) = out.default_format
        {
            self.output.default_format = v;
        }
        if let Some(ign) = overlay.ignore
            && let Some(v) = ign.patterns
        {
            self.ignore.patterns = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn home_dir() -> Option<PathBuf> {
    #[allow(deprecated)]
    std::env::home_dir()
}

/// Read one `config.toml` layer. A missing file is an empty layer.
fn read_layer(path: &Path) -> Result<Option<ConfigOverlay>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("cannot read config file {}", path.display()));
        }
    };
    toml::from_str(&contents)
        .map(Some)
        .with_context(|| format!("invalid config file {}", path.display()))
}

impl Config {
    /// Defaults, then `~/.plnav/config.toml`, then
    /// `<workspace>/.plnav/config.toml`.
    pub fn load(workspace_root: Option<&Path>) -> Result<Config> {
        let global_dir = home_dir().map(|h| h.join(".plnav"));
        Self::load_with_global_dir(global_dir.as_deref(), workspace_root)
    }

    /// [`Config::load`] with the global `.plnav` directory given explicitly.
    pub(crate) fn load_with_global_dir(
        global_dir: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> Result<Config> {
        let mut config = Config::default();

        // Relative roots in the global layer resolve against the home dir.
        if let Some(dir) = global_dir
            && let Some(overlay) = read_layer(&dir.join("config.toml"))?
        {
            config.apply_overlay(overlay, dir.parent());
        }

        if let Some(root) = workspace_root
            && let Some(overlay) = read_layer(&root.join(".plnav").join("config.toml"))?
        {
            config.apply_overlay(overlay, Some(root));
        }

        Ok(config)
    }
}
