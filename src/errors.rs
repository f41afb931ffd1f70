//! Application error types and user-facing error formatting.
//!
//! - [`SearchError`] for failures of the cross-file search (fatal to a query)
//! - [`PlnavError`] as the unified top-level error type of the binary
//!
//! "Nothing found" is never an error: navigation returns `Ok(None)`.
//! Parse irregularities are soft and live on the parsed tree as
//! [`crate::types::ParseIssue`]s.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

/// Process exit codes.
///
/// * `0` - success
/// * `1` - runtime error, or no result for a navigation query
/// * `2` - usage / argument error (bad CLI invocation)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

// ---------------------------------------------------------------------------
// Layer-specific error types
// ---------------------------------------------------------------------------

/// Errors raised while enumerating or reading candidate files.
///
/// A failure on any candidate aborts the whole search.
#[derive(Error, Debug)]
pub enum SearchError {
    /// A candidate file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("walk failed: {0}")]
    Walk(String),

    /// A file-name glob could not be compiled.
    #[error("invalid file pattern: {0}")]
    Pattern(String),

    /// A blocking search task panicked or was cancelled.
    #[error("search task failed: {0}")]
    Join(String),
}

impl From<ignore::Error> for SearchError {
    fn from(e: ignore::Error) -> Self {
        SearchError::Walk(e.to_string())
    }
}

impl From<tokio::task::JoinError> for SearchError {
    fn from(e: tokio::task::JoinError) -> Self {
        SearchError::Join(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Unified application error
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum PlnavError {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A configuration file exists but cannot be read or parsed.
    #[error("{0}")]
    Config(String),

    /// A usage / argument error (exit code 2).
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlnavError {
    /// Return the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PlnavError::Usage(_) => EXIT_USAGE,
            _ => EXIT_ERROR,
        }
    }

    /// Return an optional human-readable hint that may help the user fix
    /// the problem.  Returns `None` when no specific guidance applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PlnavError::Search(SearchError::Read { .. }) => {
                Some("a candidate file could not be read; check permissions or exclude it under [ignore] patterns")
            }
            PlnavError::Search(SearchError::Pattern(_)) => {
                Some("check [search] extensions and [ignore] patterns in .plnav/config.toml")
            }
            PlnavError::Search(SearchError::Walk(_)) => Some("check that --root points to a readable directory"),
            PlnavError::Config(_) => Some("fix or remove the offending .plnav/config.toml"),
            PlnavError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Some("verify the file or directory exists")
            }
            PlnavError::Io(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Some("check file permissions")
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn read_error(kind: std::io::ErrorKind) -> SearchError {
        SearchError::Read {
            path: PathBuf::from("pkg.pkb"),
            source: std::io::Error::new(kind, "boom"),
        }
    }

    #[test]
    fn exit_code_usage() {
        let err = PlnavError::Usage("bad flag".into());
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn exit_code_general() {
        let err = PlnavError::Search(SearchError::Walk("gone".into()));
        assert_eq!(err.exit_code(), EXIT_ERROR);
        let err = PlnavError::Config("bad".into());
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn hint_read_failure() {
        let err = PlnavError::Search(read_error(std::io::ErrorKind::PermissionDenied));
        assert!(err.hint().unwrap().contains("permissions"));
    }

    #[test]
    fn hint_pattern() {
        let err = PlnavError::Search(SearchError::Pattern("[".into()));
        assert!(err.hint().unwrap().contains("extensions"));
    }

    #[test]
    fn hint_io_not_found() {
        let err = PlnavError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.hint().unwrap().contains("exists"));
    }

    #[test]
    fn hint_none_for_other() {
        let err = PlnavError::Other(anyhow::anyhow!("something went wrong"));
        assert!(err.hint().is_none());
    }

    #[test]
    fn read_error_display_names_the_file() {
        let msg = read_error(std::io::ErrorKind::NotFound).to_string();
        assert_eq!(msg, "cannot read pkg.pkb: boom");
        assert!(!msg.contains("Read"));
    }

    #[test]
    fn display_usage_error() {
        let err = PlnavError::Usage("--line must be at least 1".into());
        assert_eq!(format!("{err}"), "--line must be at least 1");
    }

    #[test]
    fn search_error_converts() {
        let err: PlnavError = SearchError::Join("cancelled".into()).into();
        assert!(matches!(err, PlnavError::Search(SearchError::Join(_))));
        assert_eq!(err.to_string(), "search task failed: cancelled");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlnavError = io_err.into();
        assert!(matches!(err, PlnavError::Io(_)));
    }
}
