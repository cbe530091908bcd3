//! Error types for snippet extraction
//!
//! - Path errors (file outside the project root, root not found)
//! - Parse errors forwarded from the syntax layer

use docweave_syntax::ParseError;
use std::path::PathBuf;

/// Errors mapping files to module paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// File does not live under the declared project root
    #[error("{path} is not under project root {root}")]
    NotUnderRoot {
        /// Offending file
        path: PathBuf,
        /// Declared root
        root: PathBuf,
    },

    /// No project marker found walking up from the start directory
    #[error("could not find project root above {start} (looked for .git, .hg, pyproject.toml)")]
    RootNotFound {
        /// Directory the search started from
        start: PathBuf,
    },

    /// Module path requested for a snippet extracted without a project root
    #[error("no project root declared for {0}")]
    NoProjectRoot(String),
}

impl PathError {
    /// Create not-under-root error
    pub fn not_under_root(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self::NotUnderRoot {
            path: path.into(),
            root: root.into(),
        }
    }

    /// Create root-not-found error
    pub fn root_not_found(start: impl Into<PathBuf>) -> Self {
        Self::RootNotFound {
            start: start.into(),
        }
    }
}

/// Errors during snippet extraction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnippetError {
    /// Source failed to parse; callers skip the file
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Path mapping failed; callers abort the operation
    #[error("path error: {0}")]
    Path(#[from] PathError),
}

impl SnippetError {
    /// Check if the error must halt the enclosing operation
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Path(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_error_display() {
        let err = PathError::not_under_root("/other/a.py", "/proj");
        assert_eq!(err.to_string(), "/other/a.py is not under project root /proj");
    }

    #[test]
    fn fatality() {
        let parse: SnippetError = ParseError::ParseFailed.into();
        let path: SnippetError = PathError::root_not_found("/tmp").into();
        assert!(!parse.is_fatal());
        assert!(path.is_fatal());
    }
}
