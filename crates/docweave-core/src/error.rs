//! Error types for docweave Core
//!
//! Provides error handling for:
//! - Configuration loading
//! - File system access
//! - Project root and module path resolution
//! - Documentation generation
//!
//! Per-file and per-snippet failures are not errors of the run; they are
//! recorded in a [`crate::BatchReport`]. An [`EngineError`] ends the run.

use docweave_snippet::PathError;
use std::path::PathBuf;

/// Main docweave error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid TOML for [`crate::EngineConfig`]
    #[error("invalid configuration file {path}: {source}")]
    ConfigFile {
        /// Offending file
        path: PathBuf,
        /// Decoder diagnosis
        source: toml::de::Error,
    },

    /// Configuration could not be read or a rewritten file could not be written
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Project root or module path resolution failed
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// Background extraction task panicked or was cancelled
    #[error("task failed: {0}")]
    Task(String),
}

impl EngineError {
    /// Create I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from a documentation text generator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Request could not be sent or the connection dropped
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded its timeout
    #[error("request timed out")]
    Timeout,

    /// Endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Response did not contain usable text
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// API key environment variable is not set
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),

    /// No scripted answer for the snippet
    #[error("no answer for {0}")]
    Unscripted(String),

    /// Every attempt failed
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Error of the final attempt
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Check if retrying may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::InvalidResponse(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MissingApiKey(_) | Self::Unscripted(_) | Self::Exhausted { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(GenerationError::Timeout.is_transient());
        assert!(GenerationError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(GenerationError::Status {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!GenerationError::Status {
            status: 401,
            body: String::new()
        }
        .is_transient());
        assert!(!GenerationError::MissingApiKey("KEY".into()).is_transient());
    }

    #[test]
    fn engine_error_display() {
        let err = EngineError::io("/tmp/x.py", std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "i/o error on /tmp/x.py: boom");
        let err = EngineError::from(PathError::root_not_found("/tmp"));
        assert!(err.to_string().starts_with("path error: could not find project root above /tmp"));
    }
}
