//! Qualified paths of definitions
//!
//! Provides [`QualifiedPath`] for naming a definition by the chain of
//! definitions enclosing it.

use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Dot-joined chain of enclosing definition names, outermost first
///
/// # Examples
/// - `["Greeter", "greet"]` → `Greeter.greet`
/// - `["main"]` → `main`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct QualifiedPath(Vec<String>);

impl QualifiedPath {
    /// Check if path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl Display for QualifiedPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for QualifiedPath {
    type Err = QualifiedPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(QualifiedPathError::EmptySegment)
                } else if seg.contains(|c: char| !c.is_alphanumeric() && c != '_') {
                    Err(QualifiedPathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<String>> for QualifiedPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl Serialize for QualifiedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors parsing a qualified path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QualifiedPathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Segment is not a Python identifier
    #[error("invalid segment: {0} (must be alphanumeric or underscore)")]
    InvalidSegment(String),
}
