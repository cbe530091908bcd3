//! Error types for rewriting
//!
//! - [`InjectError`]: no safe insertion point, or the candidate was rejected
//! - [`ValidationError`]: candidate text is not structurally equivalent
//! - [`EditError`]: line changes that cannot be applied together

use docweave_syntax::ParseError;

/// Which text of a comparison failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Text before injection
    Original,
    /// Text after injection
    Candidate,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Original => "original",
            Self::Candidate => "candidate",
        })
    }
}

/// Structural divergence between original and candidate text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One of the texts does not parse
    #[error("{side} text does not parse: {error}")]
    Unparsable {
        /// Failing side
        side: Side,
        /// Parser diagnosis
        error: ParseError,
    },

    /// Node kinds differ at the same lockstep position
    #[error("kind mismatch at candidate line {line}: {original} vs {candidate}")]
    KindMismatch {
        /// Grammar kind in the original
        original: String,
        /// Grammar kind in the candidate
        candidate: String,
        /// Candidate line of the divergence
        line: usize,
    },

    /// Number of injected or replaced literals differs from what was expected
    #[error("expected {expected} documentation literal change(s), found {found}")]
    LiteralCount {
        /// Changes the caller asked for
        expected: usize,
        /// Changes actually seen
        found: usize,
    },

    /// One tree has nodes left after the other is exhausted
    #[error("trees differ in size ({side} has trailing nodes)")]
    TrailingNodes {
        /// Side with leftover nodes
        side: Side,
    },

    /// Position-free dumps differ
    #[error("structural dumps differ: {original:?} vs {candidate:?}")]
    DumpMismatch {
        /// First differing dump line of the original
        original: String,
        /// First differing dump line of the candidate
        candidate: String,
    },
}

impl ValidationError {
    /// Create unparsable error
    pub fn unparsable(side: Side, error: ParseError) -> Self {
        Self::Unparsable { side, error }
    }

    /// Create kind mismatch error
    pub fn kind_mismatch(original: &str, candidate: &str, line: usize) -> Self {
        Self::KindMismatch {
            original: original.to_string(),
            candidate: candidate.to_string(),
            line,
        }
    }
}

/// Errors injecting a documentation literal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectError {
    /// Documentation text is empty after trimming
    #[error("documentation text is empty")]
    EmptyDocstring,

    /// No function or class header starts at the line
    #[error("no definition starts at line {line}")]
    NoDefinitionAt {
        /// Requested header line
        line: usize,
    },

    /// Body shares the header's line, so there is no line to insert after
    #[error("body of definition at line {line} is on its header line")]
    BodyOnHeaderLine {
        /// Header line
        line: usize,
    },

    /// Existing literal shares its lines with other code and cannot be replaced
    #[error("documentation literal at line {line} shares its line with other code")]
    SharedDocstringLine {
        /// Line of the existing literal
        line: usize,
    },

    /// Source does not parse
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Candidate text failed the equivalence check
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Computed change could not be applied
    #[error("edit failed: {0}")]
    Edit(#[from] EditError),
}

impl InjectError {
    /// Check if the candidate was produced and then rejected
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Errors applying line changes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Change refers to lines past the end of the text
    #[error("change at line {at} removing {remove} line(s) exceeds {len} line(s)")]
    OutOfRange {
        /// 1-based line of the change
        at: usize,
        /// Lines removed
        remove: usize,
        /// Lines in the text
        len: usize,
    },

    /// Two changes touch the same lines
    #[error("changes at lines {first} and {second} overlap")]
    Overlap {
        /// Earlier change
        first: usize,
        /// Later change
        second: usize,
    },
}
