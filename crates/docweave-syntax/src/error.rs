//! Error types for parsing

use crate::tree::Position;

/// Errors produced while turning source text into a structural tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Grammar could not be loaded into the parser
    #[error("parser initialization failed: {0}")]
    ParserInit(String),

    /// Parser gave up without producing a tree
    #[error("parse failed")]
    ParseFailed,

    /// Source is not valid Python
    #[error("syntax error at {line}:{column}: {message}")]
    SyntaxError {
        /// 1-based line of the offending token
        line: usize,
        /// 1-based byte column of the offending token
        column: usize,
        /// Short description
        message: String,
    },
}

impl ParseError {
    /// Create syntax error at position
    pub fn syntax_error(position: Position, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }

    /// Offending position, if the error carries one
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::SyntaxError { line, column, .. } => Some(Position {
                line: *line,
                column: *column,
            }),
            Self::ParserInit(_) | Self::ParseFailed => None,
        }
    }
}
