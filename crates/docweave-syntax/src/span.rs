//! Definition spans
//!
//! A definition's span runs from its first decorator (or header, if
//! undecorated) to the last line of its body, so decorators always travel with
//! the definition they annotate.

use crate::tree::{NodeId, SyntaxTree};

/// Inclusive, 1-based line range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineSpan {
    start: usize,
    end: usize,
}

impl LineSpan {
    /// Create span; bounds are swapped if given out of order
    #[inline]
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// First line
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last line (inclusive)
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of lines covered
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Spans always cover at least one line
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if a line falls inside the span
    #[inline]
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        (self.start..=self.end).contains(&line)
    }

    /// Check if another span lies entirely inside this one
    #[inline]
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl std::fmt::Display for LineSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Span of a function or class including its decorators
#[must_use]
pub fn definition_span(tree: &SyntaxTree, id: NodeId) -> LineSpan {
    let node = tree.node(id);
    let (start, end) = tree.decorators(id).into_iter().fold(
        (node.start().line, node.last_line()),
        |(start, end), decorator| {
            let decorator = tree.node(decorator);
            (start.min(decorator.start().line), end.max(decorator.last_line()))
        },
    );
    LineSpan::new(start, end)
}

/// Text of the lines covered by `span`, ending in exactly one `\n`
///
/// Line terminators inside the span are normalized to `\n`.
#[must_use]
pub fn extract_lines(source: &str, span: LineSpan) -> String {
    let mut text = source
        .lines()
        .skip(span.start() - 1)
        .take(span.len())
        .collect::<Vec<_>>()
        .join("\n");
    text.push('\n');
    text
}
