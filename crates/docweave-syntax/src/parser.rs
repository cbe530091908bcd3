//! Python parser adapter
//!
//! Wraps tree-sitter-python and converts its concrete syntax tree into a
//! [`SyntaxTree`]. Input that needed error recovery is rejected, and so is
//! input whose statements are not aligned the way Python requires (the
//! grammar recovers from a bad dedent without leaving an error node).

use crate::error::ParseError;
use crate::kind::NodeKind;
use crate::text::leading_whitespace;
use crate::tree::{NodeId, Position, SyntaxTree};

/// Reusable Python parser
///
/// A parser holds mutable tree-sitter state, so each thread needs its own.
pub struct PythonParser {
    inner: tree_sitter::Parser,
}

impl std::fmt::Debug for PythonParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonParser").finish_non_exhaustive()
    }
}

impl PythonParser {
    /// Create parser with the Python grammar loaded
    ///
    /// # Errors
    /// Returns `ParseError::ParserInit` if the grammar ABI is incompatible
    pub fn new() -> Result<Self, ParseError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parse source into a structural tree
    ///
    /// # Errors
    /// Returns `ParseError::SyntaxError` at the first offending position
    pub fn parse(&mut self, source: &str) -> Result<SyntaxTree, ParseError> {
        if let Some(position) = unexpected_indent(source) {
            return Err(ParseError::syntax_error(position, "unexpected indent"));
        }

        let tree = self
            .inner
            .parse(source, None)
            .ok_or(ParseError::ParseFailed)?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(first_error(root));
        }

        let syntax = SyntaxTree::from_ts(&tree, source);
        check_indentation(&syntax)?;
        Ok(syntax)
    }
}

/// Parse with a throwaway parser
///
/// # Errors
/// See [`PythonParser::parse`]
pub fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    PythonParser::new()?.parse(source)
}

/// The first statement line of a module must not be indented
fn unexpected_indent(source: &str) -> Option<Position> {
    source
        .lines()
        .enumerate()
        .find(|(_, line)| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .and_then(|(index, line)| {
            let indent = line.len() - line.trim_start().len();
            (indent > 0).then_some(Position {
                line: index + 1,
                column: 1,
            })
        })
}

/// Every statement opening a line must sit at its container's column
///
/// Module statements belong at column 1. A block's statements share the
/// column of its first line-opening statement, which must lie right of the
/// construct owning the block.
fn check_indentation(tree: &SyntaxTree) -> Result<(), ParseError> {
    for container in tree.pre_order() {
        let mut expected = match tree.kind(container) {
            NodeKind::Module => Some(1),
            NodeKind::Block => None,
            _ => continue,
        };
        let owner_column = tree
            .parent(container)
            .map_or(0, |owner| tree.node(owner).start().column);

        let mut previous_line = None;
        for statement in tree.statements(container) {
            let node = tree.node(statement);
            if !opens_line(tree, statement) {
                previous_line = Some(node.last_line());
                continue;
            }
            let start = node.start();
            match expected {
                None if start.column <= owner_column => {
                    return Err(ParseError::syntax_error(start, "expected an indented block"));
                }
                None => expected = Some(start.column),
                Some(column) if column == start.column => {}
                Some(column) => {
                    let after_deeper_line = previous_line
                        .is_some_and(|line| line_indent(tree.source(), line) + 1 > start.column);
                    let message = if start.column > column && !after_deeper_line {
                        "unexpected indent"
                    } else {
                        "unindent does not match any outer indentation level"
                    };
                    return Err(ParseError::syntax_error(start, message));
                }
            }
            previous_line = Some(node.last_line());
        }
    }
    Ok(())
}

/// Nothing but indentation precedes the node on its line
fn opens_line(tree: &SyntaxTree, id: NodeId) -> bool {
    let source = tree.source();
    let offset = tree.node(id).byte_range().start;
    let line_start = source[..offset].rfind('\n').map_or(0, |index| index + 1);
    let before = &source[line_start..offset];
    leading_whitespace(before).len() == before.len()
}

fn line_indent(source: &str, line: usize) -> usize {
    source
        .lines()
        .nth(line.saturating_sub(1))
        .map_or(0, |text| leading_whitespace(text).len())
}

fn first_error(root: tree_sitter::Node<'_>) -> ParseError {
    let mut cursor = root.walk();
    let mut pending = vec![root];

    while let Some(node) = pending.pop() {
        if node.is_missing() {
            return ParseError::syntax_error(
                Position::from_point(node.start_position()),
                format!("missing `{}`", node.kind()),
            );
        }
        if node.is_error() {
            return ParseError::syntax_error(
                Position::from_point(node.start_position()),
                "invalid syntax",
            );
        }
        let children: Vec<_> = node
            .children(&mut cursor)
            .filter(tree_sitter::Node::has_error)
            .collect();
        pending.extend(children.into_iter().rev());
    }

    ParseError::syntax_error(Position::from_point(root.start_position()), "invalid syntax")
}
