//! Documentation literal injection
//!
//! Two insertion points are supported:
//!
//! - **File header**: first module statement, after a shebang and/or an
//!   encoding declaration
//! - **Definition body**: first body statement, directly after the line
//!   holding the `:` that ends the (possibly multi-line) header
//!
//! Every candidate is checked by [`crate::validate`] before it is returned; a
//! rejected candidate is never handed out.

use crate::docstring::docstring_lines;
use crate::edit::LineChange;
use crate::error::{InjectError, ValidationError};
use crate::validate::{validate_equivalence, validate_replacement};
use docweave_syntax::{leading_whitespace, parse, NodeId, NodeKind, SyntaxTree};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// PEP 263 encoding declaration
static CODING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t\x0c]*#.*?coding[:=][ \t]*[-_.a-zA-Z0-9]+").expect("static regex is valid")
});

/// Lines a body is indented past its header when nothing else says otherwise
const DEFAULT_INDENT: &str = "    ";

/// What to do when the target already has a documentation literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExistingDocPolicy {
    /// Leave the target unchanged
    #[default]
    Skip,
    /// Swap the existing literal for the new one
    Replace,
}

/// Successful injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedInjection {
    /// Validated candidate text
    pub text: String,
    /// The line change that produced `text` from the input
    pub change: LineChange,
}

impl AppliedInjection {
    /// Lines every position after the insertion point moved by
    #[inline]
    #[must_use]
    pub fn shift(&self) -> isize {
        self.change.delta()
    }
}

/// Outcome of an injection request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Injection {
    /// Literal inserted (or replaced) and validated
    Applied(AppliedInjection),
    /// Target already documented and the policy says skip
    AlreadyDocumented {
        /// Line of the existing literal
        line: usize,
    },
}

impl Injection {
    /// The applied injection, if any
    #[must_use]
    pub fn applied(self) -> Option<AppliedInjection> {
        match self {
            Self::Applied(applied) => Some(applied),
            Self::AlreadyDocumented { .. } => None,
        }
    }
}

/// Inserts documentation literals under an existing-documentation policy
#[derive(Debug, Clone, Copy, Default)]
pub struct DocInjector {
    policy: ExistingDocPolicy,
}

impl DocInjector {
    /// Create injector that skips documented targets
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the existing-documentation policy
    #[must_use]
    pub fn with_policy(mut self, policy: ExistingDocPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> ExistingDocPolicy {
        self.policy
    }

    /// Insert `doc` as the module's documentation literal
    ///
    /// # Errors
    /// - `InjectError::EmptyDocstring` if `doc` is blank
    /// - `InjectError::Parse` if `source` does not parse
    /// - `InjectError::SharedDocstringLine` when replacing a literal that shares its lines
    /// - `InjectError::Validation` if the candidate is rejected
    pub fn inject_module(&self, source: &str, doc: &str) -> Result<Injection, InjectError> {
        let tree = parse(source)?;
        let root = tree.root();

        let Some(existing) = tree.leading_docstring(root) else {
            let at = preamble_lines(source) + 1;
            let change = LineChange::insertion(at, docstring_lines(doc, "")?);
            return self.finish(source, change, validate_equivalence);
        };

        self.handle_existing(&tree, existing, doc)
    }

    /// Insert `doc` as the first body statement of the definition whose
    /// `def`/`class` keyword is on `header_line`
    ///
    /// # Errors
    /// - `InjectError::EmptyDocstring` if `doc` is blank
    /// - `InjectError::Parse` if `source` does not parse
    /// - `InjectError::NoDefinitionAt` if no definition starts on `header_line`
    /// - `InjectError::BodyOnHeaderLine` if the body shares the header's last line
    /// - `InjectError::SharedDocstringLine` when replacing a literal that shares its lines
    /// - `InjectError::Validation` if the candidate is rejected
    pub fn inject_definition(
        &self,
        source: &str,
        header_line: usize,
        doc: &str,
    ) -> Result<Injection, InjectError> {
        let tree = parse(source)?;
        let definition = tree
            .definitions()
            .find(|&id| tree.node(id).start().line == header_line)
            .ok_or(InjectError::NoDefinitionAt { line: header_line })?;

        if let Some(existing) = tree.leading_docstring(definition) {
            return self.handle_existing(&tree, existing, doc);
        }

        let body = tree
            .body(definition)
            .ok_or(InjectError::NoDefinitionAt { line: header_line })?;
        let header_end = header_end_line(&tree, definition, body);
        let first = tree
            .statements(body)
            .next()
            .ok_or(InjectError::BodyOnHeaderLine { line: header_end })?;

        let first_line = tree.node(first).start().line;
        if first_line <= header_end {
            return Err(InjectError::BodyOnHeaderLine { line: header_end });
        }

        let header_indent = line_at(source, tree.node(definition).start().line)
            .map(leading_whitespace)
            .unwrap_or_default();
        let body_indent = line_at(source, first_line)
            .map(leading_whitespace)
            .filter(|indent| indent.len() > header_indent.len())
            .map_or_else(|| format!("{header_indent}{DEFAULT_INDENT}"), str::to_string);

        let change = LineChange::insertion(header_end + 1, docstring_lines(doc, &body_indent)?);
        self.finish(source, change, validate_equivalence)
    }

    fn handle_existing(
        &self,
        tree: &SyntaxTree,
        existing: NodeId,
        doc: &str,
    ) -> Result<Injection, InjectError> {
        let node = tree.node(existing);
        let line = node.start().line;

        match self.policy {
            ExistingDocPolicy::Skip => {
                debug!(line, "Target already documented, skipping");
                Ok(Injection::AlreadyDocumented { line })
            }
            ExistingDocPolicy::Replace => {
                let source = tree.source();
                let range = node.byte_range();
                let before = &source[line_start(source, range.start)..range.start];
                let after = &source[range.end..line_end(source, range.end)];
                if !before.trim().is_empty() || !after.trim().is_empty() {
                    return Err(InjectError::SharedDocstringLine { line });
                }

                let indent = leading_whitespace(before);
                let remove = node.last_line() - line + 1;
                let change = LineChange::replacement(line, remove, docstring_lines(doc, indent)?);
                self.finish(source, change, |original, candidate| {
                    validate_replacement(original, candidate, 1)
                })
            }
        }
    }

    fn finish<V>(&self, source: &str, change: LineChange, validate: V) -> Result<Injection, InjectError>
    where
        V: Fn(&str, &str) -> Result<(), ValidationError>,
    {
        let text = change.apply(source)?;
        validate(source, &text)?;
        debug!(at = change.at, lines = change.insert.len(), "Injected documentation literal");
        Ok(Injection::Applied(AppliedInjection { text, change }))
    }
}

/// Number of leading shebang and encoding-declaration lines
#[must_use]
pub fn preamble_lines(source: &str) -> usize {
    let mut count = 0;
    for (index, line) in source.lines().take(2).enumerate() {
        if (index == 0 && line.starts_with("#!")) || CODING.is_match(line) {
            count = index + 1;
        } else if !line.trim_start().starts_with('#') {
            break;
        }
    }
    count
}

/// Line of the `:` token that closes a definition header
///
/// Parameters, bases and the return annotation are named nodes, so the last
/// anonymous token ahead of the body is that colon.
fn header_end_line(tree: &SyntaxTree, definition: NodeId, body: NodeId) -> usize {
    tree.children(definition)
        .iter()
        .copied()
        .take_while(|&child| child != body)
        .filter(|&child| tree.kind(child) == NodeKind::Token)
        .last()
        .map_or_else(|| tree.node(definition).start().line, |colon| tree.node(colon).start().line)
}

fn line_at(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.checked_sub(1)?)
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |index| index + 1)
}

fn line_end(source: &str, offset: usize) -> usize {
    source[offset..].find('\n').map_or(source.len(), |index| offset + index)
}
