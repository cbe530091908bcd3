//! Code snippets
//!
//! A [`CodeSnippet`] is the immutable text of one definition plus everything
//! derived from it: identifiers, import slice, module path and expected test
//! location. Snippets are built by [`crate::extract`] and discarded after use.

use crate::definition::DefinitionKind;
use crate::error::PathError;
use crate::naming::{is_test_module, TestLocation};
use crate::qualified::QualifiedPath;
use docweave_syntax::{dedent, LineSpan};
use indexmap::IndexSet;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Verbatim text of a definition and its derived metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSnippet {
    pub(crate) text: String,
    pub(crate) name: String,
    pub(crate) kind: DefinitionKind,
    pub(crate) start_line: usize,
    pub(crate) end_line: usize,
    pub(crate) header_line: usize,
    pub(crate) file_path: PathBuf,
    pub(crate) project_path: Option<PathBuf>,
    pub(crate) qualified_path: QualifiedPath,
    pub(crate) module_path: Option<String>,
    pub(crate) referenced: IndexSet<String>,
    pub(crate) assigned: IndexSet<String>,
    pub(crate) imports: String,
    pub(crate) test_location: Option<TestLocation>,
    pub(crate) docstring: Option<String>,
}

impl CodeSnippet {
    /// Verbatim text, ending in exactly one `\n`
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Declared name (empty for module snippets)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function, class or module
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    /// First line, decorators included
    #[inline]
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Last line of the body
    #[inline]
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// Line of the `def`/`class` keyword
    #[inline]
    #[must_use]
    pub fn header_line(&self) -> usize {
        self.header_line
    }

    /// Inclusive span in the owning file
    #[inline]
    #[must_use]
    pub fn span(&self) -> LineSpan {
        LineSpan::new(self.start_line, self.end_line)
    }

    /// Owning file as given to extraction
    #[inline]
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Owning file relative to the project root
    #[inline]
    #[must_use]
    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// Enclosing names plus own name, outermost first
    #[inline]
    #[must_use]
    pub fn qualified_path(&self) -> &QualifiedPath {
        &self.qualified_path
    }

    /// Dotted module path of the owning file
    ///
    /// # Errors
    /// Returns `PathError::NoProjectRoot` if the snippet was extracted without a
    /// project root
    pub fn module_path(&self) -> Result<&str, PathError> {
        self.module_path
            .as_deref()
            .ok_or_else(|| PathError::NoProjectRoot(self.file_path.display().to_string()))
    }

    /// Names occurring anywhere in the span, first occurrence first
    #[inline]
    #[must_use]
    pub fn referenced_identifiers(&self) -> &IndexSet<String> {
        &self.referenced
    }

    /// Plain names bound by assignments in the span
    #[inline]
    #[must_use]
    pub fn assigned_identifiers(&self) -> &IndexSet<String> {
        &self.assigned
    }

    /// Module-level imports the snippet references, one per line
    #[inline]
    #[must_use]
    pub fn imports(&self) -> &str {
        &self.imports
    }

    /// Existing leading documentation literal, quotes included
    #[inline]
    #[must_use]
    pub fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    /// Snippet lives in the `tests` package
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.module_path.as_deref().is_some_and(is_test_module)
    }

    /// Where the covering test is expected, `None` for tests and modules
    #[inline]
    #[must_use]
    pub fn test_location(&self) -> Option<&TestLocation> {
        self.test_location.as_ref()
    }

    /// Dotted module expected to hold the covering test
    #[must_use]
    pub fn expected_test_module(&self) -> Option<&str> {
        self.test_location.as_ref().map(|loc| loc.module_path.as_str())
    }

    /// Name of the covering test function
    #[must_use]
    pub fn expected_test_identifier(&self) -> Option<&str> {
        self.test_location.as_ref().map(|loc| loc.identifier.as_str())
    }

    /// Text with the header line's indentation removed
    #[must_use]
    pub fn dedented_text(&self) -> String {
        dedent(&self.text)
    }

    /// Import slice, a blank line, then the dedented text
    ///
    /// Without referenced imports this is just the dedented text.
    #[must_use]
    pub fn text_with_imports(&self) -> String {
        if self.imports.is_empty() {
            self.dedented_text()
        } else {
            format!("{}\n\n{}", self.imports, self.dedented_text())
        }
    }

    /// Key identifying this snippet within a batch (`file:qualified.path`)
    #[must_use]
    pub fn key(&self) -> String {
        if self.qualified_path.is_empty() {
            self.file_path.display().to_string()
        } else {
            format!("{}:{}", self.file_path.display(), self.qualified_path)
        }
    }
}

impl std::fmt::Display for CodeSnippet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({}:{})",
            self.kind,
            self.qualified_path,
            self.file_path.display(),
            self.span()
        )
    }
}
