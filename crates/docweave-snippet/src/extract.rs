//! Snippet extraction
//!
//! One stable pre-order walk per file collects every function and class plus
//! the module-level imports. Output order follows source order, so repeated
//! extraction of the same text is identical.

use crate::definition::{DefinitionKind, SourceDefinition};
use crate::error::{PathError, SnippetError};
use crate::imports::{slice_imports, ImportStatement};
use crate::naming::{expected_test_location, module_path, TestLayout};
use crate::references::{assigned_identifiers, referenced_identifiers};
use crate::snippet::CodeSnippet;
use docweave_syntax::{extract_lines, parse, NodeId, NodeKind, SyntaxTree};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a source text came from and how to name its tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    file_path: PathBuf,
    project_root: Option<PathBuf>,
    layout: TestLayout,
}

impl ExtractOptions {
    /// Options for a file with no declared project root
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            project_root: None,
            layout: TestLayout::default(),
        }
    }

    /// Declare the project root used for module paths
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Set the test layout
    #[must_use]
    pub fn with_layout(mut self, layout: TestLayout) -> Self {
        self.layout = layout;
        self
    }

    /// File path
    #[inline]
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Declared project root
    #[inline]
    #[must_use]
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Test layout
    #[inline]
    #[must_use]
    pub fn layout(&self) -> TestLayout {
        self.layout
    }
}

/// Everything extracted from one file
#[derive(Debug, Clone)]
pub struct FileSnippets {
    /// Module-level imports in source order
    pub imports: Vec<ImportStatement>,
    /// Functions and classes in pre-order
    pub definitions: Vec<SourceDefinition>,
    /// One snippet per definition, same order
    pub snippets: Vec<CodeSnippet>,
    /// The whole file as a module snippet
    pub module: CodeSnippet,
}

/// Parse `source` and extract its snippets
///
/// # Errors
/// - `SnippetError::Parse` if the source is not valid Python
/// - `SnippetError::Path` if the file is not under the declared project root
pub fn extract_snippets(source: &str, options: &ExtractOptions) -> Result<FileSnippets, SnippetError> {
    let tree = parse(source)?;
    Ok(extract_from_tree(&tree, options)?)
}

/// Extract snippets from an already parsed tree
///
/// # Errors
/// Returns `PathError::NotUnderRoot` if the file is not under the declared
/// project root
pub fn extract_from_tree(tree: &SyntaxTree, options: &ExtractOptions) -> Result<FileSnippets, PathError> {
    let context = FileContext::new(options)?;

    let mut imports = Vec::new();
    let mut definitions = Vec::new();

    for id in tree.pre_order() {
        match tree.kind(id) {
            NodeKind::Function | NodeKind::Class => {
                definitions.extend(SourceDefinition::from_node(tree, id));
            }
            NodeKind::Import | NodeKind::ImportFrom | NodeKind::FutureImport => {
                if tree.enclosing_definitions(id).is_empty() {
                    imports.extend(ImportStatement::from_node(tree, id));
                }
            }
            NodeKind::Module
            | NodeKind::DecoratedDefinition
            | NodeKind::Decorator
            | NodeKind::Block
            | NodeKind::AliasedImport
            | NodeKind::ScopeDeclaration
            | NodeKind::ExpressionStatement
            | NodeKind::Assignment
            | NodeKind::AugmentedAssignment
            | NodeKind::Identifier
            | NodeKind::StringLiteral
            | NodeKind::Comment
            | NodeKind::Parameters
            | NodeKind::DefaultParameter
            | NodeKind::TypedParameter
            | NodeKind::SplatPattern
            | NodeKind::KeywordArgument
            | NodeKind::Attribute
            | NodeKind::Statement
            | NodeKind::Other
            | NodeKind::Token
            | NodeKind::Error => {}
        }
    }

    let snippets = definitions
        .iter()
        .map(|definition| context.snippet(tree, definition, &imports))
        .collect();
    let module = context.snippet(tree, &SourceDefinition::module(tree), &imports);

    debug!(
        file = %options.file_path.display(),
        definitions = definitions.len(),
        imports = imports.len(),
        "Extracted snippets"
    );

    Ok(FileSnippets {
        imports,
        definitions,
        snippets,
        module,
    })
}

/// Per-file values shared by every snippet of the file
struct FileContext<'a> {
    file_path: &'a Path,
    project_path: Option<PathBuf>,
    module_path: Option<String>,
    layout: TestLayout,
}

impl<'a> FileContext<'a> {
    fn new(options: &'a ExtractOptions) -> Result<Self, PathError> {
        let (project_path, module_path) = match options.project_root() {
            Some(root) => {
                let module = module_path(&options.file_path, root)?;
                let relative = options
                    .file_path
                    .strip_prefix(root)
                    .map_err(|_| PathError::not_under_root(&options.file_path, root))?
                    .to_path_buf();
                (Some(relative), Some(module))
            }
            None => (None, None),
        };

        Ok(Self {
            file_path: &options.file_path,
            project_path,
            module_path,
            layout: options.layout,
        })
    }

    fn snippet(
        &self,
        tree: &SyntaxTree,
        definition: &SourceDefinition,
        imports: &[ImportStatement],
    ) -> CodeSnippet {
        let root = definition.span_root(tree);
        let referenced = referenced_identifiers(tree, root);
        let assigned = assigned_identifiers(tree, root);
        let qualified_path = definition.qualified_path();

        let (text, docstring) = match definition.kind {
            DefinitionKind::Module => (module_text(tree), docstring_text(tree, tree.root())),
            DefinitionKind::Function | DefinitionKind::Class => (
                extract_lines(tree.source(), definition.span),
                docstring_text(tree, definition.node),
            ),
        };

        let test_location = match definition.kind {
            DefinitionKind::Module => None,
            DefinitionKind::Function | DefinitionKind::Class => self
                .module_path
                .as_deref()
                .and_then(|module| expected_test_location(module, &qualified_path, self.layout)),
        };

        CodeSnippet {
            text,
            name: definition.name.clone(),
            kind: definition.kind,
            start_line: definition.start_line(),
            end_line: definition.end_line(),
            header_line: definition.header_line,
            file_path: self.file_path.to_path_buf(),
            project_path: self.project_path.clone(),
            qualified_path,
            module_path: self.module_path.clone(),
            imports: slice_imports(imports, &referenced),
            referenced,
            assigned,
            test_location,
            docstring,
        }
    }
}

fn docstring_text(tree: &SyntaxTree, id: NodeId) -> Option<String> {
    let statement = tree.leading_docstring(id)?;
    let literal = tree
        .named_children(statement)
        .find(|&child| tree.kind(child) == NodeKind::StringLiteral)?;
    Some(tree.text(literal).to_string())
}

fn module_text(tree: &SyntaxTree) -> String {
    let source = tree.source();
    if source.is_empty() || source.ends_with('\n') {
        source.to_string()
    } else {
        format!("{source}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_DEFS: &str = "import os\n\n\ndef first():\n    return os.getcwd()\n\n\nclass Second:\n    \"\"\"Doc.\"\"\"\n\n    x = 1\n";

    #[test]
    fn two_definitions_in_order() {
        let file = extract_snippets(TWO_DEFS, &ExtractOptions::new("mod.py")).unwrap();
        let names: Vec<_> = file.snippets.iter().map(CodeSnippet::name).collect();
        assert_eq!(names, vec!["first", "Second"]);
        assert!(file.snippets[0].text().starts_with("def first():"));
        assert!(file.snippets[1].text().starts_with("class Second:"));
        assert_eq!(file.snippets[0].imports(), "import os");
        assert_eq!(file.snippets[1].imports(), "");
    }

    #[test]
    fn docstrings_are_reported() {
        let file = extract_snippets(TWO_DEFS, &ExtractOptions::new("mod.py")).unwrap();
        assert_eq!(file.snippets[0].docstring(), None);
        assert_eq!(file.snippets[1].docstring(), Some("\"\"\"Doc.\"\"\""));
        assert_eq!(file.module.docstring(), None);
    }

    #[test]
    fn module_path_requires_root() {
        let file = extract_snippets(TWO_DEFS, &ExtractOptions::new("mod.py")).unwrap();
        assert!(matches!(
            file.snippets[0].module_path(),
            Err(PathError::NoProjectRoot(_))
        ));
        assert!(file.snippets[0].test_location().is_none());
    }

    #[test]
    fn file_outside_root_is_fatal() {
        let options = ExtractOptions::new("/elsewhere/mod.py").with_project_root("/proj");
        let err = extract_snippets(TWO_DEFS, &options).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn imports_inside_functions_are_not_module_level() {
        let source = "import a\n\ndef f():\n    import b\n    return a, b\n";
        let file = extract_snippets(source, &ExtractOptions::new("m.py")).unwrap();
        assert_eq!(file.imports.len(), 1);
        assert_eq!(file.snippets[0].imports(), "import a");
    }

    #[test]
    fn parse_errors_are_not_fatal() {
        let err = extract_snippets("def broken(:\n", &ExtractOptions::new("m.py")).unwrap_err();
        assert!(matches!(err, SnippetError::Parse(_)));
        assert!(!err.is_fatal());
    }
}
