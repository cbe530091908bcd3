//! Parsed definitions
//!
//! A [`SourceDefinition`] is the position-bearing view of one function, class
//! or module in a freshly parsed tree. Snippets are derived from it.

use crate::qualified::QualifiedPath;
use docweave_syntax::{definition_span, LineSpan, NodeId, NodeKind, SyntaxTree};
use serde::Serialize;

/// Kind of definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    /// Whole file
    Module,
    /// `def` or `async def`
    Function,
    /// `class`
    Class,
}

impl DefinitionKind {
    /// Map a tree node kind to a definition kind
    #[must_use]
    pub fn from_node(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Module => Some(Self::Module),
            NodeKind::Function => Some(Self::Function),
            NodeKind::Class => Some(Self::Class),
            NodeKind::DecoratedDefinition
            | NodeKind::Decorator
            | NodeKind::Block
            | NodeKind::Import
            | NodeKind::ImportFrom
            | NodeKind::FutureImport
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
            | NodeKind::Error => None,
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Module => "module",
            Self::Function => "function",
            Self::Class => "class",
        })
    }
}

/// A function, class or module located in a parsed tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDefinition {
    /// Declared name (empty for modules)
    pub name: String,
    /// Function, class or module
    pub kind: DefinitionKind,
    /// Decorator spans in source order
    pub decorators: Vec<LineSpan>,
    /// Line holding the `def`/`class` keyword (1 for modules)
    pub header_line: usize,
    /// Inclusive span including decorators
    pub span: LineSpan,
    /// Enclosing definition names, outermost first
    pub parents: QualifiedPath,
    /// Node of the definition itself
    pub node: NodeId,
}

impl SourceDefinition {
    /// Locate the definition at `id`; `None` unless it is a function or class
    #[must_use]
    pub fn from_node(tree: &SyntaxTree, id: NodeId) -> Option<Self> {
        let kind = DefinitionKind::from_node(tree.kind(id))?;
        if kind == DefinitionKind::Module {
            return None;
        }

        let parents = tree
            .enclosing_definitions(id)
            .into_iter()
            .filter_map(|ancestor| tree.name(ancestor).map(str::to_string))
            .collect::<Vec<_>>()
            .into();

        let decorators = tree
            .decorators(id)
            .into_iter()
            .map(|decorator| {
                let node = tree.node(decorator);
                LineSpan::new(node.start().line, node.last_line())
            })
            .collect();

        Some(Self {
            name: tree.name(id).unwrap_or_default().to_string(),
            kind,
            decorators,
            header_line: tree.node(id).start().line,
            span: definition_span(tree, id),
            parents,
            node: id,
        })
    }

    /// The whole file as a module definition
    #[must_use]
    pub fn module(tree: &SyntaxTree) -> Self {
        let root = tree.root();
        let last = tree.source().lines().count().max(1);
        Self {
            name: String::new(),
            kind: DefinitionKind::Module,
            decorators: Vec::new(),
            header_line: 1,
            span: LineSpan::new(1, last),
            parents: QualifiedPath::default(),
            node: root,
        }
    }

    /// Qualified path: parents followed by the definition's own name
    #[must_use]
    pub fn qualified_path(&self) -> QualifiedPath {
        if self.kind == DefinitionKind::Module {
            return QualifiedPath::default();
        }
        self.parents.child(self.name.clone())
    }

    /// First line of the span
    #[inline]
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.span.start()
    }

    /// Last line of the span
    #[inline]
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.span.end()
    }

    /// Node whose subtree covers the span (the decorated wrapper if any)
    #[must_use]
    pub fn span_root(&self, tree: &SyntaxTree) -> NodeId {
        match tree.parent(self.node) {
            Some(parent) if tree.kind(parent) == NodeKind::DecoratedDefinition => parent,
            _ => self.node,
        }
    }
}
