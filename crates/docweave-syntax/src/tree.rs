//! Arena-backed structural tree
//!
//! Nodes are stored in pre-order in a flat arena and refer to each other by
//! [`NodeId`]. The tree is immutable once built: ancestry is answered by
//! following index-based parent links, never by annotating nodes in place.

use crate::kind::NodeKind;
use std::ops::Range;

/// Index of a node within its [`SyntaxTree`]
///
/// Ids are assigned in pre-order, so `a < b` means `a` is visited before `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// 1-based line and column (column counted in bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number, starting at 1
    pub line: usize,
    /// Byte column, starting at 1
    pub column: usize,
}

impl Position {
    pub(crate) fn from_point(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row + 1,
            column: point.column + 1,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One node of the structural tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: NodeKind,
    grammar: &'static str,
    field: Option<&'static str>,
    start: Position,
    end: Position,
    last_line: usize,
    bytes: Range<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    subtree_end: usize,
}

impl SyntaxNode {
    /// Structural kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Grammar kind name as produced by the parser
    #[inline]
    #[must_use]
    pub fn grammar(&self) -> &'static str {
        self.grammar
    }

    /// Field name under which the parent holds this node
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Start position
    #[inline]
    #[must_use]
    pub fn start(&self) -> Position {
        self.start
    }

    /// End position (exclusive column)
    #[inline]
    #[must_use]
    pub fn end(&self) -> Position {
        self.end
    }

    /// Last line holding any of this node's text
    ///
    /// Differs from `end().line` when the node ends with a line terminator.
    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.last_line
    }

    /// Byte range in the source
    #[inline]
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.bytes.clone()
    }

    /// Parent node, `None` for the root
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in source order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Parsed source plus its node arena
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    pub(crate) fn from_ts(tree: &tree_sitter::Tree, source: &str) -> Self {
        let mut nodes = Vec::new();
        let mut cursor = tree.walk();
        push_subtree(&mut cursor, None, &mut nodes);
        Self {
            source: source.to_string(),
            nodes,
        }
    }

    /// Root (module) node
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Source text the tree was built from
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Node count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (never true for a parsed tree)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    /// Structural kind of a node
    #[inline]
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    /// Verbatim source text of a node
    #[inline]
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        &self.source[self.nodes[id.0].bytes.clone()]
    }

    /// Direct children of a node
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of a node
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All node ids in pre-order
    pub fn pre_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Node ids of the subtree rooted at `id`, in pre-order, `id` included
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (id.0..self.nodes[id.0].subtree_end).map(NodeId)
    }

    /// First id after the subtree rooted at `id`
    #[inline]
    #[must_use]
    pub fn subtree_end(&self, id: NodeId) -> usize {
        self.nodes[id.0].subtree_end
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// First child stored under `field`
    #[must_use]
    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children_by_field(id, field).next()
    }

    /// Every child stored under `field`
    pub fn children_by_field<'a>(
        &'a self,
        id: NodeId,
        field: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.nodes[child.0].field == Some(field))
    }

    /// Named children, skipping anonymous tokens
    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) != NodeKind::Token)
    }

    /// Declared name of a function or class
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        if !self.kind(id).is_definition() {
            return None;
        }
        self.child_by_field(id, "name").map(|name| self.text(name))
    }

    /// Decorators attached to a function or class, in source order
    #[must_use]
    pub fn decorators(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) if self.kind(parent) == NodeKind::DecoratedDefinition => self
                .children(parent)
                .iter()
                .copied()
                .filter(|&child| self.kind(child) == NodeKind::Decorator)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every function and class in pre-order
    pub fn definitions(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pre_order().filter(move |&id| self.kind(id).is_definition())
    }

    /// Enclosing functions and classes, outermost first, `id` excluded
    #[must_use]
    pub fn enclosing_definitions(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain: Vec<NodeId> = self
            .ancestors(id)
            .filter(|&ancestor| self.kind(ancestor).is_definition())
            .collect();
        chain.reverse();
        chain
    }

    /// Body block of a function or class
    #[must_use]
    pub fn body(&self, id: NodeId) -> Option<NodeId> {
        if !self.kind(id).is_definition() {
            return None;
        }
        self.child_by_field(id, "body")
    }

    /// Statements held by a module or block, comments excluded
    pub fn statements(&self, container: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(container)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child).is_statement())
    }

    /// Leading documentation literal of a module, block, function or class
    ///
    /// A documentation literal is a lone string expression occupying the first
    /// statement slot.
    #[must_use]
    pub fn leading_docstring(&self, id: NodeId) -> Option<NodeId> {
        let container = match self.kind(id) {
            NodeKind::Function | NodeKind::Class => self.body(id)?,
            NodeKind::Module | NodeKind::Block => id,
            _ => return None,
        };
        let first = self.statements(container).next()?;
        self.is_literal_statement(first).then_some(first)
    }

    /// Statement consisting of nothing but a plain (non-bytes, non-formatted)
    /// string literal
    #[must_use]
    pub fn is_literal_statement(&self, id: NodeId) -> bool {
        if self.kind(id) != NodeKind::ExpressionStatement {
            return false;
        }
        let mut named = self
            .named_children(id)
            .filter(|&child| self.kind(child) != NodeKind::Comment);
        match (named.next(), named.next()) {
            (Some(only), None) if self.kind(only) == NodeKind::StringLiteral => self
                .descendants(only)
                .filter(|&part| self.kind(part) == NodeKind::StringLiteral)
                .all(|part| is_plain_string_prefix(self.text(part))),
            _ => false,
        }
    }

    /// `id` is the leading documentation literal of its parent container
    #[must_use]
    pub fn is_leading_docstring(&self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(parent) if self.kind(parent).is_statement_container() => {
                self.leading_docstring(parent) == Some(id)
            }
            _ => false,
        }
    }
}

/// Prefix letters ahead of the opening quote allow a documentation literal
fn is_plain_string_prefix(literal: &str) -> bool {
    let prefix = literal.find(['"', '\'']).map_or(literal, |quote| &literal[..quote]);
    !prefix.contains(['f', 'F', 'b', 'B', 't', 'T'])
}

fn push_subtree(
    cursor: &mut tree_sitter::TreeCursor<'_>,
    parent: Option<NodeId>,
    nodes: &mut Vec<SyntaxNode>,
) -> NodeId {
    let node = cursor.node();
    let id = NodeId(nodes.len());
    let start = node.start_position();
    let end = node.end_position();
    let last_row = if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    };

    nodes.push(SyntaxNode {
        kind: NodeKind::classify(node.kind(), node.is_named()),
        grammar: node.kind(),
        field: cursor.field_name(),
        start: Position::from_point(start),
        end: Position::from_point(end),
        last_line: last_row + 1,
        bytes: node.byte_range(),
        parent,
        children: Vec::new(),
        subtree_end: 0,
    });

    let mut children = Vec::new();
    if cursor.goto_first_child() {
        loop {
            children.push(push_subtree(cursor, Some(id), nodes));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }

    let subtree_end = nodes.len();
    let entry = &mut nodes[id.0];
    entry.children = children;
    entry.subtree_end = subtree_end;
    id
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::NodeKind;

    const NESTED: &str = "\
class Outer:
    \"\"\"Outer doc.\"\"\"

    @staticmethod
    def inner(x):
        return x
";

    #[test]
    fn root_is_module() {
        let tree = parse(NESTED).unwrap();
        assert_eq!(tree.kind(tree.root()), NodeKind::Module);
        assert!(tree.parent(tree.root()).is_none());
    }

    #[test]
    fn definitions_in_pre_order() {
        let tree = parse(NESTED).unwrap();
        let names: Vec<_> = tree
            .definitions()
            .filter_map(|id| tree.name(id))
            .collect();
        assert_eq!(names, vec!["Outer", "inner"]);
    }

    #[test]
    fn enclosing_chain_is_outermost_first() {
        let tree = parse(NESTED).unwrap();
        let inner = tree.definitions().nth(1).unwrap();
        let chain: Vec<_> = tree
            .enclosing_definitions(inner)
            .into_iter()
            .filter_map(|id| tree.name(id))
            .collect();
        assert_eq!(chain, vec!["Outer"]);
    }

    #[test]
    fn decorators_are_attached() {
        let tree = parse(NESTED).unwrap();
        let inner = tree.definitions().nth(1).unwrap();
        let decorators = tree.decorators(inner);
        assert_eq!(decorators.len(), 1);
        assert_eq!(tree.text(decorators[0]), "@staticmethod");
    }

    #[test]
    fn leading_docstring_detection() {
        let tree = parse(NESTED).unwrap();
        let outer = tree.definitions().next().unwrap();
        let inner = tree.definitions().nth(1).unwrap();

        let doc = tree.leading_docstring(outer).unwrap();
        assert_eq!(tree.text(doc), "\"\"\"Outer doc.\"\"\"");
        assert!(tree.is_leading_docstring(doc));
        assert!(tree.leading_docstring(inner).is_none());
        assert!(tree.leading_docstring(tree.root()).is_none());
    }

    #[test]
    fn formatted_and_bytes_literals_are_not_docstrings() {
        for source in [
            "def f():\n    f\"doc {x}\"\n",
            "def f():\n    b\"doc\"\n",
            "def f():\n    \"doc \" F\"{x}\"\n",
        ] {
            let tree = parse(source).unwrap();
            let f = tree.definitions().next().unwrap();
            assert!(tree.leading_docstring(f).is_none(), "{source}");
        }
        for source in ["def f():\n    r\"doc\"\n", "def f():\n    u'doc' 'more'\n"] {
            let tree = parse(source).unwrap();
            let f = tree.definitions().next().unwrap();
            assert!(tree.leading_docstring(f).is_some(), "{source}");
        }
    }

    #[test]
    fn descendants_cover_subtree() {
        let tree = parse(NESTED).unwrap();
        let inner = tree.definitions().nth(1).unwrap();
        let end = tree.subtree_end(inner);
        assert!(tree.descendants(inner).all(|id| id >= inner && id.index() < end));
        assert_eq!(tree.descendants(tree.root()).count(), tree.len());
    }

    #[test]
    fn last_line_ignores_trailing_newline() {
        let tree = parse("def f():\n    return 1\n").unwrap();
        let f = tree.definitions().next().unwrap();
        assert_eq!(tree.node(f).start().line, 1);
        assert_eq!(tree.node(f).last_line(), 2);
    }
}
