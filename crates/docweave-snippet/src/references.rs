//! Identifier collection
//!
//! Names are gathered from the structural tree, in first-occurrence order,
//! without resolving what they refer to.

use docweave_syntax::{NodeId, NodeKind, SyntaxTree};
use indexmap::IndexSet;

/// Every name occurrence in the subtree rooted at `id`
///
/// Declared definition names, attribute members, keyword-argument names,
/// parameter names and names inside import statements are not name
/// occurrences and are skipped.
#[must_use]
pub fn referenced_identifiers(tree: &SyntaxTree, id: NodeId) -> IndexSet<String> {
    tree.descendants(id)
        .filter(|&node| tree.kind(node) == NodeKind::Identifier && is_name_occurrence(tree, node))
        .map(|node| tree.text(node).to_string())
        .collect()
}

/// Plain names bound by `=` assignments in the subtree rooted at `id`
///
/// Nested definitions are scanned too. Tuple targets, attribute and subscript
/// targets, augmented assignments and bare annotations bind nothing here.
#[must_use]
pub fn assigned_identifiers(tree: &SyntaxTree, id: NodeId) -> IndexSet<String> {
    tree.descendants(id)
        .filter(|&node| tree.kind(node) == NodeKind::Assignment)
        .filter(|&node| tree.child_by_field(node, "right").is_some())
        .filter_map(|node| tree.child_by_field(node, "left"))
        .filter(|&target| tree.kind(target) == NodeKind::Identifier)
        .map(|target| tree.text(target).to_string())
        .collect()
}

fn is_name_occurrence(tree: &SyntaxTree, id: NodeId) -> bool {
    let Some(parent) = tree.parent(id) else {
        return true;
    };
    let field = tree.node(id).field();

    let direct = match tree.kind(parent) {
        NodeKind::Function
        | NodeKind::Class
        | NodeKind::KeywordArgument
        | NodeKind::DefaultParameter => field != Some("name"),
        NodeKind::Attribute => field != Some("attribute"),
        NodeKind::Parameters | NodeKind::ScopeDeclaration => false,
        NodeKind::TypedParameter => field == Some("type"),
        // `*args` declares a parameter; `*rest` in a pattern or call names one
        NodeKind::SplatPattern => !tree.parent(parent).is_some_and(|grand| {
            matches!(tree.kind(grand), NodeKind::Parameters | NodeKind::TypedParameter)
        }),
        NodeKind::Module
        | NodeKind::DecoratedDefinition
        | NodeKind::Decorator
        | NodeKind::Block
        | NodeKind::Import
        | NodeKind::ImportFrom
        | NodeKind::FutureImport
        | NodeKind::AliasedImport
        | NodeKind::ExpressionStatement
        | NodeKind::Assignment
        | NodeKind::AugmentedAssignment
        | NodeKind::Identifier
        | NodeKind::StringLiteral
        | NodeKind::Comment
        | NodeKind::Statement
        | NodeKind::Other
        | NodeKind::Token
        | NodeKind::Error => true,
    };

    direct && !tree.ancestors(id).any(|ancestor| tree.kind(ancestor).is_import())
}
