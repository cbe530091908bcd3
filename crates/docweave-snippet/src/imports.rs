//! Import slicing
//!
//! Reduces a file's module-level imports to those binding a name a snippet
//! references. Matching is purely textual on the local binding name.

use docweave_syntax::{NodeId, NodeKind, SyntaxTree};
use indexmap::IndexSet;
use serde::Serialize;

/// One imported name and its optional alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImportedName {
    /// Dotted path as written (`os.path`, `List`)
    pub path: String,
    /// `as` alias, if any
    pub alias: Option<String>,
}

impl ImportedName {
    /// Name the import binds in the importing module
    ///
    /// `import a.b` binds `a`; any alias wins over the path.
    #[must_use]
    pub fn binding(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.split('.').next().unwrap_or(&self.path),
        }
    }

    fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {alias}", self.path),
            None => self.path.clone(),
        }
    }
}

/// Where the names of an import come from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ImportSource {
    /// `import a, b`
    Plain,
    /// `from module import a, b`
    From(String),
}

/// A module-level import statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImportStatement {
    /// Plain or from-import
    pub source: ImportSource,
    /// Imported names in source order
    pub names: Vec<ImportedName>,
    /// 1-based line of the statement
    pub line: usize,
}

impl ImportStatement {
    /// Build from an import node, `None` for any other node kind
    #[must_use]
    pub fn from_node(tree: &SyntaxTree, id: NodeId) -> Option<Self> {
        let source = match tree.kind(id) {
            NodeKind::Import => ImportSource::Plain,
            NodeKind::ImportFrom => {
                ImportSource::From(squeeze(tree.text(tree.child_by_field(id, "module_name")?)))
            }
            NodeKind::FutureImport => ImportSource::From("__future__".to_string()),
            _ => return None,
        };

        let names = tree
            .children_by_field(id, "name")
            .map(|name| imported_name(tree, name))
            .collect();

        Some(Self {
            source,
            names,
            line: tree.node(id).start().line,
        })
    }

    /// Keep only names whose binding satisfies `keep`; `None` if nothing is left
    #[must_use]
    pub fn retain<F>(&self, mut keep: F) -> Option<Self>
    where
        F: FnMut(&ImportedName) -> bool,
    {
        let names: Vec<_> = self.names.iter().filter(|&name| keep(name)).cloned().collect();
        (!names.is_empty()).then(|| Self {
            source: self.source.clone(),
            names,
            line: self.line,
        })
    }

    /// Render as a single line of Python
    #[must_use]
    pub fn render(&self) -> String {
        let names = self
            .names
            .iter()
            .map(ImportedName::render)
            .collect::<Vec<_>>()
            .join(", ");
        match &self.source {
            ImportSource::Plain => format!("import {names}"),
            ImportSource::From(module) => format!("from {module} import {names}"),
        }
    }
}

/// Imports needed by a snippet referencing `referenced`, one statement per line
///
/// Returns an empty string when no import is referenced.
#[must_use]
pub fn slice_imports(imports: &[ImportStatement], referenced: &IndexSet<String>) -> String {
    imports
        .iter()
        .filter_map(|statement| statement.retain(|name| referenced.contains(name.binding())))
        .map(|statement| statement.render())
        .collect::<Vec<_>>()
        .join("\n")
}

fn imported_name(tree: &SyntaxTree, id: NodeId) -> ImportedName {
    if tree.kind(id) == NodeKind::AliasedImport {
        let path = tree
            .child_by_field(id, "name")
            .map(|name| squeeze(tree.text(name)))
            .unwrap_or_default();
        let alias = tree
            .child_by_field(id, "alias")
            .map(|alias| tree.text(alias).to_string());
        ImportedName { path, alias }
    } else {
        ImportedName {
            path: squeeze(tree.text(id)),
            alias: None,
        }
    }
}

/// Drop whitespace inside dotted names (`a . b` → `a.b`)
fn squeeze(text: &str) -> String {
    text.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docweave_syntax::parse;

    fn imports_of(source: &str) -> Vec<ImportStatement> {
        let tree = parse(source).unwrap();
        tree.pre_order()
            .filter_map(|id| ImportStatement::from_node(&tree, id))
            .collect()
    }

    fn refs(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn parses_plain_and_from_imports() {
        let imports = imports_of("import os.path, sys as system\nfrom ..pkg import a, b as c\n");
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].source, ImportSource::Plain);
        assert_eq!(imports[0].names[0].binding(), "os");
        assert_eq!(imports[0].names[1].binding(), "system");
        assert_eq!(imports[1].source, ImportSource::From("..pkg".into()));
        assert_eq!(imports[1].names[1].binding(), "c");
        assert_eq!(imports[1].line, 2);
    }

    #[test]
    fn slice_keeps_only_referenced_names() {
        let imports = imports_of("import a\nimport b\nimport c\n");
        assert_eq!(slice_imports(&imports, &refs(&["b", "x"])), "import b");
    }

    #[test]
    fn slice_is_empty_without_references() {
        let imports = imports_of("import a\nfrom m import b, c\n");
        assert_eq!(slice_imports(&imports, &refs(&["zzz"])), "");
    }

    #[test]
    fn slice_trims_from_import_names() {
        let imports = imports_of("from typing import Any, List as L, Optional\n");
        assert_eq!(
            slice_imports(&imports, &refs(&["L", "Optional"])),
            "from typing import List as L, Optional"
        );
    }

    #[test]
    fn slice_matches_on_alias_not_path() {
        let imports = imports_of("import numpy as np\n");
        assert_eq!(slice_imports(&imports, &refs(&["numpy"])), "");
        assert_eq!(slice_imports(&imports, &refs(&["np"])), "import numpy as np");
    }

    #[test]
    fn wildcard_imports_are_dropped() {
        let imports = imports_of("from m import *\n");
        assert_eq!(imports.len(), 1);
        assert!(imports[0].names.is_empty());
        assert_eq!(slice_imports(&imports, &refs(&["anything"])), "");
    }

    #[test]
    fn future_imports() {
        let imports = imports_of("from __future__ import annotations\n");
        assert_eq!(imports[0].render(), "from __future__ import annotations");
    }
}
