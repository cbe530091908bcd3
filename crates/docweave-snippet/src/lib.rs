//! docweave Snippet Model
//!
//! Turns parsed Python files into immutable [`CodeSnippet`]s, one per function
//! or class, with everything downstream tooling needs to know about them.
//!
//! # Core Concepts
//!
//! - [`SourceDefinition`]: a function, class or module located in a tree
//! - [`CodeSnippet`]: verbatim text plus identifiers, import slice and test location
//! - [`QualifiedPath`]: chain of enclosing names (`Greeter.greet`)
//! - [`TestIndex`]: expected versus existing tests over a batch of snippets
//!
//! # Example
//!
//! ```rust
//! use docweave_snippet::prelude::*;
//!
//! let source = "import os\n\nclass BarBaz:\n    def quux(self):\n        return os.sep\n";
//! let options = ExtractOptions::new("/proj/pkg/mod.py").with_project_root("/proj");
//! let file = extract_snippets(source, &options).unwrap();
//!
//! let quux = &file.snippets[1];
//! assert_eq!(quux.qualified_path().to_string(), "BarBaz.quux");
//! assert_eq!(quux.imports(), "import os");
//! assert_eq!(quux.expected_test_identifier(), Some("test_bar_baz_quux"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod definition;
pub mod error;
pub mod extract;
pub mod imports;
pub mod naming;
pub mod needed;
pub mod qualified;
pub mod references;
pub mod snippet;

// Re-exports
pub use definition::{DefinitionKind, SourceDefinition};
pub use error::{PathError, SnippetError};
pub use extract::{extract_from_tree, extract_snippets, ExtractOptions, FileSnippets};
pub use imports::{slice_imports, ImportSource, ImportStatement, ImportedName};
pub use naming::{
    camel_to_snake, expected_test_location, import_path_to_file_path, is_test_module,
    module_path, test_identifier, TestLayout, TestLocation, TESTS_ROOT,
};
pub use needed::{needed_tests, NeededTest, TestIndex};
pub use qualified::{QualifiedPath, QualifiedPathError};
pub use references::{assigned_identifiers, referenced_identifiers};
pub use snippet::CodeSnippet;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        extract_snippets, needed_tests, CodeSnippet, DefinitionKind, ExtractOptions,
        FileSnippets, PathError, QualifiedPath, SnippetError, TestIndex, TestLayout,
        TestLocation,
    };
}
