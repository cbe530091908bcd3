//! docweave Syntax Layer
//!
//! Structural model of Python source built on tree-sitter.
//!
//! # Core Concepts
//!
//! - [`SyntaxTree`]: immutable arena of nodes with index-based parent links
//! - [`NodeKind`]: closed classification of grammar kinds
//! - [`LineSpan`]: inclusive line range of a definition, decorators included
//! - [`ParseError`]: rejection of source that is not valid Python
//!
//! # Example
//!
//! ```rust
//! use docweave_syntax::{definition_span, parse, LineSpan};
//!
//! let tree = parse("@cache\ndef f():\n    return 1\n").unwrap();
//! let f = tree.definitions().next().unwrap();
//!
//! assert_eq!(tree.name(f), Some("f"));
//! assert_eq!(definition_span(&tree, f), LineSpan::new(1, 3));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod kind;
pub mod parser;
pub mod span;
pub mod text;
pub mod tree;

// Re-exports
pub use error::ParseError;
pub use kind::NodeKind;
pub use parser::{parse, PythonParser};
pub use span::{definition_span, extract_lines, LineSpan};
pub use text::{common_margin, dedent, detect_line_ending, indent, leading_whitespace};
pub use tree::{NodeId, Position, SyntaxNode, SyntaxTree};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
