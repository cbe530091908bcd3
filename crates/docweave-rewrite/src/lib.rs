//! docweave Rewrite Engine
//!
//! Inserts documentation literals into Python source and proves, by
//! comparing parse trees, that nothing else changed.
//!
//! # Core Concepts
//!
//! - [`DocInjector`]: file-header and definition-body insertion under an
//!   [`ExistingDocPolicy`]
//! - [`validate_equivalence`]: lockstep structural comparison of before/after text
//! - [`LineChange`]: whole-line edit, applied bottom-up with [`apply_changes`]
//!
//! # Example
//!
//! ```rust
//! use docweave_rewrite::{DocInjector, Injection};
//!
//! let source = "def add(a, b):\n    return a + b\n";
//! let Injection::Applied(result) = DocInjector::new().inject_definition(source, 1, "Add two numbers.").unwrap() else {
//!     panic!("not applied");
//! };
//!
//! assert_eq!(result.text, "def add(a, b):\n    \"\"\"Add two numbers.\"\"\"\n    return a + b\n");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod docstring;
pub mod edit;
pub mod error;
pub mod inject;
pub mod validate;

// Re-exports
pub use docstring::{docstring_lines, render_docstring};
pub use edit::{apply_changes, LineChange};
pub use error::{EditError, InjectError, Side, ValidationError};
pub use inject::{preamble_lines, AppliedInjection, DocInjector, ExistingDocPolicy, Injection};
pub use validate::{
    structural_dump, validate_equivalence, validate_insertions, validate_replacement,
    validate_rewrites,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
