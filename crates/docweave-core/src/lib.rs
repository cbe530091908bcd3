//! docweave Core - project-level orchestration
//!
//! Runs the syntax, snippet and rewrite layers over whole projects:
//! - Discovers source files, honoring `.gitignore`
//! - Extracts snippets from every file in parallel
//! - Enumerates tests that should exist but do not
//! - Generates documentation text with bounded concurrency and retries
//! - Injects it, validates each rewritten file and writes it once
//!
//! # Example
//!
//! ```rust,no_run
//! use docweave_core::prelude::*;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), EngineError> {
//! let engine = Engine::new(EngineConfig::new().with_concurrency(4));
//! let generator = ScriptedGenerator::new().with_fallback("Handle");
//!
//! let options = DocumentOptions { dry_run: true, ..DocumentOptions::default() };
//! let report = engine.document(Path::new("src"), &generator, options).await?;
//! println!("{} snippets documented", report.documented.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod retry;
pub mod walk;

// Re-exports for convenience
pub use config::{EngineConfig, GeneratorConfig, RetryConfig, CONFIG_FILE_NAME};
pub use error::{EngineError, GenerationError};
pub use generator::{
    build_prompt, generate_with_retry, parse_completion, DocGenerator, OpenAiGenerator,
    ScriptedGenerator,
};
pub use pipeline::{
    BatchReport, Collection, DocumentOptions, Engine, FileRewrite, NeededTestRow, ReportEntry,
    SourceFile,
};
pub use retry::RetryPolicy;
pub use walk::{find_project_root, FileWalker, IgnoreWalker, ALWAYS_IGNORE, PROJECT_MARKERS};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running docweave over a project
    pub use crate::{
        BatchReport, DocGenerator, DocumentOptions, Engine, EngineConfig, EngineError,
        FileWalker, GenerationError, IgnoreWalker, OpenAiGenerator, RetryPolicy,
        ScriptedGenerator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
