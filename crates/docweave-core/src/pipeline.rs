//! Batch operations over a project
//!
//! The [`Engine`] ties the pieces together:
//!
//! 1. enumerate source files with a [`FileWalker`]
//! 2. parse and extract snippets in parallel (`rayon`, off the async runtime)
//! 3. ask a [`DocGenerator`] for text under a bounded number of concurrent requests
//! 4. compute one [`LineChange`] per snippet and map it back onto its file
//! 5. apply each file's changes bottom-up, validate the whole file, write it once
//!
//! Per-file and per-snippet failures land in the [`BatchReport`]; only
//! configuration, path resolution and I/O failures end the run.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::generator::{generate_with_retry, DocGenerator};
use crate::walk::{find_project_root, FileWalker, IgnoreWalker};
use docweave_rewrite::{
    apply_changes, validate_rewrites, DocInjector, ExistingDocPolicy, InjectError, LineChange,
};
use docweave_snippet::{
    extract_snippets, CodeSnippet, DefinitionKind, ExtractOptions, FileSnippets, SnippetError,
    TestIndex, TestLayout,
};
use docweave_syntax::leading_whitespace;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One parsed source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path
    pub path: PathBuf,
    /// Text as read
    pub source: String,
    /// Extraction result
    pub snippets: FileSnippets,
}

/// Result of enumerating and extracting a target
#[derive(Debug, Clone)]
pub struct Collection {
    /// Project root used for module paths
    pub project_root: PathBuf,
    /// Parsed files in enumeration order
    pub files: Vec<SourceFile>,
    /// Files that could not be read or parsed, with the reason
    pub skipped: Vec<ReportEntry>,
}

impl Collection {
    /// Function and class snippets of every file, in order
    pub fn snippets(&self) -> impl Iterator<Item = &CodeSnippet> {
        self.files.iter().flat_map(|file| file.snippets.snippets.iter())
    }
}

/// A test that should exist but does not
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeededTestRow {
    /// Dotted test module path
    pub module_path: String,
    /// Test function name
    pub identifier: String,
    /// File of the definition lacking a test
    pub file: PathBuf,
    /// Header line of the definition
    pub line: usize,
    /// Qualified path of the definition
    pub qualified_path: String,
}

/// Options for [`Engine::document`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Compute and validate rewrites without writing files
    pub dry_run: bool,
    /// Also document modules lacking a module docstring
    pub include_modules: bool,
}

/// Snippet outcome line in a [`BatchReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// `file:qualified.path`, or a bare file path for file-level entries
    pub key: String,
    /// Docstring text for documented snippets, reason otherwise
    pub detail: String,
}

impl ReportEntry {
    fn new(key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            detail: detail.into(),
        }
    }
}

/// Rewritten file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRewrite {
    /// Absolute path
    pub path: PathBuf,
    /// Number of line changes applied
    pub changes: usize,
    /// New contents
    #[serde(skip)]
    pub text: String,
}

/// Outcome of a documentation batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Snippets that received documentation
    pub documented: Vec<ReportEntry>,
    /// Snippets or files left alone on purpose
    pub skipped: Vec<ReportEntry>,
    /// Snippets or files that failed
    pub failed: Vec<ReportEntry>,
    /// Files rewritten, or that would be in a dry run
    pub rewrites: Vec<FileRewrite>,
    /// Whether files were left untouched
    pub dry_run: bool,
}

impl BatchReport {
    /// Nothing failed
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A snippet chosen for documentation
struct Target<'a> {
    file: &'a SourceFile,
    snippet: &'a CodeSnippet,
}

/// Orchestrates extraction and documentation runs
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    walker: Arc<dyn FileWalker>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Engine {
    /// Create engine with the default walker
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            walker: Arc::new(IgnoreWalker::new()),
        }
    }

    /// Replace the file walker
    #[must_use]
    pub fn with_walker(mut self, walker: impl FileWalker + 'static) -> Self {
        self.walker = Arc::new(walker);
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Configured project root, else the one discovered from `target`
    ///
    /// # Errors
    /// Returns `EngineError::Path` if no root is configured or found
    pub fn project_root(&self, target: &Path) -> Result<PathBuf, EngineError> {
        match &self.config.project_root {
            Some(root) => Ok(root.clone()),
            None => Ok(find_project_root(target)?),
        }
    }

    /// Absolute source files below `target`, or `target` itself if it is a file
    #[must_use]
    pub fn source_files(&self, target: &Path) -> Vec<PathBuf> {
        if target.is_file() {
            return vec![target.to_path_buf()];
        }
        self.walker
            .enumerate(target, &self.config.extensions)
            .into_iter()
            .map(|relative| target.join(relative))
            .collect()
    }

    /// Enumerate, read and extract every source file below `target`
    ///
    /// Files that cannot be read, decoded or parsed are recorded and skipped.
    ///
    /// # Errors
    /// `EngineError::Path` if the project root cannot be resolved or a file
    /// lies outside it
    pub async fn collect(&self, target: &Path) -> Result<Collection, EngineError> {
        let project_root = self.project_root(target)?;
        let paths = self.source_files(target);
        info!(
            target = %target.display(),
            root = %project_root.display(),
            files = paths.len(),
            "Collecting snippets"
        );

        let layout = self.config.test_layout;
        let root = project_root.clone();
        let outcomes = tokio::task::spawn_blocking(move || {
            paths
                .into_par_iter()
                .map(|path| read_and_extract(path, &root, layout))
                .collect::<Result<Vec<_>, EngineError>>()
        })
        .await
        .map_err(|e| EngineError::Task(e.to_string()))??;

        let mut files = Vec::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                Extracted::File(file) => files.push(file),
                Extracted::Skipped(path, reason) => {
                    warn!(file = %path.display(), %reason, "Skipping file");
                    skipped.push(ReportEntry::new(path.display().to_string(), reason));
                }
            }
        }

        Ok(Collection {
            project_root,
            files,
            skipped,
        })
    }

    /// Function and class snippets below `target`
    ///
    /// # Errors
    /// See [`Engine::collect`]
    pub async fn snippets(&self, target: &Path) -> Result<Vec<CodeSnippet>, EngineError> {
        let collection = self.collect(target).await?;
        Ok(collection.snippets().cloned().collect())
    }

    /// Tests expected for snippets below `target` that no test snippet provides
    ///
    /// # Errors
    /// See [`Engine::collect`]
    pub async fn needed_tests(&self, target: &Path) -> Result<Vec<NeededTestRow>, EngineError> {
        let collection = self.collect(target).await?;
        let index = TestIndex::build(collection.snippets());
        let rows: Vec<NeededTestRow> = index
            .needed()
            .into_iter()
            .map(|needed| NeededTestRow {
                module_path: needed.location.module_path.clone(),
                identifier: needed.location.identifier.clone(),
                file: needed.snippet.file_path().to_path_buf(),
                line: needed.snippet.header_line(),
                qualified_path: needed.snippet.qualified_path().to_string(),
            })
            .collect();
        info!(
            expected = index.expected_count(),
            existing = index.existing_count(),
            needed = rows.len(),
            "Enumerated needed tests"
        );
        Ok(rows)
    }

    /// Generate and inject documentation for every undocumented snippet below `target`
    ///
    /// # Errors
    /// - See [`Engine::collect`]
    /// - `EngineError::Io` if a rewritten file cannot be written
    pub async fn document(
        &self,
        target: &Path,
        generator: &dyn DocGenerator,
        options: DocumentOptions,
    ) -> Result<BatchReport, EngineError> {
        let collection = self.collect(target).await?;
        let mut report = BatchReport {
            skipped: collection.skipped.clone(),
            dry_run: options.dry_run,
            ..BatchReport::default()
        };

        let injector = DocInjector::new().with_policy(self.config.existing_doc_policy);
        let targets = self.select_targets(&collection, &injector, options, &mut report);
        info!(
            count = targets.len(),
            generator = generator.name(),
            "Found code snippets in need of docstrings"
        );

        let policy = self.config.retry_policy();
        let generated: Vec<(Target<'_>, Result<String, _>)> = stream::iter(targets)
            .map(|target| {
                let policy = &policy;
                async move {
                    let result = generate_with_retry(generator, target.snippet, policy).await;
                    (target, result)
                }
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut per_file: IndexMap<&Path, (&SourceFile, Vec<(String, LineChange, String)>)> =
            IndexMap::new();
        for (target, result) in generated {
            let key = target.snippet.key();
            let text = match result {
                Ok(text) => text,
                Err(err) => {
                    warn!(snippet = %key, error = %err, "Generation failed");
                    report.failed.push(ReportEntry::new(key, err.to_string()));
                    continue;
                }
            };

            match file_change(&injector, target.file, target.snippet, &text) {
                Ok(Some(change)) => {
                    debug!(snippet = %key, at = change.at, "Prepared injection");
                    per_file
                        .entry(target.file.path.as_path())
                        .or_insert_with(|| (target.file, Vec::new()))
                        .1
                        .push((key, change, text));
                }
                Ok(None) => report.skipped.push(ReportEntry::new(key, "already documented")),
                Err(err) => {
                    warn!(snippet = %key, error = %err, "Injection rejected");
                    report.failed.push(ReportEntry::new(key, err.to_string()));
                }
            }
        }

        for (path, (file, entries)) in per_file {
            let changes: Vec<LineChange> = entries.iter().map(|(_, change, _)| change.clone()).collect();
            match rewrite_file(&file.source, &changes) {
                Ok(text) => {
                    if !options.dry_run {
                        tokio::fs::write(path, &text)
                            .await
                            .map_err(|e| EngineError::io(path, e))?;
                    }
                    info!(file = %path.display(), changes = changes.len(), dry_run = options.dry_run, "Rewrote file");
                    report
                        .documented
                        .extend(entries.into_iter().map(|(key, _, text)| ReportEntry::new(key, text)));
                    report.rewrites.push(FileRewrite {
                        path: path.to_path_buf(),
                        changes: changes.len(),
                        text,
                    });
                }
                Err(reason) => {
                    warn!(file = %path.display(), %reason, "Discarding rewrite of file");
                    report.failed.extend(
                        entries
                            .into_iter()
                            .map(|(key, _, _)| ReportEntry::new(key, format!("file rejected: {reason}"))),
                    );
                }
            }
        }

        info!(
            documented = report.documented.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            files = report.rewrites.len(),
            "Documentation batch finished"
        );
        Ok(report)
    }

    fn select_targets<'a>(
        &self,
        collection: &'a Collection,
        injector: &DocInjector,
        options: DocumentOptions,
        report: &mut BatchReport,
    ) -> Vec<Target<'a>> {
        let skip_documented = injector.policy() == ExistingDocPolicy::Skip;
        let mut targets = Vec::new();
        for file in &collection.files {
            let module = options.include_modules.then_some(&file.snippets.module);
            for snippet in module.into_iter().chain(&file.snippets.snippets) {
                if skip_documented && snippet.docstring().is_some() {
                    report
                        .skipped
                        .push(ReportEntry::new(snippet.key(), "already documented"));
                    continue;
                }
                targets.push(Target { file, snippet });
            }
        }
        targets
    }
}

enum Extracted {
    File(SourceFile),
    Skipped(PathBuf, String),
}

fn read_and_extract(
    path: PathBuf,
    root: &Path,
    layout: TestLayout,
) -> Result<Extracted, EngineError> {
    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => return Ok(Extracted::Skipped(path, err.to_string())),
    };
    let options = ExtractOptions::new(&path)
        .with_project_root(root)
        .with_layout(layout);
    match extract_snippets(&source, &options) {
        Ok(snippets) => {
            debug!(file = %path.display(), snippets = snippets.snippets.len(), "Extracted file");
            Ok(Extracted::File(SourceFile {
                path,
                source,
                snippets,
            }))
        }
        Err(SnippetError::Parse(err)) => Ok(Extracted::Skipped(path, err.to_string())),
        Err(SnippetError::Path(err)) => Err(err.into()),
    }
}

/// File-level change documenting `snippet`, `None` if it is already documented
fn file_change(
    injector: &DocInjector,
    file: &SourceFile,
    snippet: &CodeSnippet,
    text: &str,
) -> Result<Option<LineChange>, InjectError> {
    if snippet.kind() == DefinitionKind::Module {
        return Ok(injector
            .inject_module(&file.source, text)?
            .applied()
            .map(|applied| applied.change));
    }

    // Inject into the standalone snippet, then move the change back into place
    let margin = leading_whitespace(snippet.text()).to_string();
    let header = snippet.header_line() - snippet.start_line() + 1;
    let injection = injector.inject_definition(&snippet.dedented_text(), header, text)?;
    Ok(injection.applied().map(|applied| {
        applied
            .change
            .translated(snippet.start_line() - 1)
            .indented(&margin)
    }))
}

/// Apply a file's changes and check the result against the original
fn rewrite_file(source: &str, changes: &[LineChange]) -> Result<String, String> {
    let text = apply_changes(source, changes).map_err(|e| e.to_string())?;
    let replaced = changes.iter().filter(|change| change.remove > 0).count();
    validate_rewrites(source, &text, changes.len() - replaced, replaced).map_err(|e| e.to_string())?;
    Ok(text)
}
