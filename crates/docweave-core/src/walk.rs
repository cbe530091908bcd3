//! Source file discovery
//!
//! - [`FileWalker`]: enumerates candidate files below a directory
//! - [`IgnoreWalker`]: gitignore-aware walker with a fixed list of skipped directories
//! - [`find_project_root`]: nearest ancestor carrying a project marker

use docweave_snippet::PathError;
use ignore::WalkBuilder;
use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Directories never descended into
pub const ALWAYS_IGNORE: &[&str] = &[
    ".git",
    "__pycache__",
    ".direnv",
    ".eggs",
    ".hg",
    ".mypy_cache",
    ".nox",
    ".tox",
    ".venv",
    "venv",
    ".svn",
    ".ipynb_checkpoints",
    "_build",
    "buck-out",
    "build",
    "dist",
    "__pypackages__",
];

/// Entries whose presence marks a project root
pub const PROJECT_MARKERS: &[&str] = &[".git", ".hg", "pyproject.toml"];

/// Enumerates source files below a directory
pub trait FileWalker: Send + Sync {
    /// Paths relative to `root` of files whose extension is in `extensions`
    ///
    /// Order is deterministic: within a directory, files come before
    /// subdirectories and names ascend. No path appears twice.
    fn enumerate(&self, root: &Path, extensions: &[String]) -> Vec<PathBuf>;
}

/// Walker honoring `.gitignore` files and [`ALWAYS_IGNORE`]
#[derive(Debug, Clone, Default)]
pub struct IgnoreWalker {
    extra_ignores: Vec<String>,
}

impl IgnoreWalker {
    /// Create walker with the default ignore list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also skip directories with this name
    #[must_use]
    pub fn with_ignored_dir(mut self, name: impl Into<String>) -> Self {
        self.extra_ignores.push(name.into());
        self
    }

    fn is_ignored_dir(&self, name: &str) -> bool {
        ALWAYS_IGNORE.contains(&name) || self.extra_ignores.iter().any(|extra| extra == name)
    }
}

impl FileWalker for IgnoreWalker {
    fn enumerate(&self, root: &Path, extensions: &[String]) -> Vec<PathBuf> {
        let ignores = self.clone();
        let walker = WalkBuilder::new(root)
            .git_ignore(true)
            .git_exclude(true)
            .git_global(false)
            .require_git(false)
            .hidden(false)
            .follow_links(false)
            .threads(1)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                !(is_dir && entry.depth() > 0 && ignores.is_ignored_dir(&entry.file_name().to_string_lossy()))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Error walking directory");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext));
            if !matches {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }

        files.sort_by(|a, b| walk_order(a, b));
        files.dedup();
        debug!(root = %root.display(), count = files.len(), "Enumerated source files");
        files
    }
}

/// Files before subdirectories, then names ascending, at every level
fn walk_order(a: &Path, b: &Path) -> Ordering {
    let left: Vec<Component<'_>> = a.components().collect();
    let right: Vec<Component<'_>> = b.components().collect();
    for (index, (x, y)) in left.iter().zip(&right).enumerate() {
        if x == y {
            continue;
        }
        let x_is_file = index + 1 == left.len();
        let y_is_file = index + 1 == right.len();
        return match (x_is_file, y_is_file) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => x.as_os_str().cmp(y.as_os_str()),
        };
    }
    left.len().cmp(&right.len())
}

/// Nearest directory at or above `start` holding `.git`, `.hg` or `pyproject.toml`
///
/// A file `start` is searched from its parent directory.
///
/// # Errors
/// Returns `PathError::RootNotFound` if no ancestor carries a marker
pub fn find_project_root(start: &Path) -> Result<PathBuf, PathError> {
    let start_dir = if start.is_file() {
        start.parent().unwrap_or(start)
    } else {
        start
    };

    start_dir
        .ancestors()
        .find(|dir| PROJECT_MARKERS.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
        .ok_or_else(|| PathError::root_not_found(start))
}
