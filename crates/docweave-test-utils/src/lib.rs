//! Testing utilities for the docweave workspace
//!
//! Python fixtures and a throwaway project directory builder.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TWO_FUNCTIONS: &str = "def first(a):\n    return a + 1\n\n\ndef second(b):\n    return first(b) * 2\n";

pub const SERVICE_MODULE: &str = r#"import os
from typing import Optional


class BarBaz:
    def quux(self, name: Optional[str] = None):
        return os.path.join("root", name or "")

    def documented(self):
        """Already has one."""
        return 1


def helper():
    return BarBaz().quux()
"#;

pub const SERVICE_TESTS: &str = r#"from pkg.service import BarBaz


def test_bar_baz_quux():
    assert BarBaz().quux("x")
"#;

pub const BROKEN_MODULE: &str = "def broken(:\n    pass\n";

/// Temporary project root holding a `.git` marker
pub struct TempProject {
    dir: TempDir,
}

impl TempProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        Self { dir }
    }

    /// Write `contents` to `relative`, creating parent directories
    pub fn file(self, relative: &str, contents: &str) -> Self {
        self.bytes(relative, contents.as_bytes())
    }

    /// Like [`TempProject::file`], for contents that need not be UTF-8
    pub fn bytes(self, relative: &str, contents: &[u8]) -> Self {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.join(relative)).unwrap()
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Project with a service module, its partial tests and one unparsable file
pub fn service_project() -> TempProject {
    TempProject::new()
        .file("pkg/__init__.py", "")
        .file("pkg/service.py", SERVICE_MODULE)
        .file("pkg/broken.py", BROKEN_MODULE)
        .file("tests/pkg/test_service.py", SERVICE_TESTS)
}
