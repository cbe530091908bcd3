//! Module paths and test naming
//!
//! Maps files to dotted module paths and definitions to the test module and
//! test function that are expected to cover them.

use crate::error::PathError;
use crate::qualified::QualifiedPath;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Root package of test modules
pub const TESTS_ROOT: &str = "tests";

static UPPER_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new("(.)([A-Z][a-z]+)").expect("static regex is valid"));
static LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new("([a-z0-9])([A-Z])").expect("static regex is valid"));
static UNDERSCORE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new("_+").expect("static regex is valid"));

/// How source modules map onto the `tests` package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestLayout {
    /// Replace the first module segment with `tests`: `pkg.sub.mod` → `tests.sub.test_mod`
    #[default]
    ReplaceRoot,
    /// Prepend `tests`: `pkg.sub.mod` → `tests.pkg.sub.test_mod`
    PrefixRoot,
}

/// Test module and function expected to cover a definition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TestLocation {
    /// Dotted test module path
    pub module_path: String,
    /// Test function name
    pub identifier: String,
}

impl std::fmt::Display for TestLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.module_path, self.identifier)
    }
}

/// Dotted module path of `file` relative to `project_root`
///
/// # Errors
/// Returns `PathError::NotUnderRoot` if `file` is not inside `project_root`
pub fn module_path(file: &Path, project_root: &Path) -> Result<String, PathError> {
    let relative = file
        .strip_prefix(project_root)
        .map_err(|_| PathError::not_under_root(file, project_root))?;

    let segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return Err(PathError::not_under_root(file, project_root));
    }
    Ok(segments.join("."))
}

/// Relative file path of a dotted module path (`a.b` → `a/b.py`)
#[must_use]
pub fn import_path_to_file_path(module_path: &str) -> PathBuf {
    let mut path: PathBuf = module_path.split('.').collect();
    path.set_extension("py");
    path
}

/// Module lives in the `tests` package
#[inline]
#[must_use]
pub fn is_test_module(module_path: &str) -> bool {
    module_path.split('.').next() == Some(TESTS_ROOT)
}

/// Split mixed-case words with underscores and lowercase the result
#[must_use]
pub fn camel_to_snake(name: &str) -> String {
    let name = UPPER_WORD.replace_all(name, "${1}_${2}");
    LOWER_UPPER.replace_all(&name, "${1}_${2}").to_lowercase()
}

/// Test function name for a qualified path (`BarBaz.quux` → `test_bar_baz_quux`)
#[must_use]
pub fn test_identifier(qualified_path: &str) -> String {
    let snake = camel_to_snake(&qualified_path.replace('.', "_"));
    let prefixed = format!("test_{snake}");
    UNDERSCORE_RUN
        .replace_all(&prefixed, "_")
        .trim_matches('_')
        .to_string()
}

/// Where the test for a definition is expected to live
///
/// Returns `None` for definitions that are themselves in the `tests` package.
#[must_use]
pub fn expected_test_location(
    module_path: &str,
    qualified_path: &QualifiedPath,
    layout: TestLayout,
) -> Option<TestLocation> {
    if is_test_module(module_path) {
        return None;
    }

    let mut parts: Vec<&str> = module_path.split('.').collect();
    let last = parts.pop()?;
    let skip = match layout {
        TestLayout::ReplaceRoot => 1,
        TestLayout::PrefixRoot => 0,
    };

    let mut test_parts = vec![TESTS_ROOT.to_string()];
    test_parts.extend(parts.iter().skip(skip).map(|part| (*part).to_string()));
    test_parts.push(format!("test_{last}"));

    Some(TestLocation {
        module_path: test_parts.join("."),
        identifier: test_identifier(&qualified_path.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qp(s: &str) -> QualifiedPath {
        s.parse().unwrap()
    }

    #[test]
    fn module_path_strips_root_and_extension() {
        let path = module_path(Path::new("/proj/pkg/sub/mod.py"), Path::new("/proj")).unwrap();
        assert_eq!(path, "pkg.sub.mod");
    }

    #[test]
    fn module_path_outside_root_fails() {
        let err = module_path(Path::new("/elsewhere/mod.py"), Path::new("/proj")).unwrap_err();
        assert!(matches!(err, PathError::NotUnderRoot { .. }));
    }

    #[test]
    fn module_path_of_root_itself_fails() {
        assert!(module_path(Path::new("/proj"), Path::new("/proj")).is_err());
    }

    #[test]
    fn import_path_inverse() {
        assert_eq!(import_path_to_file_path("pkg.mod"), PathBuf::from("pkg/mod.py"));
    }

    #[test]
    fn test_identifier_mixed_case() {
        assert_eq!(test_identifier("BarBaz.quux"), "test_bar_baz_quux");
        assert_eq!(test_identifier("HTTPServer.start"), "test_http_server_start");
        assert_eq!(test_identifier("_private"), "test_private");
        assert_eq!(test_identifier("Outer.__init__"), "test_outer_init");
        assert_eq!(test_identifier("parse2Json"), "test_parse2_json");
    }

    #[test]
    fn camel_to_snake_cases() {
        assert_eq!(camel_to_snake("CamelCase"), "camel_case");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
        assert_eq!(camel_to_snake("getHTTPResponse"), "get_http_response");
    }

    #[test]
    fn expected_location_replace_root() {
        let loc = expected_test_location("hasty.langlib.python", &qp("CodeSnippet.docstring"), TestLayout::ReplaceRoot)
            .unwrap();
        assert_eq!(loc.module_path, "tests.langlib.test_python");
        assert_eq!(loc.identifier, "test_code_snippet_docstring");
    }

    #[test]
    fn expected_location_prefix_root() {
        let loc = expected_test_location("pkg.mod", &qp("f"), TestLayout::PrefixRoot).unwrap();
        assert_eq!(loc.module_path, "tests.pkg.test_mod");
        assert_eq!(loc.identifier, "test_f");
    }

    #[test]
    fn expected_location_single_segment() {
        for layout in [TestLayout::ReplaceRoot, TestLayout::PrefixRoot] {
            let loc = expected_test_location("mod", &qp("f"), layout).unwrap();
            assert_eq!(loc.module_path, "tests.test_mod");
        }
    }

    #[test]
    fn test_modules_have_no_expected_location() {
        assert!(expected_test_location("tests.test_mod", &qp("test_f"), TestLayout::ReplaceRoot).is_none());
        assert!(is_test_module("tests"));
        assert!(!is_test_module("testsuite.mod"));
    }
}
