//! Snippet extraction and needed-test enumeration over whole files.

use docweave_snippet::prelude::*;
use docweave_snippet::{slice_imports, ImportStatement};
use docweave_syntax::parse;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const SAMPLE_CODE: &str = "
BASE_PATH = \"\"
max_words = 32

def get_file_contents(filename):
    with open(filename, \"rb\") as f:
        return f.read()

def count_words(filename):
    max_words = max_words + 1
    contents = get_file_contents(BASE_PATH + filename)
    return len(contents.split())

";

const NESTED: &str = r#"import functools
import os.path as osp
from typing import Any, Dict


class Registry:
    """Keeps things."""

    @functools.lru_cache(
        maxsize=None,
    )
    def lookup(self, key: str) -> Any:
        return self._items.get(key)

    class Entry:
        def path(self):
            return osp.join("a", "b")


def build() -> Dict:
    registry = Registry()
    return {"r": registry}
"#;

const REPO: &str = r#"class Repo:
    def query(self):
        sql = """
SELECT 1
"""
        return self.run(sql)
"#;

fn extract(source: &str, file: &str, root: &str, layout: TestLayout) -> FileSnippets {
    let options = ExtractOptions::new(file)
        .with_project_root(root)
        .with_layout(layout);
    extract_snippets(source, &options).unwrap()
}

#[test]
fn sample_code_two_functions() {
    let file = extract_snippets(SAMPLE_CODE, &ExtractOptions::new("sample.py")).unwrap();
    assert_eq!(file.snippets.len(), 2);
    assert!(file.snippets[0]
        .text()
        .starts_with("def get_file_contents(filename):"));
    assert!(file.snippets[1].text().starts_with("def count_words(filename):"));

    let assigned: Vec<_> = file.snippets[1].assigned_identifiers().iter().collect();
    assert_eq!(assigned, vec!["max_words", "contents"]);
}

#[test]
fn snippet_text_ends_with_single_newline() {
    let file = extract_snippets(SAMPLE_CODE, &ExtractOptions::new("sample.py")).unwrap();
    for snippet in &file.snippets {
        assert!(snippet.text().ends_with('\n'));
        assert!(!snippet.text().ends_with("\n\n"));
    }
}

#[test]
fn nested_qualified_paths_and_spans() {
    let file = extract(NESTED, "/proj/pkg/registry.py", "/proj", TestLayout::ReplaceRoot);
    let paths: Vec<_> = file
        .snippets
        .iter()
        .map(|s| (s.qualified_path().to_string(), s.start_line(), s.end_line()))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("Registry".to_string(), 6, 17),
            ("Registry.lookup".to_string(), 9, 13),
            ("Registry.Entry".to_string(), 15, 17),
            ("Registry.Entry.path".to_string(), 16, 17),
            ("build".to_string(), 20, 22),
        ]
    );

    let lookup = &file.snippets[1];
    assert_eq!(lookup.header_line(), 12);
    assert!(lookup.text().starts_with("    @functools.lru_cache("));
    assert_eq!(lookup.imports(), "import functools\nfrom typing import Any");
    assert_eq!(lookup.module_path().unwrap(), "pkg.registry");
    assert_eq!(lookup.expected_test_module(), Some("tests.test_registry"));
    assert_eq!(lookup.expected_test_identifier(), Some("test_registry_lookup"));
    assert_eq!(file.snippets[0].docstring(), Some(r#""""Keeps things.""""#));
}

#[test]
fn snippets_serialize_for_listing() {
    let file = extract(NESTED, "/proj/pkg/registry.py", "/proj", TestLayout::ReplaceRoot);
    let value = serde_json::to_value(&file.snippets[1]).unwrap();

    assert_eq!(value["kind"], "function");
    assert_eq!(value["qualified_path"], "Registry.lookup");
    assert_eq!(value["start_line"], 9);
    assert_eq!(value["header_line"], 12);
    assert_eq!(value["module_path"], "pkg.registry");
    assert_eq!(value["referenced"], serde_json::json!(["functools", "str", "Any", "self", "key"]));
    assert_eq!(value["test_location"]["identifier"], "test_registry_lookup");
    assert_eq!(value["docstring"], serde_json::Value::Null);
}

#[test]
fn text_with_imports_is_self_contained() {
    let file = extract(NESTED, "/proj/pkg/registry.py", "/proj", TestLayout::ReplaceRoot);
    let path = &file.snippets[3];
    assert_eq!(
        path.text_with_imports(),
        "import os.path as osp\n\ndef path(self):\n    return osp.join(\"a\", \"b\")\n"
    );
}

#[test]
fn dedented_snippets_parse_standalone() {
    for source in [SAMPLE_CODE, NESTED, REPO] {
        let file = extract_snippets(source, &ExtractOptions::new("m.py")).unwrap();
        for snippet in &file.snippets {
            let dedented = snippet.dedented_text();
            let tree = parse(&dedented)
                .unwrap_or_else(|err| panic!("{} does not parse: {err}", snippet.qualified_path()));
            assert!(tree.definitions().count() >= 1);
        }
    }
}

#[test]
fn method_with_flush_left_string_isolates() {
    let file = extract_snippets(REPO, &ExtractOptions::new("repo.py")).unwrap();
    let query = &file.snippets[1];
    assert_eq!(query.qualified_path().to_string(), "Repo.query");
    assert_eq!(
        query.dedented_text(),
        "def query(self):\n    sql = \"\"\"\nSELECT 1\n\"\"\"\n    return self.run(sql)\n"
    );
    assert!(parse(&query.dedented_text()).is_ok());
}

#[test]
fn import_slice_keeps_referenced_only() {
    let tree = parse("import a\nimport b\nimport c\n").unwrap();
    let imports: Vec<_> = tree
        .pre_order()
        .filter_map(|id| ImportStatement::from_node(&tree, id))
        .collect();

    let only_b = ["b".to_string()].into_iter().collect();
    assert_eq!(slice_imports(&imports, &only_b), "import b");

    let nothing = ["d".to_string()].into_iter().collect();
    assert_eq!(slice_imports(&imports, &nothing), "");
}

#[test]
fn needed_test_satisfied_then_needed() {
    let source = extract("def f():\n    return 1\n", "/proj/pkg/mod.py", "/proj", TestLayout::PrefixRoot);
    let tests = extract(
        "def test_f():\n    assert True\n",
        "/proj/tests/pkg/test_mod.py",
        "/proj",
        TestLayout::PrefixRoot,
    );

    assert_eq!(source.snippets[0].expected_test_module(), Some("tests.pkg.test_mod"));
    assert!(tests.snippets[0].is_test());
    assert!(tests.snippets[0].test_location().is_none());

    let all: Vec<&CodeSnippet> = source.snippets.iter().chain(&tests.snippets).collect();
    let index = TestIndex::build(all.iter().copied());
    assert_eq!(index.existing_count(), 1);
    assert!(index.needed().is_empty());

    let needed = needed_tests(&source.snippets);
    assert_eq!(needed.len(), 1);
    assert_eq!(needed[0].location.module_path, "tests.pkg.test_mod");
    assert_eq!(needed[0].location.identifier, "test_f");
    assert_eq!(needed[0].snippet.name(), "f");
}

#[test]
fn needed_tests_are_sorted() {
    let zeta = extract("def b():\n    pass\n\ndef a():\n    pass\n", "/p/pkg/zeta.py", "/p", TestLayout::ReplaceRoot);
    let alpha = extract("def z():\n    pass\n", "/p/pkg/alpha.py", "/p", TestLayout::ReplaceRoot);

    let needed = needed_tests(zeta.snippets.iter().chain(&alpha.snippets));
    let order: Vec<_> = needed.iter().map(|n| n.location.to_string()).collect();
    assert_eq!(
        order,
        vec![
            "tests.test_alpha::test_z",
            "tests.test_zeta::test_a",
            "tests.test_zeta::test_b",
        ]
    );
}

proptest! {
    #[test]
    fn extraction_is_idempotent(count in 1usize..6, body in "[a-z]{1,8}") {
        let source: String = (0..count)
            .map(|i| format!("def f{i}(v_{body}):\n    return v_{body} + {i}\n\n"))
            .collect();
        let options = ExtractOptions::new("m.py");
        let first = extract_snippets(&source, &options).unwrap();
        let second = extract_snippets(&source, &options).unwrap();
        prop_assert_eq!(first.snippets.len(), count);
        prop_assert_eq!(first.snippets, second.snippets);
    }
}
