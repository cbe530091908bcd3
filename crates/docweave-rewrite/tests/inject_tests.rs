//! Injection over realistic files and generated inputs.

use docweave_rewrite::{
    apply_changes, validate_equivalence, validate_insertions, DocInjector, ExistingDocPolicy,
    InjectError, Injection, LineChange,
};
use docweave_syntax::{dedent, indent, parse};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const MODULE: &str = r#"#!/usr/bin/env python
# -*- coding: utf-8 -*-
import os


class Store:
    @staticmethod
    def open(
        path: str,
    ) -> "Store":
        return Store()

    def close(self):  # trailing comment
        pass


def main():
    return Store.open(os.getcwd())
"#;

#[test]
fn module_shift_keeps_positions_valid() {
    let Injection::Applied(result) = DocInjector::new().inject_module(MODULE, "Storage.").unwrap()
    else {
        panic!("expected an applied injection");
    };

    let before: Vec<&str> = MODULE.lines().collect();
    let after: Vec<&str> = result.text.lines().collect();
    for (index, line) in before.iter().enumerate() {
        let mapped = result.change.map_line(index + 1).unwrap();
        assert_eq!(after[mapped - 1], *line);
    }
    assert_eq!(after[2], "\"\"\"Storage.\"\"\"");
}

#[test]
fn every_definition_can_be_documented() {
    let tree = parse(MODULE).unwrap();
    let headers: Vec<usize> = tree
        .definitions()
        .map(|id| tree.node(id).start().line)
        .collect();
    assert_eq!(headers, vec![6, 8, 13, 17]);

    let changes: Vec<LineChange> = headers
        .iter()
        .map(|&line| {
            DocInjector::new()
                .inject_definition(MODULE, line, "Documented.")
                .unwrap()
                .applied()
                .unwrap()
                .change
        })
        .collect();

    assert_eq!(
        changes.iter().map(|c| c.at).collect::<Vec<_>>(),
        vec![7, 11, 14, 18]
    );

    let combined = apply_changes(MODULE, &changes).unwrap();
    assert_eq!(validate_insertions(MODULE, &combined, 4), Ok(()));
    assert!(combined.contains("    ) -> \"Store\":\n        \"\"\"Documented.\"\"\"\n        return Store()"));
    assert!(combined.contains("    def close(self):  # trailing comment\n        \"\"\"Documented.\"\"\"\n"));
}

#[test]
fn snippet_level_injection_maps_back_to_file() {
    // Method text as extracted: indented by its class
    let snippet = "    def close(self):  # trailing comment\n        pass\n";
    let margin = "    ";
    let dedented = dedent(snippet);

    let applied = DocInjector::new()
        .inject_definition(&dedented, 1, "Release resources.")
        .unwrap()
        .applied()
        .unwrap();
    assert_eq!(
        indent(&applied.text, margin),
        "    def close(self):  # trailing comment\n        \"\"\"Release resources.\"\"\"\n        pass\n"
    );

    let file_change = applied.change.translated(13 - 1).indented(margin);
    let rewritten = file_change.apply(MODULE).unwrap();
    assert_eq!(validate_equivalence(MODULE, &rewritten), Ok(()));
}

#[test]
fn replace_then_skip() {
    let source = "class A:\n    '''Old.'''\n\n    x = 1\n";
    let replaced = DocInjector::new()
        .with_policy(ExistingDocPolicy::Replace)
        .inject_definition(source, 1, "New.")
        .unwrap()
        .applied()
        .unwrap();
    assert_eq!(replaced.text, "class A:\n    \"\"\"New.\"\"\"\n\n    x = 1\n");

    let again = DocInjector::new()
        .inject_definition(&replaced.text, 1, "Newer.")
        .unwrap();
    assert_eq!(again, Injection::AlreadyDocumented { line: 2 });
}

#[test]
fn formatted_string_is_not_documentation() {
    let source = "def f(x):\n    f\"doc {x}\"\n";
    let injection = DocInjector::new().inject_definition(source, 1, "Format x.").unwrap();
    let Injection::Applied(result) = injection else {
        panic!("expected an applied injection, got {injection:?}");
    };
    assert_eq!(result.text, "def f(x):\n    \"\"\"Format x.\"\"\"\n    f\"doc {x}\"\n");
}

#[test]
fn unparsable_source_is_reported() {
    let err = DocInjector::new()
        .inject_definition("def f(:\n    pass\n", 1, "Doc.")
        .unwrap_err();
    assert!(matches!(err, InjectError::Parse(_)));
}

fn doc_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z ,.]{1,20}",
            Just("\"".to_string()),
            Just("\"\"\"".to_string()),
            Just("\\".to_string()),
            Just("\n".to_string()),
            Just("'".to_string()),
        ],
        1..8,
    )
    .prop_map(|parts| parts.concat())
}

fn function_source() -> impl Strategy<Value = String> {
    (
        prop::bool::ANY,
        prop::bool::ANY,
        1usize..4,
        prop_oneof![Just(""), Just("    ")],
    )
        .prop_map(|(decorated, multiline, statements, margin)| {
            let mut text = String::new();
            if !margin.is_empty() {
                text.push_str("class Holder:\n");
            }
            if decorated {
                text.push_str(&format!("{margin}@decorate(\n{margin}    1,\n{margin})\n"));
            }
            if multiline {
                text.push_str(&format!("{margin}def target(\n{margin}    a,\n{margin}):\n"));
            } else {
                text.push_str(&format!("{margin}def target(a):\n"));
            }
            for index in 0..statements {
                text.push_str(&format!("{margin}    v{index} = a + {index}\n"));
            }
            text
        })
}

proptest! {
    #[test]
    fn injection_is_validated_or_rejected(source in function_source(), doc in doc_text()) {
        let tree = parse(&source).unwrap();
        let target = tree
            .definitions()
            .find(|&id| tree.name(id) == Some("target"))
            .unwrap();
        let header = tree.node(target).start().line;

        match DocInjector::new().inject_definition(&source, header, &doc) {
            Ok(Injection::Applied(applied)) => {
                prop_assert_eq!(validate_equivalence(&source, &applied.text), Ok(()));
                prop_assert_eq!(applied.change.remove, 0);
                let restored: String = applied
                    .text
                    .lines()
                    .enumerate()
                    .filter(|(index, _)| {
                        let line = index + 1;
                        line < applied.change.at || line >= applied.change.at + applied.change.insert.len()
                    })
                    .map(|(_, line)| format!("{line}\n"))
                    .collect();
                prop_assert_eq!(restored, source);
            }
            Ok(Injection::AlreadyDocumented { .. }) => prop_assert!(false, "target has no docstring"),
            Err(InjectError::EmptyDocstring) => prop_assert!(doc.trim().is_empty()),
            Err(err) => prop_assert!(err.is_validation(), "unexpected error {err}"),
        }
    }
}
