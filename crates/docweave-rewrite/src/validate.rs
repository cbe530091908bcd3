//! Structural equivalence checks
//!
//! Both texts are dedented, parsed and walked in pre-order lockstep. The only
//! tolerated divergence is the documentation literal being injected (or, when
//! replacing, the literal being swapped). A position-free dump of both trees,
//! with that literal skipped, must then be identical.

use crate::error::{Side, ValidationError};
use docweave_syntax::{dedent, parse, NodeId, NodeKind, SyntaxTree};
use std::fmt::Write;
use std::ops::Range;
use tracing::trace;

/// What the candidate is allowed to differ in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Allowance {
    /// Exactly this many extra leading literals on the candidate side
    inserted: usize,
    /// At most this many leading literals whose content differs
    replaced: usize,
}

/// Confirm `candidate` is `original` plus exactly one leading documentation literal
///
/// # Errors
/// Returns a `ValidationError` describing the first divergence
pub fn validate_equivalence(original: &str, candidate: &str) -> Result<(), ValidationError> {
    validate_rewrites(original, candidate, 1, 0)
}

/// Confirm `candidate` is `original` plus `count` leading documentation literals
///
/// # Errors
/// Returns a `ValidationError` describing the first divergence
pub fn validate_insertions(
    original: &str,
    candidate: &str,
    count: usize,
) -> Result<(), ValidationError> {
    validate_rewrites(original, candidate, count, 0)
}

/// Confirm `candidate` differs from `original` in at most `count` leading literals
///
/// # Errors
/// Returns a `ValidationError` describing the first divergence
pub fn validate_replacement(
    original: &str,
    candidate: &str,
    count: usize,
) -> Result<(), ValidationError> {
    validate_rewrites(original, candidate, 0, count)
}

/// Confirm `candidate` is `original` with exactly `inserted` new leading
/// literals and at most `replaced` swapped ones
///
/// # Errors
/// Returns a `ValidationError` describing the first divergence
pub fn validate_rewrites(
    original: &str,
    candidate: &str,
    inserted: usize,
    replaced: usize,
) -> Result<(), ValidationError> {
    compare(original, candidate, Allowance { inserted, replaced })
}

/// Position-free dump of a tree: one line per node with kind, field and leaf text
#[must_use]
pub fn structural_dump(tree: &SyntaxTree) -> String {
    dump_lines(tree, &[]).join("\n")
}

fn compare(original: &str, candidate: &str, allowance: Allowance) -> Result<(), ValidationError> {
    let left = parse(&dedent(original)).map_err(|e| ValidationError::unparsable(Side::Original, e))?;
    let right =
        parse(&dedent(candidate)).map_err(|e| ValidationError::unparsable(Side::Candidate, e))?;

    let left_ids: Vec<NodeId> = left.pre_order().collect();
    let right_ids: Vec<NodeId> = right.pre_order().collect();

    let mut left_skips: Vec<Range<usize>> = Vec::new();
    let mut right_skips: Vec<Range<usize>> = Vec::new();
    let (mut i, mut j) = (0, 0);
    let (mut inserted, mut replaced) = (0, 0);

    loop {
        i = next_significant(&left, &left_ids, i);
        j = next_significant(&right, &right_ids, j);
        if i >= left_ids.len() || j >= right_ids.len() {
            break;
        }
        let (a, b) = (left_ids[i], right_ids[j]);

        if right.is_leading_docstring(b) && !left.is_leading_docstring(a) {
            let end = right.subtree_end(b);
            trace!(line = right.node(b).start().line, "Skipping injected literal");
            right_skips.push(j..end);
            inserted += 1;
            j = end;
            continue;
        }
        if allowance.replaced > 0
            && left.is_leading_docstring(a)
            && right.is_leading_docstring(b)
            && subtree_dump(&left, a) != subtree_dump(&right, b)
        {
            let (left_end, right_end) = (left.subtree_end(a), right.subtree_end(b));
            trace!(line = right.node(b).start().line, "Skipping replaced literal");
            left_skips.push(i..left_end);
            right_skips.push(j..right_end);
            replaced += 1;
            i = left_end;
            j = right_end;
            continue;
        }

        let (left_node, right_node) = (left.node(a), right.node(b));
        if left_node.kind() != right_node.kind() || left_node.grammar() != right_node.grammar() {
            return Err(ValidationError::kind_mismatch(
                left_node.grammar(),
                right_node.grammar(),
                right_node.start().line,
            ));
        }
        i += 1;
        j += 1;
    }

    // Literal appended to an otherwise exhausted tree (empty module)
    while j < right_ids.len() && right.is_leading_docstring(right_ids[j]) {
        let end = right.subtree_end(right_ids[j]);
        right_skips.push(j..end);
        inserted += 1;
        j = next_significant(&right, &right_ids, end);
    }

    if i < left_ids.len() {
        return Err(ValidationError::TrailingNodes { side: Side::Original });
    }
    if j < right_ids.len() {
        return Err(ValidationError::TrailingNodes {
            side: Side::Candidate,
        });
    }

    if inserted != allowance.inserted {
        return Err(ValidationError::LiteralCount {
            expected: allowance.inserted,
            found: inserted,
        });
    }
    if replaced > allowance.replaced {
        return Err(ValidationError::LiteralCount {
            expected: allowance.replaced,
            found: replaced,
        });
    }

    let left_dump = dump_lines(&left, &left_skips);
    let right_dump = dump_lines(&right, &right_skips);
    if left_dump != right_dump {
        let (original, candidate) = first_difference(&left_dump, &right_dump);
        return Err(ValidationError::DumpMismatch {
            original,
            candidate,
        });
    }

    Ok(())
}

/// Comments carry no structure and are invisible to the comparison
fn next_significant(tree: &SyntaxTree, ids: &[NodeId], mut index: usize) -> usize {
    while index < ids.len() && tree.kind(ids[index]) == NodeKind::Comment {
        index += 1;
    }
    index
}

fn subtree_dump(tree: &SyntaxTree, id: NodeId) -> Vec<String> {
    tree.descendants(id)
        .filter(|&node| tree.kind(node) != NodeKind::Comment)
        .map(|node| dump_node(tree, node))
        .collect()
}

fn dump_lines(tree: &SyntaxTree, skips: &[Range<usize>]) -> Vec<String> {
    tree.pre_order()
        .filter(|&id| tree.kind(id) != NodeKind::Comment)
        .filter(|id| !skips.iter().any(|range| range.contains(&id.index())))
        .map(|id| {
            let depth = tree.ancestors(id).count();
            format!("{}{}", "  ".repeat(depth), dump_node(tree, id))
        })
        .collect()
}

fn dump_node(tree: &SyntaxTree, id: NodeId) -> String {
    let node = tree.node(id);
    let mut line = String::new();
    if let Some(field) = node.field() {
        let _ = write!(line, "{field}: ");
    }
    line.push_str(node.grammar());
    if node.children().is_empty() && node.kind() != NodeKind::Module {
        let _ = write!(line, " {:?}", tree.text(id));
    }
    line
}

fn first_difference(left: &[String], right: &[String]) -> (String, String) {
    let index = left
        .iter()
        .zip(right)
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| left.len().min(right.len()));
    (
        left.get(index).cloned().unwrap_or_default(),
        right.get(index).cloned().unwrap_or_default(),
    )
}
