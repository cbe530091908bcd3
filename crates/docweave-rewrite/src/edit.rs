//! Line changes
//!
//! Every rewrite is expressed as a [`LineChange`]: remove some whole lines at
//! a position and insert others. Several changes to one text are applied in
//! strictly descending line order so pending changes above stay valid.

use crate::error::EditError;
use docweave_syntax::detect_line_ending;

/// Replace `remove` lines starting at line `at` with `insert`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    /// 1-based line the change starts at; inserted lines take this position
    pub at: usize,
    /// Number of lines removed starting at `at`
    pub remove: usize,
    /// Inserted lines, without terminators
    pub insert: Vec<String>,
}

impl LineChange {
    /// Pure insertion before line `at`
    #[must_use]
    pub fn insertion(at: usize, insert: Vec<String>) -> Self {
        Self {
            at,
            remove: 0,
            insert,
        }
    }

    /// Replace `remove` lines at `at`
    #[must_use]
    pub fn replacement(at: usize, remove: usize, insert: Vec<String>) -> Self {
        Self { at, remove, insert }
    }

    /// Net change in line count
    #[must_use]
    pub fn delta(&self) -> isize {
        self.insert.len() as isize - self.remove as isize
    }

    /// Where an original line ends up after the change, `None` if removed
    #[must_use]
    pub fn map_line(&self, line: usize) -> Option<usize> {
        if line < self.at {
            Some(line)
        } else if line < self.at + self.remove {
            None
        } else {
            Some(line + self.insert.len() - self.remove)
        }
    }

    /// Same change moved down by `offset` lines
    #[must_use]
    pub fn translated(mut self, offset: usize) -> Self {
        self.at += offset;
        self
    }

    /// Same change with every non-empty inserted line prefixed by `margin`
    #[must_use]
    pub fn indented(mut self, margin: &str) -> Self {
        if !margin.is_empty() {
            for line in &mut self.insert {
                if !line.is_empty() {
                    line.insert_str(0, margin);
                }
            }
        }
        self
    }

    /// Apply this change alone
    ///
    /// # Errors
    /// Returns `EditError::OutOfRange` if the change lies past the end of `source`
    pub fn apply(&self, source: &str) -> Result<String, EditError> {
        apply_changes(source, std::slice::from_ref(self))
    }
}

/// Apply `changes` to `source`, bottom-most first
///
/// Inserted lines use the source's line terminator. Changes at the same line
/// keep their relative order in the output.
///
/// # Errors
/// - `EditError::Overlap` if two changes remove the same line, or one inserts
///   inside another's removed range
/// - `EditError::OutOfRange` if a change lies past the end of `source`
pub fn apply_changes(source: &str, changes: &[LineChange]) -> Result<String, EditError> {
    let ending = detect_line_ending(source);
    let mut lines: Vec<String> = source.split_inclusive('\n').map(str::to_string).collect();

    let mut ordered: Vec<&LineChange> = changes.iter().collect();
    ordered.sort_by_key(|change| change.at);
    for pair in ordered.windows(2) {
        let (above, below) = (pair[0], pair[1]);
        if above.at + above.remove > below.at {
            return Err(EditError::Overlap {
                first: above.at,
                second: below.at,
            });
        }
    }

    for change in ordered.into_iter().rev() {
        let len = lines.len();
        if change.at == 0 || change.at - 1 + change.remove > len {
            return Err(EditError::OutOfRange {
                at: change.at,
                remove: change.remove,
                len,
            });
        }

        let start = change.at - 1;
        if start == len {
            if let Some(last) = lines.last_mut() {
                if !last.ends_with('\n') {
                    last.push_str(ending);
                }
            }
        }

        let inserted = change.insert.iter().map(|line| format!("{line}{ending}"));
        lines.splice(start..start + change.remove, inserted);
    }

    Ok(lines.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn insertion_before_line() {
        let change = LineChange::insertion(2, lines(&["b"]));
        assert_eq!(change.apply("a\nc\n").unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn insertion_at_end_without_newline() {
        let change = LineChange::insertion(2, lines(&["b"]));
        assert_eq!(change.apply("a").unwrap(), "a\nb\n");
        assert_eq!(change.apply("a\n").unwrap(), "a\nb\n");
        assert_eq!(LineChange::insertion(1, lines(&["x"])).apply("").unwrap(), "x\n");
    }

    #[test]
    fn keeps_crlf() {
        let change = LineChange::insertion(2, lines(&["b"]));
        assert_eq!(change.apply("a\r\nc\r\n").unwrap(), "a\r\nb\r\nc\r\n");
    }

    #[test]
    fn replacement_removes_lines() {
        let change = LineChange::replacement(2, 2, lines(&["X"]));
        assert_eq!(change.apply("a\nb\nc\nd\n").unwrap(), "a\nX\nd\n");
        assert_eq!(change.delta(), -1);
    }

    #[test]
    fn multiple_changes_apply_bottom_up() {
        let changes = vec![
            LineChange::insertion(2, lines(&["one"])),
            LineChange::insertion(4, lines(&["three", "four"])),
        ];
        assert_eq!(
            apply_changes("a\nb\nc\nd\n", &changes).unwrap(),
            "a\none\nb\nc\nthree\nfour\nd\n"
        );
    }

    #[test]
    fn overlapping_changes_rejected() {
        let changes = vec![
            LineChange::replacement(2, 2, vec![]),
            LineChange::insertion(3, lines(&["x"])),
        ];
        assert_eq!(
            apply_changes("a\nb\nc\nd\n", &changes),
            Err(EditError::Overlap { first: 2, second: 3 })
        );
    }

    #[test]
    fn out_of_range_rejected() {
        let change = LineChange::replacement(3, 2, vec![]);
        assert!(matches!(change.apply("a\nb\nc\n"), Err(EditError::OutOfRange { .. })));
        assert!(LineChange::insertion(0, vec![]).apply("a\n").is_err());
    }

    #[test]
    fn map_line_shifts_following_lines() {
        let change = LineChange::replacement(3, 1, lines(&["x", "y"]));
        assert_eq!(change.map_line(2), Some(2));
        assert_eq!(change.map_line(3), None);
        assert_eq!(change.map_line(4), Some(5));
    }

    #[test]
    fn translated_and_indented() {
        let change = LineChange::insertion(2, lines(&["\"\"\"Doc.", "", "more\"\"\""]))
            .translated(10)
            .indented("    ");
        assert_eq!(change.at, 12);
        assert_eq!(change.insert, lines(&["    \"\"\"Doc.", "", "    more\"\"\""]));
    }
}
