//! Indentation helpers

/// Leading spaces and tabs of a line
#[inline]
#[must_use]
pub fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t', '\x0c']);
    &line[..line.len() - trimmed.len()]
}

/// Whitespace prefix shared by every non-blank line
#[must_use]
pub fn common_margin(text: &str) -> String {
    let mut margin: Option<&str> = None;

    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        let indent = leading_whitespace(line);
        margin = Some(match margin {
            None => indent,
            Some(current) => {
                let shared = current
                    .bytes()
                    .zip(indent.bytes())
                    .take_while(|(a, b)| a == b)
                    .count();
                &current[..shared]
            }
        });
    }

    margin.unwrap_or("").to_string()
}

/// Remove the first code line's indentation from every line carrying it
///
/// Lines indented less than the first one (continuation lines of a string
/// literal, for instance) are left alone. Whitespace-only lines are reduced
/// to their line terminator.
#[must_use]
pub fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .find(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map_or("", leading_whitespace);
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line_terminator(line)
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect()
}

/// Prefix every non-blank line with `margin`
#[must_use]
pub fn indent(text: &str, margin: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{margin}{line}")
            }
        })
        .collect()
}

/// Line terminator used by the first terminated line, `\n` if none
#[must_use]
pub fn detect_line_ending(text: &str) -> &'static str {
    match text.find('\n') {
        Some(index) if index > 0 && text.as_bytes()[index - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

fn line_terminator(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn margin_of_nested_method() {
        let text = "    def f(self):\n        return 1\n";
        assert_eq!(common_margin(text), "    ");
    }

    #[test]
    fn margin_ignores_blank_lines() {
        let text = "    a = 1\n\n  \n    b = 2\n";
        assert_eq!(common_margin(text), "    ");
    }

    #[test]
    fn mixed_tabs_and_spaces_share_nothing() {
        assert_eq!(common_margin("\ta\n    b\n"), "");
    }

    #[test]
    fn dedent_removes_margin() {
        let text = "    def f(self):\n\n        return 1\n";
        assert_eq!(dedent(text), "def f(self):\n\n    return 1\n");
    }

    #[test]
    fn dedent_keeps_lines_left_of_the_first() {
        let text = "    def q(self):\n        sql = \"\"\"\nSELECT 1\n\"\"\"\n        return sql\n";
        assert_eq!(common_margin(text), "");
        assert_eq!(
            dedent(text),
            "def q(self):\n    sql = \"\"\"\nSELECT 1\n\"\"\"\n    return sql\n"
        );
    }

    #[test]
    fn dedent_ignores_leading_comments() {
        assert_eq!(dedent("  # note\ndef f():\n  return 1\n"), "  # note\ndef f():\n  return 1\n");
    }

    #[test]
    fn dedent_normalizes_whitespace_lines() {
        assert_eq!(dedent("  a\n   \n  b"), "a\n\nb");
    }

    #[test]
    fn indent_restores_margin() {
        let original = "    def f(self):\n\n        return 1\n";
        assert_eq!(indent(&dedent(original), "    "), original);
    }

    #[test]
    fn line_endings() {
        assert_eq!(detect_line_ending("a\r\nb\r\n"), "\r\n");
        assert_eq!(detect_line_ending("a\nb"), "\n");
        assert_eq!(detect_line_ending("single"), "\n");
    }

    #[test]
    fn leading_whitespace_of_line() {
        assert_eq!(leading_whitespace("\t  x = 1"), "\t  ");
        assert_eq!(leading_whitespace("x"), "");
    }
}
