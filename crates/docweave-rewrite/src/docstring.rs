//! Documentation literal rendering

use crate::error::InjectError;
use docweave_syntax::common_margin;

const QUOTES: &str = "\"\"\"";

/// Render `text` as a triple-quoted literal, one entry per line
///
/// The text is trimmed, backslashes are doubled and embedded triple quotes
/// escaped so the literal always evaluates back to the trimmed text. Lines
/// after the first are prefixed with `indent`; the first line carries no
/// indentation, callers place it.
///
/// # Errors
/// Returns `InjectError::EmptyDocstring` if nothing is left after trimming
pub fn render_docstring(text: &str, indent: &str) -> Result<Vec<String>, InjectError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InjectError::EmptyDocstring);
    }

    let mut escaped = text.replace('\\', "\\\\").replace(QUOTES, "\\\"\\\"\\\"");
    if escaped.ends_with('"') {
        escaped.push(' ');
    }

    let literal = format!("{QUOTES}{escaped}{QUOTES}");
    let mut lines = literal.lines();
    let first = lines.next().unwrap_or_default().trim_end().to_string();
    let rest: Vec<&str> = lines.collect();
    let margin = common_margin(&rest.join("\n"));

    Ok(std::iter::once(first)
        .chain(rest.iter().map(|line| {
            let line = line.strip_prefix(margin.as_str()).unwrap_or(line).trim_end();
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        }))
        .collect())
}

/// Render and indent every line, ready for insertion
///
/// # Errors
/// Returns `InjectError::EmptyDocstring` if nothing is left after trimming
pub fn docstring_lines(text: &str, indent: &str) -> Result<Vec<String>, InjectError> {
    let mut lines = render_docstring(text, indent)?;
    if let Some(first) = lines.first_mut() {
        first.insert_str(0, indent);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_line() {
        assert_eq!(
            docstring_lines("  Return the sum.  ", "    ").unwrap(),
            vec!["    \"\"\"Return the sum.\"\"\""]
        );
    }

    #[test]
    fn multi_line_is_reindented() {
        assert_eq!(
            docstring_lines("Summary.\n\n  Details here.\n", "  ").unwrap(),
            vec!["  \"\"\"Summary.", "", "  Details here.\"\"\""]
        );
    }

    #[test]
    fn relative_indentation_survives() {
        assert_eq!(
            docstring_lines("Options:\n    - a\n      - b", "").unwrap(),
            vec!["\"\"\"Options:", "- a", "  - b\"\"\""]
        );
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(
            render_docstring(r#"Split on "\n" and """ markers"#, "").unwrap(),
            vec![r#""""Split on "\\n" and \"\"\" markers""""#]
        );
    }

    #[test]
    fn trailing_quote_is_separated() {
        assert_eq!(
            render_docstring("Return \"ok\"", "").unwrap(),
            vec![r#""""Return "ok" """"#]
        );
    }

    #[test]
    fn empty_rejected() {
        assert_eq!(render_docstring(" \n\t", ""), Err(InjectError::EmptyDocstring));
    }
}
