//! Syntax-error type with caret-style diagnostics.

/// The single error kind the parser produces.
///
/// `position` is a byte offset into the original input; `line` and `column`
/// are 1-based and counted in characters. `expected` lists the token
/// descriptions that would have allowed the parse to continue at the furthest
/// point it reached, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at line {line}, column {column}: expected {}", expected_list(.expected))]
pub struct SyntaxError {
    pub position: usize,
    pub line: usize,
    pub column: usize,
    pub expected: Vec<String>,
}

fn expected_list(expected: &[String]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [one] => one.clone(),
        many => format!("one of {}", many.join(", ")),
    }
}

impl SyntaxError {
    /// Render the diagnostic against the input the parse was run on: the
    /// offending line, a caret under the failing column, and the expected
    /// alternatives.
    ///
    /// ```text
    /// X=10 AND
    ///          ^
    /// expected one of '!', '(', 'HAS', 'NOT', a number, an identifier
    /// ```
    pub fn render(&self, input: &str) -> String {
        let line_text = input.lines().nth(self.line - 1).unwrap_or("");
        let pad = " ".repeat(self.column - 1);
        format!(
            "{}\n{}^\nexpected {}",
            line_text,
            pad,
            expected_list(&self.expected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(position: usize, line: usize, column: usize, expected: &[&str]) -> SyntaxError {
        SyntaxError {
            position,
            line,
            column,
            expected: expected.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn display_mentions_location_and_expectations() {
        let e = err(2, 1, 3, &["a value"]);
        assert_eq!(
            e.to_string(),
            "syntax error at line 1, column 3: expected a value"
        );
    }

    #[test]
    fn render_points_caret_at_column() {
        let e = err(2, 1, 3, &["a value"]);
        assert_eq!(e.render("X="), "X=\n  ^\nexpected a value");
    }

    #[test]
    fn render_joins_multiple_expectations() {
        let e = err(0, 1, 1, &["'('", "an identifier"]);
        assert_eq!(
            e.render(""),
            "\n^\nexpected one of '(', an identifier"
        );
    }
}
