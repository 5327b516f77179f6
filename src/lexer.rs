//! Lexeme layer: a backtracking cursor over the input plus the literal and
//! token rules of the query language.
//!
//! Every rule that consumes a token also consumes the whitespace after it,
//! so the grammar above this layer never handles whitespace explicitly
//! (`X=10` and `X = 10` read the same). Rules return `Err(())` without
//! consuming observable state; the cursor separately records the furthest
//! position any rule failed at, together with what was expected there, which
//! becomes the diagnostic if the whole parse fails.

use crate::ast::{Point, Value};
use crate::error::SyntaxError;

/// Outcome of one grammar rule. The payload-free error is deliberate:
/// failure detail lives in the cursor's furthest-failure record.
pub(crate) type Scan<T> = Result<T, ()>;

pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    /// Furthest byte offset any rule has failed at.
    worst: usize,
    /// Descriptions expected at `worst`, in first-recorded order.
    expected: Vec<String>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Cursor {
            input,
            pos: 0,
            worst: 0,
            expected: Vec::new(),
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Backtrack to an earlier position. The furthest-failure record is
    /// intentionally left alone.
    pub(crate) fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Record a failure at `at` expecting `what` and return the error.
    pub(crate) fn fail<T>(&mut self, at: usize, what: &str) -> Scan<T> {
        if at > self.worst {
            self.worst = at;
            self.expected.clear();
        }
        if at == self.worst && !self.expected.iter().any(|e| e == what) {
            self.expected.push(what.to_string());
        }
        Err(())
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Match `tok` exactly at the current position. No word-boundary rule:
    /// keywords are plain prefix matches, as in the original grammar.
    pub(crate) fn token(&mut self, tok: &str) -> Scan<()> {
        if self.input[self.pos..].starts_with(tok) {
            self.pos += tok.len();
            self.skip_whitespace();
            Ok(())
        } else {
            self.fail(self.pos, &format!("'{tok}'"))
        }
    }

    /// Field name: `[A-Za-z_][A-Za-z0-9_]*`. No reserved words.
    pub(crate) fn ident(&mut self) -> Scan<String> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        match bytes.get(start) {
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
            _ => return self.fail(start, "an identifier"),
        }
        let mut end = start + 1;
        while bytes
            .get(end)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            end += 1;
        }
        let name = self.input[start..end].to_string();
        self.pos = end;
        self.skip_whitespace();
        Ok(name)
    }

    /// JSON-style number: optional `-`, `0|[1-9][0-9]*`, optional fraction,
    /// optional exponent. A leading `+` is rejected.
    pub(crate) fn number(&mut self) -> Scan<f64> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start;
        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
        match bytes.get(i) {
            Some(b'0') => i += 1,
            Some(b) if b.is_ascii_digit() => {
                while bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
                    i += 1;
                }
            }
            _ => return self.fail(start, "a number"),
        }
        if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()) {
            i += 2;
            while bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
                i += 1;
            }
        }
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'+' | b'-')) {
                j += 1;
            }
            if bytes.get(j).is_some_and(|b| b.is_ascii_digit()) {
                while bytes.get(j).is_some_and(|b| b.is_ascii_digit()) {
                    j += 1;
                }
                i = j;
            }
        }
        let Ok(n) = self.input[start..i].parse::<f64>() else {
            return self.fail(start, "a number");
        };
        self.pos = i;
        self.skip_whitespace();
        Ok(n)
    }

    /// Quoted string. The body admits any character except a bare `"` or
    /// `\`, plus `\` followed by any character; it is then decoded with JSON
    /// string-escape semantics. A body that is not a valid JSON string (bad
    /// escape, lone surrogate, raw control character) is a syntax error at
    /// the opening quote.
    pub(crate) fn string(&mut self) -> Scan<String> {
        let start = self.pos;
        if !self.input[start..].starts_with('"') {
            return self.fail(start, "a quoted string");
        }
        let body_start = start + 1;
        let mut chars = self.input[body_start..].char_indices();
        let (body_end, end) = loop {
            match chars.next() {
                None => return self.fail(self.input.len(), "'\"'"),
                Some((off, '"')) => break (body_start + off, body_start + off + 1),
                Some((_, '\\')) => {
                    if chars.next().is_none() {
                        return self.fail(self.input.len(), "'\"'");
                    }
                }
                Some(_) => {}
            }
        };
        let body = &self.input[body_start..body_end];
        let Ok(decoded) = serde_json::from_str::<String>(&format!("\"{body}\"")) else {
            return self.fail(start, "a quoted string");
        };
        self.pos = end;
        self.skip_whitespace();
        Ok(decoded)
    }

    /// Literal value: quoted string, number, `true`, `false`, or `null`,
    /// tried in that order.
    pub(crate) fn value(&mut self) -> Scan<Value> {
        let start = self.pos;
        let (worst_before, expected_before) = (self.worst, self.expected.len());
        if let Ok(s) = self.string() {
            return Ok(Value::String(s));
        }
        self.rewind(start);
        if let Ok(n) = self.number() {
            return Ok(Value::Number(n));
        }
        self.rewind(start);
        if self.token("true").is_ok() {
            return Ok(Value::Boolean(true));
        }
        self.rewind(start);
        if self.token("false").is_ok() {
            return Ok(Value::Boolean(false));
        }
        self.rewind(start);
        if self.token("null").is_ok() {
            return Ok(Value::Null);
        }
        self.rewind(start);
        // Collapse the per-literal expectations into one description, unless
        // an alternative got past the first character (a malformed string),
        // in which case its deeper position is the better diagnostic.
        if self.worst == start {
            if worst_before == start {
                self.expected.truncate(expected_before);
            } else {
                self.expected.clear();
            }
            if !self.expected.iter().any(|e| e == "a value") {
                self.expected.push("a value".to_string());
            }
        }
        Err(())
    }

    /// Coordinate pair: `(` number number `)`. The separator between the
    /// numbers is whatever the first number's trailing-whitespace rule eats,
    /// so a sign may serve as the boundary (`(1 -2)` and `(1-2)` both read
    /// lat 1, lon -2).
    pub(crate) fn point(&mut self) -> Scan<Point> {
        self.token("(")?;
        let lat = self.number()?;
        let lon = self.number()?;
        self.token(")")?;
        Ok(Point { lat, lon })
    }

    /// Require the whole input to have been consumed.
    pub(crate) fn expect_eof(&mut self) -> Scan<()> {
        if self.pos >= self.input.len() {
            Ok(())
        } else {
            self.fail(self.pos, "end of input")
        }
    }

    /// Convert the furthest-failure record into the public error type.
    pub(crate) fn into_error(mut self) -> SyntaxError {
        self.expected.sort();
        self.expected.dedup();
        let upto = &self.input[..self.worst];
        let line = upto.matches('\n').count() + 1;
        let line_start = upto.rfind('\n').map_or(0, |i| i + 1);
        let column = self.input[line_start..self.worst].chars().count() + 1;
        SyntaxError {
            position: self.worst,
            line,
            column,
            expected: self.expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_of(input: &str) -> Scan<f64> {
        Cursor::new(input).number()
    }

    #[test]
    fn number_forms() {
        assert_eq!(number_of("12345"), Ok(12345.0));
        assert_eq!(number_of("-12345"), Ok(-12345.0));
        assert_eq!(number_of("0"), Ok(0.0));
        assert_eq!(number_of("1.23"), Ok(1.23));
        assert_eq!(number_of("1.23e45"), Ok(1.23e45));
        assert_eq!(number_of("1.23e+45"), Ok(1.23e45));
        assert_eq!(number_of("1.23e-45"), Ok(1.23e-45));
        assert_eq!(number_of("1E23"), Ok(1e23));
        assert_eq!(number_of("-1e-23"), Ok(-1e-23));
    }

    #[test]
    fn number_rejects_leading_plus() {
        assert_eq!(number_of("+12345"), Err(()));
    }

    #[test]
    fn number_stops_at_redundant_leading_zero() {
        // Leading-match semantics: `012` reads as `0` with `12` left over.
        let mut cursor = Cursor::new("012");
        assert_eq!(cursor.number(), Ok(0.0));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn number_without_fraction_digits_stops_at_dot() {
        let mut cursor = Cursor::new("12.");
        assert_eq!(cursor.number(), Ok(12.0));
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn number_without_exponent_digits_stops_at_e() {
        let mut cursor = Cursor::new("12e+");
        assert_eq!(cursor.number(), Ok(12.0));
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn token_consumes_trailing_whitespace() {
        let mut cursor = Cursor::new("=   10");
        assert_eq!(cursor.token("="), Ok(()));
        assert_eq!(cursor.pos(), 4);
    }

    #[test]
    fn ident_shape() {
        let mut cursor = Cursor::new("_a1B  rest");
        assert_eq!(cursor.ident(), Ok("_a1B".to_string()));
        assert_eq!(cursor.pos(), 6);
        assert_eq!(Cursor::new("1abc").ident(), Err(()));
    }

    #[test]
    fn string_decodes_json_escapes() {
        assert_eq!(
            Cursor::new(r#""a \"b\" c""#).string(),
            Ok(r#"a "b" c"#.to_string())
        );
        assert_eq!(
            Cursor::new(r#""tab\there""#).string(),
            Ok("tab\there".to_string())
        );
        assert_eq!(Cursor::new(r#""A""#).string(), Ok("A".to_string()));
        assert_eq!(
            Cursor::new(r#""😀""#).string(),
            Ok("\u{1f600}".to_string())
        );
    }

    #[test]
    fn string_unterminated_fails_at_end() {
        let mut cursor = Cursor::new("\"abc");
        assert_eq!(cursor.string(), Err(()));
        assert_eq!(cursor.into_error().position, 4);
    }

    #[test]
    fn string_bad_escape_is_an_error() {
        assert_eq!(Cursor::new(r#""\q""#).string(), Err(()));
    }

    #[test]
    fn value_alternatives() {
        assert_eq!(
            Cursor::new("\"abc\"").value(),
            Ok(Value::String("abc".to_string()))
        );
        assert_eq!(Cursor::new("1.5").value(), Ok(Value::Number(1.5)));
        assert_eq!(Cursor::new("true").value(), Ok(Value::Boolean(true)));
        assert_eq!(Cursor::new("false").value(), Ok(Value::Boolean(false)));
        assert_eq!(Cursor::new("null").value(), Ok(Value::Null));
    }

    #[test]
    fn value_failure_collapses_expectations() {
        let mut cursor = Cursor::new("@");
        assert_eq!(cursor.value(), Err(()));
        let error = cursor.into_error();
        assert_eq!(error.position, 0);
        assert_eq!(error.expected, vec!["a value".to_string()]);
    }

    #[test]
    fn point_pair() {
        assert_eq!(
            Cursor::new("(100 200)").point(),
            Ok(Point {
                lat: 100.0,
                lon: 200.0
            })
        );
        assert_eq!(
            Cursor::new("(1.5 -2)").point(),
            Ok(Point { lat: 1.5, lon: -2.0 })
        );
        assert_eq!(Cursor::new("(100)").point(), Err(()));
    }

    #[test]
    fn furthest_failure_wins() {
        let mut cursor = Cursor::new("ab");
        let _: Scan<()> = cursor.fail(1, "later");
        let _: Scan<()> = cursor.fail(0, "earlier");
        let _: Scan<()> = cursor.fail(1, "also later");
        let error = cursor.into_error();
        assert_eq!(error.position, 1);
        assert_eq!(
            error.expected,
            vec!["also later".to_string(), "later".to_string()]
        );
    }

    #[test]
    fn error_line_and_column_are_one_based_chars() {
        let mut cursor = Cursor::new("a\nδé=");
        let _: Scan<()> = cursor.fail(7, "a value");
        let error = cursor.into_error();
        assert_eq!(error.line, 2);
        assert_eq!(error.column, 4);
    }
}
