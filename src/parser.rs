//! Recursive-descent grammar for predicate clauses and boolean composition.
//!
//! Grammar (in rough EBNF; every token also eats trailing whitespace):
//!
//! expression = and_chain | or_chain | simple
//! and_chain  = simple "AND" expression
//! or_chain   = simple "OR" expression
//! simple     = eq | not_eq | prefix | range | between | geobox
//!            | geodistance | in | has_field | not | group
//! eq         = IDENT "=" value
//! not_eq     = IDENT "!=" value
//! prefix     = IDENT ("^=" | "PREFIX") string
//! range      = IDENT ("<" | "<=" | ">" | ">=") number
//! between    = number ("<" | "<=") IDENT ("<" | "<=") number
//! geobox     = IDENT "IN" point "-" point
//! geodistance= IDENT "IN" number "FROM" point
//! in         = IDENT "IN" "(" value+ ")"
//! has_field  = "HAS" IDENT ("STRING" | "INTEGER" | "DECIMAL" | "BOOLEAN")
//! not        = ("!" | "NOT") expression
//! group      = "(" (and_chain | or_chain | not) ")"
//!
//! Alternatives are tried strictly in the order written above; the order is
//! part of the language, not an implementation detail. In particular an
//! AND chain is attempted before an OR chain at every choice point, which is
//! what gives mixed chains their shape: `A AND B OR C` parses as
//! `And{A, Or{B, C}}` while `A OR B AND C` parses as `Or{A, And{B, C}}`.
//! There is no precedence table.

use crate::ast::{Clause, DISTANCE_FIELD, FieldType, GeoBounds};
use crate::error::SyntaxError;
use crate::lexer::{Cursor, Scan};

/// Parse a complete filter-query expression into a clause tree.
///
/// The whole input must be consumed, trailing whitespace aside; anything
/// left over is a failure. On failure the error carries the furthest input
/// position the parse reached and the token descriptions expected there.
/// Never returns a partial tree and never panics.
pub fn parse(input: &str) -> Result<Clause, SyntaxError> {
    let mut parser = Parser {
        cursor: Cursor::new(input),
    };
    match parser.run() {
        Ok(clause) => Ok(clause),
        Err(()) => Err(parser.cursor.into_error()),
    }
}

struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl Parser<'_> {
    fn run(&mut self) -> Scan<Clause> {
        let clause = self.expression()?;
        self.cursor.expect_eof()?;
        Ok(clause)
    }

    /// Try each alternative from the current position; first success wins.
    fn first_of(&mut self, alternatives: &[fn(&mut Self) -> Scan<Clause>]) -> Scan<Clause> {
        let start = self.cursor.pos();
        for alternative in alternatives {
            if let Ok(clause) = alternative(self) {
                return Ok(clause);
            }
            self.cursor.rewind(start);
        }
        Err(())
    }

    fn expression(&mut self) -> Scan<Clause> {
        self.first_of(&[Self::and_chain, Self::or_chain, Self::simple])
    }

    fn simple(&mut self) -> Scan<Clause> {
        self.first_of(&[
            Self::eq,
            Self::not_eq,
            Self::prefix,
            Self::range,
            Self::between,
            Self::geo_box,
            Self::geo_distance,
            Self::in_list,
            Self::has_field,
            Self::not,
            Self::group,
        ])
    }

    /// `simple "AND" expression`. When the recursively parsed right side is
    /// itself an And, the left operand is prepended into its clause list, so
    /// runs of the same connective flatten into one n-ary node; any other
    /// right side gets a fresh 2-ary And.
    fn and_chain(&mut self) -> Scan<Clause> {
        let left = self.simple()?;
        self.cursor.token("AND")?;
        Ok(match self.expression()? {
            Clause::And { mut clauses } => {
                clauses.insert(0, left);
                Clause::And { clauses }
            }
            right => Clause::And {
                clauses: vec![left, right],
            },
        })
    }

    fn or_chain(&mut self) -> Scan<Clause> {
        let left = self.simple()?;
        self.cursor.token("OR")?;
        Ok(match self.expression()? {
            Clause::Or { mut clauses } => {
                clauses.insert(0, left);
                Clause::Or { clauses }
            }
            right => Clause::Or {
                clauses: vec![left, right],
            },
        })
    }

    fn eq(&mut self) -> Scan<Clause> {
        let field = self.cursor.ident()?;
        self.cursor.token("=")?;
        let value = self.cursor.value()?;
        Ok(Clause::Eq { field, value })
    }

    /// `field != value`, desugared to `Not{Eq}` at parse time.
    fn not_eq(&mut self) -> Scan<Clause> {
        let field = self.cursor.ident()?;
        self.cursor.token("!=")?;
        let value = self.cursor.value()?;
        Ok(Clause::Eq { field, value }.negated())
    }

    fn prefix(&mut self) -> Scan<Clause> {
        let field = self.cursor.ident()?;
        let at_op = self.cursor.pos();
        if self.cursor.token("^=").is_err() {
            self.cursor.rewind(at_op);
            self.cursor.token("PREFIX")?;
        }
        let prefix = self.cursor.string()?;
        Ok(Clause::Prefix { field, prefix })
    }

    /// `<=` or `<`, longest first; yields whether the bound is inclusive.
    fn less_op(&mut self) -> Scan<bool> {
        let start = self.cursor.pos();
        if self.cursor.token("<=").is_ok() {
            return Ok(true);
        }
        self.cursor.rewind(start);
        self.cursor.token("<")?;
        Ok(false)
    }

    fn greater_op(&mut self) -> Scan<bool> {
        let start = self.cursor.pos();
        if self.cursor.token(">=").is_ok() {
            return Ok(true);
        }
        self.cursor.rewind(start);
        self.cursor.token(">")?;
        Ok(false)
    }

    /// Single-bound range: `field < n`, `field >= n`, ...
    fn range(&mut self) -> Scan<Clause> {
        let field = self.cursor.ident()?;
        let at_op = self.cursor.pos();
        if let Ok(included) = self.less_op() {
            let limit = self.cursor.number()?;
            return Ok(range_clause(field, None, Some((limit, included))));
        }
        self.cursor.rewind(at_op);
        let included = self.greater_op()?;
        let limit = self.cursor.number()?;
        Ok(range_clause(field, Some((limit, included)), None))
    }

    /// Double-bound range: `12 <= field < 34`. Prefix-disjoint from `range`
    /// because it starts with a number, not an identifier. Only the
    /// less-than operators participate.
    fn between(&mut self) -> Scan<Clause> {
        let lower_limit = self.cursor.number()?;
        let lower_included = self.less_op()?;
        let field = self.cursor.ident()?;
        let upper_included = self.less_op()?;
        let upper_limit = self.cursor.number()?;
        Ok(range_clause(
            field,
            Some((lower_limit, lower_included)),
            Some((upper_limit, upper_included)),
        ))
    }

    /// `field IN point - point`. The corner labels are positional: the first
    /// point is stored as `ne`, the second as `sw`, unchecked.
    fn geo_box(&mut self) -> Scan<Clause> {
        let field = self.cursor.ident()?;
        self.cursor.token("IN")?;
        let ne = self.cursor.point()?;
        self.cursor.token("-")?;
        let sw = self.cursor.point()?;
        Ok(Clause::GeoBox {
            field,
            bounds: GeoBounds { ne, sw },
        })
    }

    fn geo_distance(&mut self) -> Scan<Clause> {
        let field = self.cursor.ident()?;
        self.cursor.token("IN")?;
        let radius = self.cursor.number()?;
        self.cursor.token("FROM")?;
        let center = self.cursor.point()?;
        Ok(Clause::GeoDistance {
            field,
            center,
            radius,
            distance_field: DISTANCE_FIELD.to_string(),
        })
    }

    /// `field IN (value+)`, space-separated, at least one value, no commas.
    /// Tried after the geo forms, which also open with `field IN`.
    fn in_list(&mut self) -> Scan<Clause> {
        let field = self.cursor.ident()?;
        self.cursor.token("IN")?;
        self.cursor.token("(")?;
        let mut values = vec![self.cursor.value()?];
        loop {
            let at_value = self.cursor.pos();
            match self.cursor.value() {
                Ok(value) => values.push(value),
                Err(()) => {
                    self.cursor.rewind(at_value);
                    break;
                }
            }
        }
        self.cursor.token(")")?;
        Ok(Clause::In { field, values })
    }

    fn has_field(&mut self) -> Scan<Clause> {
        self.cursor.token("HAS")?;
        let field = self.cursor.ident()?;
        let field_type = self.field_type()?;
        Ok(Clause::HasField { field, field_type })
    }

    fn field_type(&mut self) -> Scan<FieldType> {
        let start = self.cursor.pos();
        for (name, field_type) in [
            ("STRING", FieldType::String),
            ("INTEGER", FieldType::Integer),
            ("DECIMAL", FieldType::Decimal),
            ("BOOLEAN", FieldType::Boolean),
        ] {
            if self.cursor.token(name).is_ok() {
                return Ok(field_type);
            }
            self.cursor.rewind(start);
        }
        Err(())
    }

    /// `!` or `NOT` followed by a full expression, maximally greedy: the
    /// operand extends as far right as an expression can.
    fn not(&mut self) -> Scan<Clause> {
        let start = self.cursor.pos();
        if self.cursor.token("!").is_err() {
            self.cursor.rewind(start);
            self.cursor.token("NOT")?;
        }
        Ok(self.expression()?.negated())
    }

    /// Parenthesized AND/OR chain or negation, yielded verbatim. A bare
    /// simple clause in parentheses is not part of the grammar.
    fn group(&mut self) -> Scan<Clause> {
        self.cursor.token("(")?;
        let inner = self.first_of(&[Self::and_chain, Self::or_chain, Self::not])?;
        self.cursor.token(")")?;
        Ok(inner)
    }
}

/// Assemble a Range clause from optional (limit, included) bound pairs.
/// Callers always supply at least one bound.
fn range_clause(field: String, lower: Option<(f64, bool)>, upper: Option<(f64, bool)>) -> Clause {
    let (lower_limit, lower_included) = match lower {
        Some((limit, included)) => (Some(limit), Some(included)),
        None => (None, None),
    };
    let (upper_limit, upper_included) = match upper {
        Some((limit, included)) => (Some(limit), Some(included)),
        None => (None, None),
    };
    Clause::Range {
        field,
        lower_limit,
        lower_included,
        upper_limit,
        upper_included,
    }
}
