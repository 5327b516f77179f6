//! Filter-query parser producing clause trees.
//!
//! Syntax:
//!   field = value                    - equality
//!   field != value                   - negated equality
//!   field ^= "s", field PREFIX "s"   - string prefix
//!   field < n (also <=, >, >=)       - single-bound range
//!   12 <= field < 34                 - double-bound range
//!   field IN (v1 v2 v3)              - membership, space separated
//!   field IN (lat lon) - (lat lon)   - bounding box
//!   field IN radius FROM (lat lon)   - distance from a point
//!   HAS field STRING                 - field existence (STRING, INTEGER,
//!                                      DECIMAL, BOOLEAN)
//!   NOT expr, !expr                  - negation, greedy to the right
//!   a AND b, a OR b                  - connective chains; same-connective
//!                                      runs flatten into one n-ary node
//!   (chain), (NOT expr)              - grouping
//!
//! [`parse`] either returns the complete clause tree or a [`SyntaxError`]
//! locating the furthest position the parse reached and what was expected
//! there. Parsing is pure and re-entrant: no I/O, no process-wide state, safe
//! to call from any number of threads. Stack use grows with nesting depth, so
//! cap input length before feeding adversarial input to a deep recursion.

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{Clause, DISTANCE_FIELD, FieldType, GeoBounds, Point, Value};
pub use error::SyntaxError;
pub use parser::parse;
