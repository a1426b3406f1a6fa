//! Kombi - parser combinators with tree-shaped error diagnostics
//!
//! A grammar is an expression tree of combinator applications; parsing
//! evaluates that tree against a backtracking input and produces either
//! a value or a failure rendered as a source-annotated diagnostic.
//!
//! ```
//! use kombi::{between, decimal, literal, sep_by};
//!
//! let list = between(literal("["), literal("]"), sep_by(literal(","), decimal()));
//! assert_eq!(list.parse("[1,2,3]").unwrap(), vec![1, 2, 3]);
//! ```
//!
//! Failures render the failing line with the span and outcome of every
//! activation that carried the failure, innermost first:
//!
//! ```text
//! line 1:
//!   foowat
//!      V    * failure: literal("bar")
//!   \-/     * failure: (literal("foo") >> literal("bar"))
//!   \-/     * success: literal("foo")
//! ```
//!
//! Alternation (`a | b`) is committed choice: the right branch is tried
//! only when the left failed without consuming input. Wrap the left in
//! [`backtrack`] to retry unconditionally.

pub mod input;
pub mod label;
pub mod parser;
mod trace;

pub use parser::combinators::*;
pub use parser::{Context, ExpectationFailed, Failure, ParseResult, Parser};
