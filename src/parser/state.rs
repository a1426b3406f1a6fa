//! # Parse State Management
//!
//! This module provides the state threaded through every parser
//! invocation and the crate's failure types:
//!
//! - **Context**: the per-parse aggregate of backtracking input and
//!   parse-tree recorder
//! - **Failure** / **ParseResult**: the lightweight signal a parser
//!   body produces when its expectation is not met
//! - **ExpectationFailed**: the public error returned by a top-level
//!   parse, carrying the rendered diagnostic
//!
//! ## Failure propagation
//!
//! A primitive signals failure by returning a [`Failure`] holding the
//! position at which its expectation was not met - always the
//! primitive's own entry position, since cursor effects of a failed
//! parser are undone centrally by [`Parser::run`]. Composite parsers
//! propagate failures with `?`:
//!
//! ```text
//! let left = p.run(ctx)?;     // a failure here aborts the composite;
//! let right = q.run(ctx)?;    // run() has already rewound the cursor
//! Ok((left, right))
//! ```
//!
//! Alternation inspects [`Failure::at`] to decide whether the failed
//! branch consumed input: a branch whose failure position equals the
//! branch entry position consumed nothing, so the next branch may be
//! tried. Anything else is a committed failure and propagates.
//!
//! [`Parser::run`]: crate::parser::Parser::run

use thiserror::Error;

use crate::input::Input;
use crate::trace::Trace;

/// A parser's expectation was not met.
///
/// Carries only the failure position; everything needed to explain the
/// failure to a human lives in the [`Context`]'s recorder, which the
/// top level turns into an [`ExpectationFailed`].
#[derive(Debug, Clone, Copy)]
pub struct Failure {
    /// Entry position of the parser that raised the failure.
    pub at: usize,
}

/// Result type for parser bodies.
pub type ParseResult<T> = Result<T, Failure>;

/// Everything one parse call threads through its parsers: the
/// backtracking input and the live activation recorder. Strictly
/// private to a single parse; a grammar value may be reused across
/// parses because each call builds a fresh context.
pub struct Context {
    pub(crate) input: Input,
    pub(crate) trace: Trace,
}

impl Context {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            trace: Trace::new(),
        }
    }

    /// Current cursor offset.
    pub fn pos(&self) -> usize {
        self.input.pos()
    }

    /// The backtracking input, for custom parser bodies.
    pub fn input(&mut self) -> &mut Input {
        &mut self.input
    }
}

/// A top-level parse failed.
///
/// `Display` is the rendered multi-line diagnostic: the failing source
/// line annotated with the span and outcome of every activation that
/// carried the failure. See the crate docs for the format.
#[derive(Debug, Clone, Error)]
#[error("{rendered}")]
pub struct ExpectationFailed {
    /// Character offset of the failure.
    pub at: usize,
    /// 1-based line of the failure.
    pub line: usize,
    /// 1-based column of the failure.
    pub column: usize,
    rendered: String,
}

impl ExpectationFailed {
    pub(crate) fn from_context(ctx: &mut Context, at: usize) -> Self {
        ctx.input.fill_through_line(at);
        let rendered = crate::trace::render(&ctx.input, &ctx.trace, at);
        let (line, column) = ctx.input.line_col(at);
        Self {
            at,
            line,
            column,
            rendered,
        }
    }

    /// The rendered diagnostic, same text as `Display`.
    pub fn diagnostic(&self) -> &str {
        &self.rendered
    }
}
