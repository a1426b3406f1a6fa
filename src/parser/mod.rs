//! # The Parser Value
//!
//! A [`Parser<T>`] pairs a human-readable **label** - a string
//! resembling the expression that produced it - with a **body**: a
//! function from a [`Context`] to either a `T` or a [`Failure`]. The
//! body sits behind an `Rc`, so parsers clone cheaply and compose by
//! capturing each other.
//!
//! Composition happens through methods ([`fmap`], [`bind`], [`seq`],
//! [`or`], [`peek`], [`failing`]) and operator overloads:
//!
//! | operator | meaning |
//! |----------|---------|
//! | `a >> b` | sequence, keep `b`'s result |
//! | `a << b` | sequence, keep `a`'s result |
//! | `a \| b` | alternation (committed choice) |
//! | `p * n`  | exactly-n repetition, `Vec<T>` |
//! | `a + b`  | concatenate `Vec` results |
//!
//! Alternation is Parsec-style committed choice: the right branch is
//! tried only when the left failed without consuming input. Wrapping
//! the left in [`combinators::backtrack`] forces the retry
//! unconditionally.
//!
//! [`fmap`]: Parser::fmap
//! [`bind`]: Parser::bind
//! [`seq`]: Parser::seq
//! [`or`]: Parser::or
//! [`peek`]: Parser::peek
//! [`failing`]: Parser::failing

use std::ops::{Add, BitOr, Mul, Shl, Shr};
use std::rc::Rc;

pub mod combinators;
mod state;

pub use state::{Context, ExpectationFailed, Failure, ParseResult};

use crate::input::Input;
use crate::trace::Flags;

/// A composable parser producing a `T`.
pub struct Parser<T> {
    label: String,
    flags: Flags,
    body: Rc<dyn Fn(&mut Context) -> ParseResult<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            label: self.label.clone(),
            flags: self.flags,
            body: Rc::clone(&self.body),
        }
    }
}

impl<T: 'static> Parser<T> {
    /// Wrap a parse function together with its label.
    pub fn new(
        label: impl Into<String>,
        body: impl Fn(&mut Context) -> ParseResult<T> + 'static,
    ) -> Self {
        Parser {
            label: label.into(),
            flags: Flags::default(),
            body: Rc::new(body),
        }
    }

    /// The label naming this parser in diagnostics.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Same body under a new label, diagnostic flags reset.
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Parser {
            label: label.into(),
            flags: Flags::default(),
            body: Rc::clone(&self.body),
        }
    }

    /// Omit this parser's activations from diagnostics; their children
    /// are re-parented. For wrappers that add no information of their
    /// own. Must be applied at construction time, before the first
    /// parse.
    pub fn ignored(mut self) -> Self {
        self.flags.ignored = true;
        self
    }

    /// Elide this parser's internal activations from diagnostics,
    /// keeping the rendered tree readable despite deep compositional
    /// nesting. Subtrees marked [`exposed`](Parser::exposed) survive.
    pub fn collapsed(mut self) -> Self {
        self.flags.collapse = true;
        self
    }

    /// Render this parser's subtree normally even inside a
    /// [`collapsed`](Parser::collapsed) region.
    pub fn exposed(mut self) -> Self {
        self.flags.expose = true;
        self
    }

    /// Run this parser within an in-flight parse, recording an
    /// activation around the body.
    ///
    /// This is the entry point combinator bodies use to invoke their
    /// sub-parsers. It opens an activation at the current position,
    /// invokes the body, undoes the cursor effect on failure, and
    /// closes the activation with the end position and outcome.
    pub fn run(&self, ctx: &mut Context) -> ParseResult<T> {
        let start = ctx.input.pos();
        let id = ctx.trace.enter(&self.label, start, self.flags);
        let result = (self.body)(ctx);
        if result.is_err() {
            ctx.input.restore_to(start);
        }
        ctx.trace.exit(id, ctx.input.pos(), result.is_ok());
        result
    }

    /// Parse a string from its beginning.
    ///
    /// On failure the returned [`ExpectationFailed`] displays as a
    /// source-annotated diagnostic naming every activation that carried
    /// the failure.
    pub fn parse(&self, input: &str) -> Result<T, ExpectationFailed> {
        self.parse_input(Input::from_str(input))
    }

    /// Parse from a character source, pulled lazily. Everything read is
    /// retained for the duration of the call so backtracking and
    /// diagnostics work as for strings.
    pub fn parse_chars(
        &self,
        source: impl Iterator<Item = char> + 'static,
    ) -> Result<T, ExpectationFailed> {
        self.parse_input(Input::from_chars(source))
    }

    fn parse_input(&self, input: Input) -> Result<T, ExpectationFailed> {
        let mut ctx = Context::new(input);
        tracing::debug!(parser = %self.label, "parse start");
        match self.run(&mut ctx) {
            Ok(value) => {
                tracing::debug!(parser = %self.label, consumed = ctx.pos(), "parse succeeded");
                Ok(value)
            }
            Err(failure) => {
                let error = ExpectationFailed::from_context(&mut ctx, failure.at);
                tracing::debug!(
                    parser = %self.label,
                    line = error.line,
                    column = error.column,
                    "parse failed"
                );
                Err(error)
            }
        }
    }

    /// Apply `f` to the result on success; failures pass through. The
    /// label is preserved and the wrapper activation is ignored, since
    /// a pure value transform has no diagnostic footprint of its own.
    pub fn fmap<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Parser<U> {
        let label = self.label.clone();
        Parser::new(label, move |ctx| self.run(ctx).map(&f)).ignored()
    }

    /// Run this parser; on success, feed the result to `f` and run the
    /// parser it returns at the current position.
    pub fn bind<U: 'static>(self, f: impl Fn(T) -> Parser<U> + 'static) -> Parser<U> {
        let label = format!("{}.bind(_)", self.label);
        Parser::new(label, move |ctx| {
            let value = self.run(ctx)?;
            f(value).run(ctx)
        })
    }

    /// Run both in order, pairing the results.
    pub fn seq<U: 'static>(self, other: Parser<U>) -> Parser<(T, U)> {
        let label = crate::label::call("seq", &[&self, &other]);
        Parser::new(label, move |ctx| {
            let left = self.run(ctx)?;
            let right = other.run(ctx)?;
            Ok((left, right))
        })
    }

    /// Committed choice: try this parser; if it fails without having
    /// consumed input, try `other`. A failure after consumption
    /// propagates.
    pub fn or(self, other: Parser<T>) -> Parser<T> {
        let label = format!("({} | {})", self.label, other.label);
        Parser::new(label, move |ctx| {
            let start = ctx.pos();
            match self.run(ctx) {
                Ok(value) => Ok(value),
                Err(failure) if failure.at == start => other.run(ctx),
                Err(failure) => Err(failure),
            }
        })
    }

    /// Run without committing any cursor movement; the result (or
    /// failure) is that of the inner parser.
    pub fn peek(self) -> Parser<T> {
        let label = crate::label::call("peek", &[&self]);
        Parser::new(label, move |ctx| {
            let start = ctx.pos();
            let result = self.run(ctx);
            ctx.input.restore_to(start);
            result
        })
    }

    /// Succeed with this parser's result iff `probe` would fail at the
    /// current position; otherwise fail without consuming.
    pub fn failing<U: 'static>(self, probe: Parser<U>) -> Parser<T> {
        let label = crate::label::call("failing", &[&self, &probe]);
        Parser::new(label, move |ctx| {
            let start = ctx.pos();
            let probed = probe.run(ctx);
            ctx.input.restore_to(start);
            match probed {
                Ok(_) => Err(Failure { at: start }),
                Err(_) => self.run(ctx),
            }
        })
    }
}

// === Operator overloading ===

/// `a >> b`: sequence, keep the right result.
impl<T: 'static, U: 'static> Shr<Parser<U>> for Parser<T> {
    type Output = Parser<U>;

    fn shr(self, rhs: Parser<U>) -> Self::Output {
        let label = format!("({} >> {})", self.label, rhs.label);
        Parser::new(label, move |ctx| {
            self.run(ctx)?;
            rhs.run(ctx)
        })
    }
}

/// `a << b`: sequence, keep the left result.
impl<T: 'static, U: 'static> Shl<Parser<U>> for Parser<T> {
    type Output = Parser<T>;

    fn shl(self, rhs: Parser<U>) -> Self::Output {
        let label = format!("({} << {})", self.label, rhs.label);
        Parser::new(label, move |ctx| {
            let left = self.run(ctx)?;
            rhs.run(ctx)?;
            Ok(left)
        })
    }
}

/// `a | b`: committed-choice alternation.
impl<T: 'static> BitOr for Parser<T> {
    type Output = Parser<T>;

    fn bitor(self, rhs: Parser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `p * n`: exactly `n` successive applications.
impl<T: 'static> Mul<usize> for Parser<T> {
    type Output = Parser<Vec<T>>;

    fn mul(self, count: usize) -> Self::Output {
        let label = format!("({} * {count})", self.label);
        Parser::new(label, move |ctx| {
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(self.run(ctx)?);
            }
            Ok(items)
        })
    }
}

/// `a + b`: run both in order, concatenating their sequence results.
impl<T: 'static> Add for Parser<Vec<T>> {
    type Output = Parser<Vec<T>>;

    fn add(self, rhs: Self) -> Self::Output {
        let label = format!("({} + {})", self.label, rhs.label);
        Parser::new(label, move |ctx| {
            let mut items = self.run(ctx)?;
            items.extend(rhs.run(ctx)?);
            Ok(items)
        })
    }
}
