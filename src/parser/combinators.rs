//! The combinator library. Everything here is an expression over the
//! fundamental operators in [`super`]; each function's doc comment is
//! its contract.

use std::cell::OnceCell;
use std::rc::Rc;

use regex::Regex;

use crate::label;

use super::{Context, Failure, ParseResult, Parser};

// === Primitives ===

/// Read as many characters as `s` has; succeed iff they equal `s`.
pub fn literal(s: impl Into<String>) -> Parser<String> {
    let s = s.into();
    let label = label::call("literal", &[&s]);
    let n = s.chars().count();
    Parser::new(label, move |ctx| {
        let start = ctx.pos();
        let got = ctx.input().read(n);
        if got == s {
            Ok(got)
        } else {
            Err(Failure { at: start })
        }
    })
}

/// As [`literal`], comparing case-insensitively. The returned string is
/// the input as read, original case preserved.
pub fn literal_ci(s: impl Into<String>) -> Parser<String> {
    let s = s.into();
    let label = label::call("literal_ci", &[&s]);
    let n = s.chars().count();
    let lowered = s.to_lowercase();
    Parser::new(label, move |ctx| {
        let start = ctx.pos();
        let got = ctx.input().read(n);
        if got.to_lowercase() == lowered {
            Ok(got)
        } else {
            Err(Failure { at: start })
        }
    })
}

/// Read one character; succeed iff it matches the regex `pattern`.
///
/// Panics at construction time if `pattern` is not a valid regex.
pub fn char_matching(pattern: &str) -> Parser<char> {
    let re = compile(pattern);
    let label = format!("char_matching(/{pattern}/)");
    Parser::new(label, move |ctx| {
        let start = ctx.pos();
        let mut utf8 = [0u8; 4];
        match ctx.input().read1() {
            Some(c) => {
                if re.is_match(c.encode_utf8(&mut utf8)) {
                    Ok(c)
                } else {
                    Err(Failure { at: start })
                }
            }
            None => Err(Failure { at: start }),
        }
    })
}

/// Read one character; succeed iff it appears in `set`.
pub fn char_in(set: impl Into<String>) -> Parser<char> {
    let set = set.into();
    let label = label::call("char_in", &[&set]);
    Parser::new(label, move |ctx| {
        let start = ctx.pos();
        match ctx.input().read1() {
            Some(c) if set.contains(c) => Ok(c),
            _ => Err(Failure { at: start }),
        }
    })
}

/// Read any one character; fail at end of input.
pub fn any_char() -> Parser<char> {
    Parser::new("any_char", |ctx| {
        let start = ctx.pos();
        ctx.input().read1().ok_or(Failure { at: start })
    })
}

/// Succeed iff at end of input, consuming nothing.
pub fn eof() -> Parser<()> {
    Parser::new("eof", |ctx| {
        let start = ctx.pos();
        if ctx.input().eof() {
            Ok(())
        } else {
            Err(Failure { at: start })
        }
    })
}

/// Succeed with `x`, consuming nothing.
pub fn pure<T: Clone + 'static>(x: T) -> Parser<T> {
    Parser::new("pure", move |_ctx| Ok(x.clone()))
}

/// Always fail, consuming nothing.
pub fn unparseable<T: 'static>() -> Parser<T> {
    Parser::new("unparseable", |ctx| Err(Failure { at: ctx.pos() }))
}

// === Repetition ===

/// Greedy zero-or-more. Stops at end of input (checked before each
/// attempt), on the first failure of `parser`, or after a success that
/// consumed nothing. Never fails; on stop the cursor sits after the
/// last successful iteration.
pub fn many<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    let label = label::call("many", &[&parser]);
    Parser::new(label, move |ctx| {
        let mut items = Vec::new();
        loop {
            if ctx.input().eof() {
                break;
            }
            let before = ctx.pos();
            match parser.run(ctx) {
                Ok(item) => {
                    items.push(item);
                    if ctx.pos() == before {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        Ok(items)
    })
}

/// As [`many`], but requires at least one iteration.
pub fn many_1<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    let label = label::call("many_1", &[&parser]);
    let rest = many(parser.clone());
    Parser::new(label, move |ctx| {
        let first = parser.run(ctx)?;
        let mut items = vec![first];
        items.extend(rest.run(ctx)?);
        Ok(items)
    })
}

/// `item` interleaved with `separator`; the zero-length form never
/// fails. A trailing separator is not consumed.
pub fn sep_by<S: 'static, T: 'static>(separator: Parser<S>, item: Parser<T>) -> Parser<Vec<T>> {
    let label = label::call("sep_by", &[&separator, &item]);
    let tail = many(separator.exposed() >> item.clone().exposed());
    let item = item.exposed();
    Parser::new(label, move |ctx| {
        let first = match item.run(ctx) {
            Ok(first) => first,
            Err(_) => return Ok(Vec::new()),
        };
        let mut items = vec![first];
        items.extend(tail.run(ctx)?);
        Ok(items)
    })
    .collapsed()
}

/// As [`sep_by`], but requires at least one `item`.
pub fn sep_by_1<S: 'static, T: 'static>(separator: Parser<S>, item: Parser<T>) -> Parser<Vec<T>> {
    let label = label::call("sep_by_1", &[&separator, &item]);
    let tail = many(separator.exposed() >> item.clone().exposed());
    let item = item.exposed();
    Parser::new(label, move |ctx| {
        let first = item.run(ctx)?;
        let mut items = vec![first];
        items.extend(tail.run(ctx)?);
        Ok(items)
    })
    .collapsed()
}

/// Run the parsers in order, collecting their results.
pub fn group<T: 'static>(parsers: impl IntoIterator<Item = Parser<T>>) -> Parser<Vec<T>> {
    let parsers: Vec<Parser<T>> = parsers.into_iter().collect();
    let labels: Vec<&dyn label::ToLabel> =
        parsers.iter().map(|p| p as &dyn label::ToLabel).collect();
    let label = label::call("group", &labels);
    Parser::new(label, move |ctx| {
        let mut items = Vec::with_capacity(parsers.len());
        for parser in &parsers {
            items.push(parser.run(ctx)?);
        }
        Ok(items)
    })
}

/// Wrap `parser`'s result in a one-element sequence, for concatenation
/// with `+`.
pub fn single<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    let label = label::call("single", &[&parser]);
    parser.fmap(|item| vec![item]).with_label(label)
}

// === Choice ===

/// Make any failure of `parser` a non-consuming one, so an enclosing
/// alternation will fall through to its next branch.
pub fn backtrack<T: 'static>(parser: Parser<T>) -> Parser<T> {
    let label = label::call("backtrack", &[&parser]);
    Parser::new(label, move |ctx| {
        let start = ctx.pos();
        parser.run(ctx).map_err(|_| Failure { at: start })
    })
}

/// `parser`'s result, or `None` if it fails without consuming input.
/// A failure after consumption propagates, exactly as for `|`.
pub fn optional<T: 'static>(parser: Parser<T>) -> Parser<Option<T>> {
    let label = label::call("optional", &[&parser]);
    Parser::new(label, move |ctx| {
        let start = ctx.pos();
        match parser.run(ctx) {
            Ok(value) => Ok(Some(value)),
            Err(failure) if failure.at == start => Ok(None),
            Err(failure) => Err(failure),
        }
    })
}

/// Left-to-right alternation with committed-choice semantics; the
/// empty list never succeeds.
pub fn choice<T: 'static>(parsers: impl IntoIterator<Item = Parser<T>>) -> Parser<T> {
    let parsers: Vec<Parser<T>> = parsers.into_iter().collect();
    let labels: Vec<&dyn label::ToLabel> =
        parsers.iter().map(|p| p as &dyn label::ToLabel).collect();
    let label = label::call("choice", &labels);
    Parser::new(label, move |ctx| {
        let start = ctx.pos();
        for parser in &parsers {
            match parser.run(ctx) {
                Ok(value) => return Ok(value),
                Err(failure) if failure.at == start => continue,
                Err(failure) => return Err(failure),
            }
        }
        Err(Failure { at: start })
    })
}

/// Run `parser` without committing any cursor movement.
pub fn peek<T: 'static>(parser: Parser<T>) -> Parser<T> {
    parser.peek()
}

// === Brackets and whitespace ===

/// `left`, then `inner`, then `right`; yields `inner`'s result.
pub fn between<L: 'static, R: 'static, T: 'static>(
    left: Parser<L>,
    right: Parser<R>,
    inner: Parser<T>,
) -> Parser<T> {
    let label = label::call("between", &[&left, &right, &inner]);
    ((left.exposed() >> inner.exposed()) << right.exposed())
        .with_label(label)
        .collapsed()
}

/// `inner` with optional whitespace on both sides.
pub fn spaced<T: 'static>(inner: Parser<T>) -> Parser<T> {
    let label = label::call("spaced", &[&inner]);
    ((whitespace().exposed() >> inner.exposed()) << whitespace().exposed())
        .with_label(label)
        .collapsed()
}

/// Zero or more of space, tab, LF, CR.
pub fn whitespace() -> Parser<String> {
    many(char_in(" \t\n\r"))
        .fmap(|chars| chars.into_iter().collect())
        .with_label("whitespace")
        .collapsed()
}

/// One or more of space, tab, LF, CR.
pub fn whitespace_1() -> Parser<String> {
    many_1(char_in(" \t\n\r"))
        .fmap(|chars| chars.into_iter().collect())
        .with_label("whitespace_1")
        .collapsed()
}

// === Numbers ===

/// Case policy for [`hex_digit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexCase {
    Insensitive,
    Upper,
    Lower,
}

/// A single `[0-9]` digit.
pub fn decimal_digit() -> Parser<char> {
    char_in("0123456789").with_label("decimal_digit")
}

/// A single hex digit under the given case policy.
pub fn hex_digit(case: HexCase) -> Parser<char> {
    let set = match case {
        HexCase::Insensitive => "0123456789abcdefABCDEF",
        HexCase::Upper => "0123456789ABCDEF",
        HexCase::Lower => "0123456789abcdef",
    };
    let name = match case {
        HexCase::Insensitive => "insensitive",
        HexCase::Upper => "upper",
        HexCase::Lower => "lower",
    };
    char_in(set).with_label(format!("hex_digit({name})"))
}

/// One or more decimal digits as an integer. A run of digits that
/// overflows `i64` fails the parse.
pub fn decimal() -> Parser<i64> {
    let digits = many_1(decimal_digit());
    Parser::new("decimal", move |ctx| {
        let start = ctx.pos();
        let digits = digits.run(ctx)?;
        let text: String = digits.into_iter().collect();
        text.parse().map_err(|_| Failure { at: start })
    })
    .collapsed()
}

/// `sign? decimal ('.' decimal)? ([eE] sign? decimal)?` as a real
/// number: the whole part, plus fractional / 10^k for a k-digit
/// fractional part, negated for a leading '-', then scaled by 10^(±e)
/// for an exponent.
pub fn decimal_fraction() -> Parser<f64> {
    let sign = optional(char_in("+-"));
    let fraction = optional(literal(".") >> many_1(decimal_digit()));
    let exponent = optional(char_in("eE") >> optional(char_in("+-")).seq(decimal()));
    sign.seq(decimal())
        .seq(fraction)
        .seq(exponent)
        .fmap(|(((sign, whole), fraction), exponent)| {
            let mut value = whole as f64;
            if let Some(digits) = fraction {
                let k = digits.len() as i32;
                let numerator = digits.iter().fold(0.0, |acc, d| {
                    acc * 10.0 + d.to_digit(10).expect("decimal_digit yields digits") as f64
                });
                value += numerator / 10f64.powi(k);
            }
            if sign == Some('-') {
                value = -value;
            }
            if let Some((exp_sign, exp)) = exponent {
                let exp = exp as i32;
                value *= 10f64.powi(if exp_sign == Some('-') { -exp } else { exp });
            }
            value
        })
        .with_label("decimal_fraction")
        .collapsed()
}

// === Deferred and recursive grammars ===

/// Defer construction of a parser until parse time. The thunk runs once,
/// on the first parse that reaches this point.
pub fn lazy<T: 'static>(thunk: impl Fn() -> Parser<T> + 'static) -> Parser<T> {
    let cell: Rc<OnceCell<Parser<T>>> = Rc::new(OnceCell::new());
    Parser::new("lazy(_)", move |ctx| cell.get_or_init(&thunk).run(ctx)).ignored()
}

/// Fix-point: `define` receives a parser equivalent to the one being
/// defined, so grammars can refer to themselves. The returned value
/// owns the definition; the inner reference is non-owning, so dropping
/// the returned parser drops the whole cycle-free structure.
pub fn recursive<T: 'static>(define: impl FnOnce(Parser<T>) -> Parser<T>) -> Parser<T> {
    let cell: Rc<OnceCell<Parser<T>>> = Rc::new(OnceCell::new());
    let hook = Rc::downgrade(&cell);
    let this = Parser::new("recursive(...)", move |ctx| {
        let cell = hook
            .upgrade()
            .expect("recursive parser invoked after its definition was dropped");
        let defined = cell
            .get()
            .expect("recursive parser invoked before its definition was complete");
        defined.run(ctx)
    })
    .ignored();
    let defined = define(this);
    let label = defined.label().to_string();
    let _ = cell.set(defined);
    Parser::new(label, move |ctx| {
        cell.get()
            .expect("the cell is filled before this parser exists")
            .run(ctx)
    })
    .ignored()
}

/// Shift-reduce hook: parse `init` into an accumulator, then repeatedly
/// parse `step(accumulator)` to fold it forward. Stops on the first
/// failure of a step, yielding the last successful accumulator; the
/// only failure mode is failure of `init`.
pub fn reduce<T: Clone + 'static>(
    init: Parser<T>,
    step: impl Fn(T) -> Parser<T> + 'static,
) -> Parser<T> {
    let label = format!("reduce({}, _)", init.label());
    Parser::new(label, move |ctx| {
        let mut accumulator = init.run(ctx)?;
        loop {
            match step(accumulator.clone()).run(ctx) {
                Ok(next) => accumulator = next,
                Err(_) => break,
            }
        }
        Ok(accumulator)
    })
}

// === Regex ===

/// Match `pattern` against the input at the cursor, anchored there; on
/// success consume and yield the matched text.
///
/// Panics at construction time if `pattern` is not a valid regex.
pub fn regex(pattern: &str) -> Parser<String> {
    let re = compile(&format!(r"\A(?:{pattern})"));
    let label = format!("regex(/{pattern}/)");
    Parser::new(label, move |ctx| {
        let start = ctx.pos();
        let rest = ctx.input().remaining_string();
        match re.find(&rest) {
            Some(found) => {
                let consumed = found.as_str().chars().count();
                Ok(ctx.input().read(consumed))
            }
            None => Err(Failure { at: start }),
        }
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("invalid pattern {pattern:?}: {error}"))
}

// === Control-flow-driven parsing ===

/// Handle given to a [`coroutine`] block for driving parsers from
/// ordinary control flow.
pub struct Steps<'a> {
    ctx: &'a mut Context,
}

impl Steps<'_> {
    /// Run `parser` at the current position. Propagate failures out of
    /// the block with `?`.
    pub fn parse<T: 'static>(&mut self, parser: &Parser<T>) -> ParseResult<T> {
        parser.run(self.ctx)
    }

    /// Fail at the current position.
    pub fn fail<T>(&self) -> ParseResult<T> {
        Err(Failure { at: self.ctx.pos() })
    }

    pub fn pos(&self) -> usize {
        self.ctx.pos()
    }

    pub fn eof(&mut self) -> bool {
        self.ctx.input().eof()
    }
}

/// Direct parsing with ordinary control flow: the block invokes parsers
/// through [`Steps::parse`] as often as it likes; its final value is
/// the combinator's result, and any uncaught failure propagates out.
pub fn coroutine<T: 'static>(
    block: impl Fn(&mut Steps<'_>) -> ParseResult<T> + 'static,
) -> Parser<T> {
    Parser::new("coroutine(_)", move |ctx| block(&mut Steps { ctx }))
}
