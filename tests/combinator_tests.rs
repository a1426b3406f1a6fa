use kombi::input::Input;
use kombi::{
    any_char, between, char_in, char_matching, choice, decimal, decimal_fraction, eof, group,
    hex_digit, literal, literal_ci, many, many_1, optional, peek, pure, regex, sep_by, sep_by_1,
    single, spaced, unparseable, whitespace, whitespace_1, Context, HexCase, ParseResult, Parser,
};

/// Run a parser against a string, returning the result together with
/// the cursor position after the call.
fn run_on<T: 'static>(parser: &Parser<T>, input: &str) -> (ParseResult<T>, usize) {
    let mut ctx = Context::new(Input::from_str(input));
    let result = parser.run(&mut ctx);
    (result, ctx.pos())
}

#[test]
fn literal_matches_itself() {
    assert_eq!(literal("foo").parse("foo").unwrap(), "foo");
}

#[test]
fn literal_rejects_other_text() {
    let (result, pos) = run_on(&literal("foo"), "bar");
    assert!(result.is_err());
    assert_eq!(pos, 0);
}

#[test]
fn literal_ci_ignores_case_but_keeps_it() {
    assert_eq!(literal_ci("foo").parse("FoO").unwrap(), "FoO");
    assert!(literal_ci("foo").parse("fOx").is_err());
}

#[test]
fn char_matching_tests_one_character() {
    assert_eq!(char_matching("[a-z]").parse("a").unwrap(), 'a');
    assert!(char_matching("[a-z]").parse("1").is_err());
    assert!(char_matching("[a-z]").parse("").is_err());
}

#[test]
fn char_in_tests_membership() {
    assert_eq!(char_in("abc").parse("b").unwrap(), 'b');
    assert!(char_in("abc").parse("z").is_err());
}

#[test]
fn any_char_fails_only_at_eof() {
    assert_eq!(any_char().parse("x").unwrap(), 'x');
    assert!(any_char().parse("").is_err());
}

#[test]
fn eof_requires_the_end() {
    assert!(eof().parse("").is_ok());
    assert!(eof().parse("x").is_err());
}

#[test]
fn pure_consumes_nothing() {
    let (result, pos) = run_on(&pure(7), "abc");
    assert_eq!(result.unwrap(), 7);
    assert_eq!(pos, 0);
}

#[test]
fn unparseable_always_fails() {
    assert!(unparseable::<()>().parse("").is_err());
    assert!(unparseable::<()>().parse("anything").is_err());
}

#[test]
fn optional_wraps_success_and_absorbs_clean_failure() {
    assert_eq!(optional(literal("a")).parse("a").unwrap(), Some("a".to_string()));
    let (result, pos) = run_on(&optional(literal("a")), "b");
    assert_eq!(result.unwrap(), None);
    assert_eq!(pos, 0);
}

#[test]
fn optional_propagates_committed_failure() {
    let partial = literal("a") >> literal("b");
    assert!(optional(partial).parse("ax").is_err());
}

#[test]
fn many_collects_until_failure() {
    assert_eq!(
        many(literal("foo")).parse("foofoofoo").unwrap(),
        vec!["foo", "foo", "foo"]
    );
    let (result, pos) = run_on(&many(literal("foo")), "bar");
    assert_eq!(result.unwrap(), Vec::<String>::new());
    assert_eq!(pos, 0);
}

#[test]
fn many_stops_after_the_last_full_match() {
    let (result, pos) = run_on(&many(literal("foo")), "foofoox");
    assert_eq!(result.unwrap(), vec!["foo", "foo"]);
    assert_eq!(pos, 6);
}

#[test]
fn many_1_requires_one_iteration() {
    assert_eq!(many_1(literal("foo")).parse("foo").unwrap(), vec!["foo"]);
    assert!(many_1(literal("foo")).parse("bar").is_err());
}

#[test]
fn sep_by_interleaves_separators() {
    let numbers = sep_by(literal(","), decimal());
    assert_eq!(numbers.parse("1,2,3").unwrap(), vec![1, 2, 3]);
    assert_eq!(numbers.parse("4").unwrap(), vec![4]);
    assert_eq!(numbers.parse("").unwrap(), Vec::<i64>::new());
}

#[test]
fn sep_by_leaves_a_trailing_separator() {
    let (result, pos) = run_on(&sep_by(literal(","), decimal()), "1,2,");
    assert_eq!(result.unwrap(), vec![1, 2]);
    assert_eq!(pos, 3);
}

#[test]
fn sep_by_1_requires_one_item() {
    assert_eq!(sep_by_1(literal(","), decimal()).parse("5,6").unwrap(), vec![5, 6]);
    assert!(sep_by_1(literal(","), decimal()).parse("").is_err());
}

#[test]
fn group_runs_in_order() {
    let pair = group(vec![literal("a"), literal("b")]);
    assert_eq!(pair.parse("ab").unwrap(), vec!["a", "b"]);
    assert!(pair.parse("ba").is_err());
}

#[test]
fn single_and_concatenation_build_sequences() {
    let both = single(literal("a")) + single(literal("b"));
    assert_eq!(both.parse("ab").unwrap(), vec!["a", "b"]);
}

#[test]
fn repetition_by_count_is_exact() {
    let three = any_char() * 3;
    assert_eq!(three.parse("abcd").unwrap(), vec!['a', 'b', 'c']);
    assert!(three.parse("ab").is_err());
}

#[test]
fn between_yields_the_inner_result() {
    let bracketed = between(literal("["), literal("]"), decimal());
    assert_eq!(bracketed.parse("[42]").unwrap(), 42);
    assert!(bracketed.parse("[42").is_err());
}

#[test]
fn spaced_absorbs_surrounding_whitespace() {
    let (result, pos) = run_on(&spaced(literal("x")), "  x \t");
    assert_eq!(result.unwrap(), "x");
    assert_eq!(pos, 5);
}

#[test]
fn whitespace_is_optional_whitespace_1_is_not() {
    let (result, pos) = run_on(&whitespace(), " \t\r\nx");
    assert_eq!(result.unwrap(), " \t\r\n");
    assert_eq!(pos, 4);
    assert_eq!(whitespace().parse("x").unwrap(), "");
    assert!(whitespace_1().parse("x").is_err());
}

#[test]
fn hex_digit_honours_its_case_policy() {
    assert_eq!(hex_digit(HexCase::Insensitive).parse("A").unwrap(), 'A');
    assert_eq!(hex_digit(HexCase::Insensitive).parse("a").unwrap(), 'a');
    assert_eq!(hex_digit(HexCase::Upper).parse("F").unwrap(), 'F');
    assert!(hex_digit(HexCase::Upper).parse("f").is_err());
    assert_eq!(hex_digit(HexCase::Lower).parse("f").unwrap(), 'f');
    assert!(hex_digit(HexCase::Lower).parse("F").is_err());
}

#[test]
fn decimal_reads_digits_only() {
    let (result, pos) = run_on(&decimal(), "123.45");
    assert_eq!(result.unwrap(), 123);
    assert_eq!(pos, 3);
}

#[test]
fn decimal_has_no_sign() {
    assert!(decimal().parse("-123").is_err());
}

#[test]
fn decimal_fails_on_overflow() {
    assert!(decimal().parse("99999999999999999999").is_err());
}

#[test]
fn decimal_fraction_grammar() {
    assert!((decimal_fraction().parse("123.45").unwrap() - 123.45).abs() < 1e-9);
    assert!((decimal_fraction().parse("-1.25e-1").unwrap() - -0.125).abs() < 1e-12);
    assert!((decimal_fraction().parse("+2e3").unwrap() - 2000.0).abs() < 1e-9);
    assert!((decimal_fraction().parse("7").unwrap() - 7.0).abs() < 1e-12);
    assert!(decimal_fraction().parse("x").is_err());
}

#[test]
fn choice_takes_the_first_match() {
    let keyword = choice(vec![literal("foo"), literal("bar")]);
    assert_eq!(keyword.parse("bar").unwrap(), "bar");
    assert_eq!(keyword.parse("foo").unwrap(), "foo");
    assert!(keyword.parse("qux").is_err());
}

#[test]
fn empty_choice_is_unparseable() {
    assert!(choice(Vec::<Parser<char>>::new()).parse("x").is_err());
}

#[test]
fn peek_reports_without_consuming() {
    let (result, pos) = run_on(&peek(literal("foo")), "foo");
    assert_eq!(result.unwrap(), "foo");
    assert_eq!(pos, 0);

    let (result, pos) = run_on(&peek(literal("foo")), "bar");
    assert!(result.is_err());
    assert_eq!(pos, 0);
}

#[test]
fn failing_is_negative_lookahead() {
    let not_keyword = any_char().failing(literal("k"));
    assert_eq!(not_keyword.parse("x").unwrap(), 'x');
    let (result, pos) = run_on(&not_keyword, "k");
    assert!(result.is_err());
    assert_eq!(pos, 0);
}

#[test]
fn regex_matches_at_the_cursor() {
    let (result, pos) = run_on(&regex("[0-9]+"), "123abc");
    assert_eq!(result.unwrap(), "123");
    assert_eq!(pos, 3);
    assert!(regex("[0-9]+").parse("abc").is_err());
}

#[test]
fn regex_is_anchored_where_parsing_stands() {
    let tail = literal("ab") >> regex("c+");
    assert_eq!(tail.parse("abccc").unwrap(), "ccc");
    assert!((literal("ab") >> regex("c+")).parse("abxc").is_err());
}

#[test]
fn sequencing_keeps_the_named_side() {
    assert_eq!((literal("a") >> literal("b")).parse("ab").unwrap(), "b");
    assert_eq!((literal("a") << literal("b")).parse("ab").unwrap(), "a");
}

#[test]
fn fmap_transforms_success_only() {
    let doubled = decimal().fmap(|n| n * 2);
    assert_eq!(doubled.parse("21").unwrap(), 42);
    assert!(doubled.parse("x").is_err());
}

#[test]
fn bind_chooses_the_next_parser_from_the_result() {
    let sized = decimal().bind(|n| any_char() * (n as usize));
    assert_eq!(sized.parse("3abcd").unwrap(), vec!['a', 'b', 'c']);
    assert!(sized.parse("3ab").is_err());
}

#[test]
fn seq_pairs_results() {
    let pair = literal("a").seq(decimal());
    assert_eq!(pair.parse("a7").unwrap(), ("a".to_string(), 7));
}
