//! Combinator behavior through the public parser API.

use abnf::abnf::parsing::{Alternation, Literal, Repetition};
use abnf::{Match, Node, Parser, Repeat, Source};
use std::rc::Rc;

fn values(parser: &Parser, text: &str, start: usize) -> Vec<(String, usize)> {
    parser
        .lparse(&Source::from(text), start)
        .expect("parser to match")
        .map(|m| (m.value(), m.end))
        .collect()
}

#[test]
fn backtracking_finds_full_match() {
    let src = "aababb";
    let parser = Parser::concatenation(vec![
        Parser::repetition(
            Repeat::default(),
            Parser::alternation(vec![Parser::literal("a"), Parser::literal("b")]),
        ),
        Parser::literal("b"),
    ]);
    let longest = parser.lparse(&Source::from(src), 0).unwrap().next().unwrap();
    assert_eq!(longest.value(), src);
    assert_eq!(longest.end, 6);
}

#[test]
fn longest_match_alternation() {
    let parser = Parser::alternation(vec![Parser::literal("a"), Parser::literal("ab")]);
    assert_eq!(values(&parser, "ab", 0)[0], ("ab".to_string(), 2));
}

#[test]
fn first_match_alternation() {
    let parser = Parser::first_match(vec![Parser::literal("a"), Parser::literal("ab")]);
    assert_eq!(values(&parser, "ab", 0), vec![("a".to_string(), 1)]);
}

#[test]
fn alternation_failure_is_a_parse_error() {
    let parser = Parser::from(Alternation::new(vec![
        Parser::literal("a"),
        Parser::literal("b"),
    ]));
    let err = parser.lparse(&Source::from("c"), 0).unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.as_parse_error().unwrap().chain().count(), 2);
}

#[test]
fn literal_match_records_leaf() {
    let parser = Parser::literal("a");
    let matches: Vec<Match> = parser.lparse(&Source::from("a"), 0).unwrap().collect();
    assert_eq!(matches, vec![Match::new(vec![Node::literal("a", 0)], 1)]);
}

#[test]
fn repetition_zero_zero_matches_empty_only() {
    let parser = Parser::repetition(Repeat::new(0, Some(0)), Parser::literal("*"));
    let matches: Vec<Match> = parser.lparse(&Source::from("***"), 0).unwrap().collect();
    assert_eq!(matches, vec![Match::empty(0)]);
}

#[test]
fn repetition_zero_one_is_longest_first() {
    let parser = Parser::repetition(Repeat::new(0, Some(1)), Parser::literal("*"));
    let matches: Vec<Match> = parser.lparse(&Source::from("***"), 0).unwrap().collect();
    assert_eq!(
        matches,
        vec![Match::new(vec![Node::literal("*", 0)], 1), Match::empty(0)]
    );
}

#[test]
fn minimum_not_met_fails_and_failure_is_reused() {
    let repetition = Repetition::new(Repeat::exactly(1), Literal::new("*"));
    let cache = Rc::clone(repetition.cache());
    let parser = Parser::from(repetition);
    let source = Source::from("a");

    let first = parser.lparse(&source, 0).unwrap_err();
    let second = parser.lparse(&source, 0).unwrap_err();
    assert!(first.is_parse_error() && second.is_parse_error());
    assert_eq!(first.to_string(), second.to_string());

    let cache = cache.borrow();
    assert_eq!((cache.hits(), cache.misses()), (1, 1));
}

#[test]
fn cache_is_keyed_by_text_not_buffer() {
    let repetition = Repetition::new(Repeat::new(1, None), Literal::new("x"));
    let cache = Rc::clone(repetition.cache());
    let parser = Parser::from(repetition);

    parser.lparse(&Source::from("xx"), 0).unwrap();
    parser.lparse(&Source::from(String::from("xx")), 0).unwrap();
    assert_eq!(cache.borrow().hits(), 1);
}

#[test]
fn option_matches_zero_or_one() {
    let parser = Parser::option(Parser::literal("-"));
    assert_eq!(
        values(&parser, "-1", 0),
        vec![("-".to_string(), 1), (String::new(), 0)]
    );
    assert_eq!(values(&parser, "1", 0), vec![(String::new(), 0)]);
}

#[test]
fn case_sensitivity_of_literals() {
    assert!(Parser::literal("abc").lparse(&Source::from("ABC"), 0).is_ok());
    assert!(Parser::case_sensitive("abc")
        .lparse(&Source::from("ABC"), 0)
        .is_err());
}

#[test]
fn multibyte_offsets_are_bytes() {
    let parser = Parser::concatenation(vec![
        Parser::range('\u{e0}', '\u{ff}'),
        Parser::literal("b"),
    ]);
    assert_eq!(values(&parser, "éb", 0), vec![("éb".to_string(), 3)]);
}

#[test]
fn display_forms() {
    assert_eq!(
        Parser::repetition(Repeat::new(1, Some(2)), Parser::literal("foo")).to_string(),
        "Repetition(Repeat(1, 2), Literal('foo'))"
    );
    assert_eq!(
        Parser::concatenation(vec![Parser::literal("a")]).to_string(),
        "Concatenation(Literal('a'))"
    );
    assert_eq!(Parser::prose("free text").to_string(), "Prose(<free text>)");
}
