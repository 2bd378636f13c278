//! Grammar construction, rule semantics and text loading.

use abnf::abnf::testing::assert_tree;
use abnf::{Grammar, GrammarError, GrammarOptions, Parser, ProseMode};
use rstest::rstest;

fn exclusion_grammar() -> Grammar {
    let grammar = Grammar::new("exclusion");
    grammar
        .load_rules([
            "foo = %x66.6f.6f",
            "keyword = foo",
            "identifier = ALPHA *(ALPHA / DIGIT )",
        ])
        .unwrap();
    let identifier = grammar.rule("identifier");
    identifier.exclude_rule(&grammar.rule("keyword"));
    grammar
}

#[test]
fn exclusion_allows_longer_identifiers() {
    let grammar = exclusion_grammar();
    let identifier = grammar.rule("identifier");
    assert_eq!(identifier.parse_all("foobar").unwrap().value(), "foobar");
    assert_eq!(identifier.parse_all("foo1").unwrap().value(), "foo1");
}

#[test]
fn exclusion_vetoes_keyword() {
    let grammar = exclusion_grammar();
    let identifier = grammar.rule("identifier");

    let err = identifier.parse_all("foo").unwrap_err();
    assert!(err.is_parse_error());

    // the keyword itself is vetoed, a shorter prefix is not
    let (node, end) = identifier.parse("foo", 0).unwrap();
    assert_eq!((node.value().as_str(), end), ("fo", 2));
}

#[test]
fn exclusion_of_only_candidate_fails() {
    let grammar = Grammar::new("exclusion-only");
    let initial = grammar.create("identifier-initial = ALPHA").unwrap();
    let no_a = grammar.create("no-a-initial = \"a\"").unwrap();
    initial.exclude_rule(&no_a);

    let err = initial.parse("a", 0).unwrap_err();
    let err = err.as_parse_error().unwrap();
    assert_eq!(err.to_string(), "Rule('identifier-initial'): 0");
    assert_eq!(err.cause().unwrap().to_string(), "Rule('no-a-initial'): 0");
    assert!(initial.parse("b", 0).is_ok());

    initial.clear_exclusion();
    assert!(initial.exclusion().is_none());
    assert!(initial.parse_all("a").is_ok());
}

#[test]
fn forward_references_resolve_once_defined() {
    let grammar = Grammar::new("forward");
    let early = grammar.rule("later");
    let start = grammar.create("start = later later").unwrap();
    assert_eq!(early, grammar.rule("LATER"));
    assert!(!early.is_defined());

    grammar.create("later = \"x\"").unwrap();
    assert!(early.is_defined());
    assert_eq!(start.parse_all("xx").unwrap().value(), "xx");
}

#[test]
fn incremental_alternative_merges() {
    let grammar = Grammar::new("incremental");
    let moof = grammar.create("moof = \"a\"").unwrap();
    grammar.create("moof =/ \"b\"").unwrap();
    assert!(moof.parse_all("a").is_ok());
    assert!(moof.parse_all("b").is_ok());
    assert!(moof.parse_all("c").is_err());
}

#[test]
fn incremental_alternative_extends_core_rule_locally() {
    let grammar = Grammar::new("extended-digit");
    let digit = grammar.create("DIGIT =/ \"x\"").unwrap();
    assert_eq!(digit.grammar(), &grammar);
    assert!(digit.parse_all("5").is_ok());
    assert!(digit.parse_all("x").is_ok());
    assert!(Grammar::core().rule("DIGIT").parse_all("x").is_err());
}

#[test]
fn later_local_definition_shadows_core_rule_in_rulelist() {
    let grammar = Grammar::from_rulelist("shadow", "a = DIGIT\nDIGIT = \"x\"\n", &[]).unwrap();
    let a = grammar.rule("a");
    assert!(a.parse_all("x").is_ok());
    assert!(a.parse_all("7").is_err());
    assert_eq!(grammar.rule("DIGIT").grammar(), &grammar);
    assert!(Grammar::core().rule("DIGIT").parse_all("7").is_ok());
}

#[test]
fn later_local_definition_shadows_core_rule_in_rule_list() {
    let grammar =
        Grammar::from_rules("shadow-rules", ["a = 2ALPHA", "ALPHA = \"-\""], &[]).unwrap();
    let a = grammar.rule("a");
    assert!(a.parse_all("--").is_ok());
    assert!(a.parse_all("ab").is_err());
}

#[test]
fn undefined_rule_surfaces_grammar_error() {
    let grammar = Grammar::new("undefined");
    let uses = grammar.create("uses = \"<\" missing \">\"").unwrap();
    let err = uses.parse_all("<x>").unwrap_err();
    assert_eq!(
        err.as_grammar_error(),
        Some(&GrammarError::UndefinedRule("missing".into()))
    );
    assert_eq!(grammar.undefined_rules(), vec!["missing".to_string()]);
}

#[test]
fn first_match_alternation_toggle() {
    let grammar = Grammar::new("toggle");
    let rule = grammar.define(
        "test-first-match-alternation",
        Parser::alternation(vec![Parser::literal("a"), Parser::literal("ab")]),
    );
    assert!(!rule.first_match_alternation());
    assert_eq!(rule.parse("ab", 0).unwrap().1, 2);

    rule.set_first_match_alternation(true).unwrap();
    assert!(rule.first_match_alternation());
    let (node, end) = rule.parse("ab", 0).unwrap();
    assert_eq!((node.value().as_str(), end), ("a", 1));

    rule.set_first_match_alternation(false).unwrap();
    assert_eq!(rule.parse("ab", 0).unwrap().1, 2);
}

#[test]
fn first_match_alternation_needs_a_definition() {
    let grammar = Grammar::new("toggle-errors");
    let unbound = grammar.rule("no-grammar");
    assert!(unbound
        .set_first_match_alternation(false)
        .unwrap_err()
        .is_grammar_error());

    let literal = grammar.define("no-alternation", Parser::literal("a"));
    assert!(literal.set_first_match_alternation(true).is_ok());
}

#[test]
fn prose_val_rejected_by_default() {
    let grammar = Grammar::new("prose");
    let err = grammar.create("test-prose-val = <blah blah>").unwrap_err();
    assert!(err.is_grammar_error());
}

#[test]
fn prose_val_placeholder_never_matches() {
    let options = GrammarOptions {
        prose: ProseMode::Placeholder,
        ..GrammarOptions::default()
    };
    let grammar = Grammar::with_options("prose-placeholder", options);
    let rule = grammar.create("described = <blah blah> / \"x\"").unwrap();
    assert!(rule.parse_all("x").is_ok());
    assert!(rule.parse_all("blah blah").is_err());
}

#[test]
fn prose_val_naming_a_rule_is_a_reference() {
    let grammar = Grammar::new("prose-reference");
    let rule = grammar.create("number = <DIGIT> *DIGIT").unwrap();
    assert_eq!(rule.parse_all("42").unwrap().value(), "42");
}

#[test]
fn empty_char_val_matches_nothing() {
    let grammar = Grammar::new("empty-char-val");
    let rule = grammar.create("empty = \"\" \"a\"").unwrap();
    assert_eq!(rule.parse_all("a").unwrap().value(), "a");
}

#[test]
fn empty_char_val_fails_at_end_of_input() {
    let grammar = Grammar::new("empty-at-end");
    let rule = grammar.create("a = \"x\" \"\"").unwrap();
    assert!(rule.parse_all("x").unwrap_err().is_parse_error());
    assert_eq!(rule.parse("xy", 0).unwrap().1, 1);
}

#[test]
fn repetition_of_possibly_empty_element_terminates() {
    let grammar = Grammar::new("edge");
    let repeat_a = grammar.create("repeat-a = *\"a\"").unwrap();
    let repeat_repeat_a = grammar.create("repeat-repeat-a = *(*\"a\")").unwrap();
    assert_eq!(repeat_a.parse("", 0).unwrap().1, 0);
    assert_eq!(repeat_repeat_a.parse("", 0).unwrap().1, 0);
    assert_eq!(repeat_repeat_a.parse_all("aaa").unwrap().value(), "aaa");
}

#[test]
fn num_val_forms() {
    let grammar = Grammar::new("num-val");
    let bin = grammar.create("bin = %b01111000").unwrap();
    let dotted = grammar.create("dotted = %d104.105").unwrap();
    let range = grammar.create("range = %x30-39").unwrap();
    assert!(bin.parse_all("x").is_ok());
    assert!(bin.parse_all("X").is_err());
    assert!(dotted.parse_all("hi").is_ok());
    assert!(range.parse_all("7").is_ok());

    let err = grammar.create("bad = %x110000").unwrap_err();
    assert_eq!(
        err.as_grammar_error(),
        Some(&GrammarError::InvalidNumVal("110000".into()))
    );
}

#[rstest]
#[case("%s\"Abc\"", "Abc", true)]
#[case("%s\"Abc\"", "abc", false)]
#[case("%i\"Abc\"", "aBC", true)]
#[case("\"Abc\"", "ABC", true)]
fn char_val_case_sensitivity(#[case] element: &str, #[case] input: &str, #[case] accepted: bool) {
    let grammar = Grammar::new("char-val");
    let rule = grammar.create(&format!("word = {element}")).unwrap();
    assert_eq!(rule.parse_all(input).is_ok(), accepted);
}

#[test]
fn invalid_repeat_is_a_grammar_error() {
    let grammar = Grammar::new("bad-repeat");
    let err = grammar.create("r = 3*1\"a\"").unwrap_err();
    assert_eq!(
        err.as_grammar_error(),
        Some(&GrammarError::InvalidRepeat("3*1".into()))
    );
}

#[test]
fn malformed_rule_text_is_a_parse_error() {
    let grammar = Grammar::new("malformed");
    assert!(grammar.create("= \"a\"").unwrap_err().is_parse_error());
}

const KEY_VALUE: &str = "\
; a tiny configuration language
config   = *line
line     = pair CRLF
pair     = key *WSP \"=\" *WSP value ; key and value
key      = ALPHA *(ALPHA / DIGIT / \"-\")
value    = 1*VCHAR
";

#[test]
fn rulelist_loads_with_comments_and_lf_endings() {
    let grammar = Grammar::from_rulelist("key-value", KEY_VALUE, &[]).unwrap();
    let names: Vec<String> = grammar
        .rules()
        .iter()
        .filter(|rule| rule.is_defined())
        .map(|rule| rule.name().to_string())
        .collect();
    assert_eq!(names.len(), 5);
    assert!(grammar.undefined_rules().is_empty());

    let tree = grammar
        .rule("config")
        .parse_all("name = abnf\r\nversion=1\r\n")
        .unwrap();
    assert_tree(&tree)
        .name("config")
        .child_count(2)
        .child(0, |line| {
            line.name("line").child_named("pair", |pair| {
                pair.child_named("key", |key| {
                    key.value("name");
                })
                .child_named("value", |value| {
                    value.value("abnf");
                });
            });
        })
        .descendant_count("pair", 2);
}

#[test]
fn rule_by_rule_loading_of_rfc3339() {
    let grammar = Grammar::from_rules(
        "rfc3339",
        [
            "date-fullyear   = 4DIGIT",
            "date-month      = 2DIGIT  ; 01-12",
            "date-mday       = 2DIGIT  ; 01-28, 01-29, 01-30, 01-31 based on month/year",
            "time-hour       = 2DIGIT  ; 00-23",
            "time-minute     = 2DIGIT  ; 00-59",
            "time-second     = 2DIGIT  ; 00-58, 00-59, 00-60 based on leap second rules",
            "time-secfrac    = \".\" 1*DIGIT",
            "time-numoffset  = (\"+\" / \"-\") time-hour \":\" time-minute",
            "time-offset     = \"Z\" / time-numoffset",
            "partial-time    = time-hour \":\" time-minute \":\" time-second\n                  [time-secfrac]",
            "full-date       = date-fullyear \"-\" date-month \"-\" date-mday",
            "full-time       = partial-time time-offset",
            "date-time       = full-date \"T\" full-time",
        ],
        &[],
    )
    .unwrap();

    let date_time = grammar.rule("date-time");
    let tree = date_time.parse_all("1985-04-12T23:20:50.52Z").unwrap();
    assert_eq!(
        tree.find_all("time-secfrac").next().map(|n| n.value()),
        Some(".52".to_string())
    );
    assert!(date_time.parse_all("1996-12-19T16:39:57-08:00").is_ok());
    assert!(date_time.parse_all("1996-12-19 16:39:57Z").is_err());
}

#[test]
fn imports_bind_foreign_rules() {
    let words = Grammar::from_rulelist(
        "words",
        "word = letter *letter\nletter = ALPHA\n",
        &[],
    )
    .unwrap();
    let word = words.rule("word");
    let greetings = Grammar::from_rules(
        "greetings",
        ["greeting = \"hi\" SP name"],
        &[("name", &word)],
    )
    .unwrap();
    drop(word);
    drop(words);

    let tree = greetings.rule("greeting").parse_all("hi bob").unwrap();
    assert_eq!(tree.child("name").map(|n| n.value()), Some("bob".to_string()));
}

#[test]
fn importing_an_unbound_rule_fails() {
    let source = Grammar::new("source");
    let target = Grammar::new("target");
    let err = target.import("name", &source.rule("nothing")).unwrap_err();
    assert!(err.is_grammar_error());
}

#[test]
fn grammar_caches_are_registered_and_cleared() {
    let grammar = Grammar::new("caches");
    let digits = grammar.create("digits = 1*DIGIT").unwrap();
    assert_eq!(grammar.caches().len(), 1);

    digits.parse_all("123").unwrap();
    digits.parse_all("123").unwrap();
    let stats = grammar.cache_stats();
    assert_eq!(stats.entries, 1);
    assert_eq!((stats.hits, stats.misses), (1, 1));

    grammar.create("digits = 1*HEXDIG").unwrap();
    assert!(digits.parse_all("ff").is_ok());

    grammar.clear_caches();
    assert_eq!(grammar.cache_stats().entries, 0);
}

const RFC5234: &str = r#"rulelist       =  1*( rule / (*c-wsp c-nl) )
rule           =  rulename defined-as elements c-nl
                       ; continues if next line starts
                       ;  with white space
rulename       =  ALPHA *(ALPHA / DIGIT / "-")
defined-as     =  *c-wsp ("=" / "=/") *c-wsp
                       ; basic rules definition and
                       ;  incremental alternatives
elements       =  alternation *c-wsp
c-wsp          =  WSP / (c-nl WSP)
c-nl           =  comment / CRLF
                       ; comment or newline
comment        =  ";" *(WSP / VCHAR) CRLF
alternation    =  concatenation
                  *(*c-wsp "/" *c-wsp concatenation)
concatenation  =  repetition *(1*c-wsp repetition)
repetition     =  [repeat] element
repeat         =  1*DIGIT / (*DIGIT "*" *DIGIT)
element        =  rulename / group / option /
                  char-val / num-val / prose-val
group          =  "(" *c-wsp alternation *c-wsp ")"
option         =  "[" *c-wsp alternation *c-wsp "]"
char-val       =  DQUOTE *(%x20-21 / %x23-7E) DQUOTE
                       ; quoted string of SP and VCHAR
                       ;  without DQUOTE
num-val        =  "%" (bin-val / dec-val / hex-val)
bin-val        =  "b" 1*BIT
                  [ 1*("." 1*BIT) / ("-" 1*BIT) ]
dec-val        =  "d" 1*DIGIT
                  [ 1*("." 1*DIGIT) / ("-" 1*DIGIT) ]
hex-val        =  "x" 1*HEXDIG
                  [ 1*("." 1*HEXDIG) / ("-" 1*HEXDIG) ]
prose-val      =  "<" *(%x20-3D / %x3F-7E) ">"
"#;

#[test]
fn abnf_grammar_compiles_from_its_own_text() {
    let meta = Grammar::from_rulelist("rfc5234", RFC5234, &[]).unwrap();
    assert_eq!(meta.rules().len(), 21);
    assert!(meta.undefined_rules().is_empty());

    let tree = meta
        .rule("rulelist")
        .parse_all("greeting = \"hi\" / %x41-5A ; comment\r\nname = 1*ALPHA\r\n")
        .unwrap();
    let names: Vec<String> = tree.find_all("rulename").map(|n| n.value()).collect();
    assert_eq!(names[0], "greeting");
    assert_eq!(tree.children_named("rule").count(), 2);
}
