//! Parsing combinators
//!
//! Every combinator answers one question: "in how many ways can I match `source` starting at
//! `start`?". The answer is the full set of reachable matches, not a single one. ABNF
//! alternation is ambiguity tolerant, so a sequence or repetition can only find the globally
//! longest parse if each of its parts reports every way it can end.
//!
//! Match sets are deduplicated by end offset. All matches in one set share the same start,
//! so two matches with the same end consumed the same text. Only the first one found is
//! kept, which makes results deterministic: among equally long parses, the one reached
//! through the earliest declared alternative wins.
//!
//! The combinators are:
//!
//! - [`Literal`]: an exact string or an inclusive code point range
//! - [`Alternation`]: ordered choice, in longest-match or first-match mode
//! - [`Concatenation`]: sequencing, expanding every candidate
//! - [`Repetition`] and [`Optional`]: bounded repetition with a per-node match cache
//! - [`Rule`](crate::abnf::grammar::Rule): a named production
//! - [`Prose`]: free text that never matches

mod alternation;
mod concatenation;
mod literal;
mod prose;
mod repetition;

pub use alternation::Alternation;
pub use concatenation::Concatenation;
pub use literal::{Literal, LiteralValue};
pub use prose::Prose;
pub use repetition::{Optional, Repeat, Repetition};

use crate::abnf::cache::SharedCache;
use crate::abnf::error::{Error, ParseError};
use crate::abnf::grammar::{Rule, RuleRef};
use crate::abnf::source::Source;
use crate::abnf::tree::Match;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::rc::Rc;

/// Anything that can enumerate its matches. Cloning a parser is cheap: every variant is a
/// shared handle, so the same combinator can appear in several places of a grammar.
#[derive(Clone)]
pub enum Parser {
    Literal(Rc<Literal>),
    Alternation(Rc<Alternation>),
    Concatenation(Rc<Concatenation>),
    Optional(Rc<Optional>),
    Repetition(Rc<Repetition>),
    Rule(RuleRef),
    Prose(Rc<Prose>),
}

impl Parser {
    /// All matches of this parser at `start`, longest first.
    pub fn lparse(&self, source: &Source, start: usize) -> Result<Matches, Error> {
        self.enumerate(source, start).map(Matches::from)
    }

    pub(crate) fn enumerate(&self, source: &Source, start: usize) -> Result<MatchSet, Error> {
        match self {
            Parser::Literal(literal) => literal
                .matched(source, start)
                .map(MatchSet::single)
                .ok_or_else(|| ParseError::new(self.clone(), start).into()),
            Parser::Alternation(alternation) => alternation.enumerate(self, source, start),
            Parser::Concatenation(concatenation) => concatenation.enumerate(self, source, start),
            Parser::Optional(optional) => optional.enumerate(self, source, start),
            Parser::Repetition(repetition) => repetition.enumerate(self, source, start),
            Parser::Rule(rule) => rule.upgrade()?.enumerate(source, start),
            Parser::Prose(_) => Err(ParseError::new(self.clone(), start).into()),
        }
    }

    /// Visit this parser and every combinator nested in it. Rule references are reported
    /// but not followed, so the walk stays finite on recursive grammars.
    pub fn walk(&self, visit: &mut dyn FnMut(&Parser)) {
        visit(self);
        match self {
            Parser::Alternation(alternation) => {
                alternation.parsers().iter().for_each(|p| p.walk(visit))
            }
            Parser::Concatenation(concatenation) => {
                concatenation.parsers().iter().for_each(|p| p.walk(visit))
            }
            Parser::Optional(optional) => optional.element().walk(visit),
            Parser::Repetition(repetition) => repetition.element().walk(visit),
            Parser::Literal(_) | Parser::Rule(_) | Parser::Prose(_) => {}
        }
    }

    /// The match cache owned by this node, for repetitions and options.
    pub fn cache(&self) -> Option<&SharedCache> {
        match self {
            Parser::Repetition(repetition) => Some(repetition.cache()),
            Parser::Optional(optional) => Some(optional.cache()),
            _ => None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Parser {
        Literal::new(value).into()
    }

    pub fn case_sensitive(value: impl Into<String>) -> Parser {
        Literal::case_sensitive(value).into()
    }

    pub fn range(first: char, last: char) -> Parser {
        Literal::range(first, last).into()
    }

    pub fn alternation(parsers: Vec<Parser>) -> Parser {
        Alternation::new(parsers).into()
    }

    pub fn first_match(parsers: Vec<Parser>) -> Parser {
        Alternation::with_mode(parsers, true).into()
    }

    pub fn concatenation(parsers: Vec<Parser>) -> Parser {
        Concatenation::new(parsers).into()
    }

    pub fn repetition(repeat: Repeat, element: impl Into<Parser>) -> Parser {
        Repetition::new(repeat, element).into()
    }

    pub fn option(element: impl Into<Parser>) -> Parser {
        Optional::new(element).into()
    }

    pub fn prose(text: impl Into<String>) -> Parser {
        Prose::new(text).into()
    }
}

impl fmt::Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parser::Literal(literal) => write!(f, "{literal}"),
            Parser::Alternation(alternation) => write!(f, "{alternation}"),
            Parser::Concatenation(concatenation) => write!(f, "{concatenation}"),
            Parser::Optional(optional) => write!(f, "{optional}"),
            Parser::Repetition(repetition) => write!(f, "{repetition}"),
            Parser::Rule(rule) => write!(f, "Rule('{}')", rule.name()),
            Parser::Prose(prose) => write!(f, "{prose}"),
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

macro_rules! parser_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Parser {
                fn from(value: $ty) -> Self {
                    Parser::$variant(Rc::new(value))
                }
            }

            impl From<Rc<$ty>> for Parser {
                fn from(value: Rc<$ty>) -> Self {
                    Parser::$variant(value)
                }
            }
        )*
    };
}

parser_from! {
    Literal => Literal,
    Alternation => Alternation,
    Concatenation => Concatenation,
    Optional => Optional,
    Repetition => Repetition,
    Prose => Prose,
}

impl From<RuleRef> for Parser {
    fn from(rule: RuleRef) -> Self {
        Parser::Rule(rule)
    }
}

impl From<&Rule> for Parser {
    fn from(rule: &Rule) -> Self {
        Parser::Rule(rule.downgrade())
    }
}

impl From<Rule> for Parser {
    fn from(rule: Rule) -> Self {
        Parser::from(&rule)
    }
}

/// Matches keyed by end offset; the first match inserted for an offset wins.
#[derive(Debug, Clone, Default)]
pub(crate) struct MatchSet {
    by_end: BTreeMap<usize, Match>,
}

impl MatchSet {
    pub(crate) fn single(m: Match) -> Self {
        let mut set = MatchSet::default();
        set.insert(m);
        set
    }

    /// Returns false if a match with the same end was already known.
    pub(crate) fn insert(&mut self, m: Match) -> bool {
        match self.by_end.entry(m.end) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(m);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub(crate) fn contains_end(&self, end: usize) -> bool {
        self.by_end.contains_key(&end)
    }

    pub(crate) fn absorb(&mut self, other: MatchSet) {
        for m in other.into_longest_first() {
            self.insert(m);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_end.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_end.len()
    }

    /// Longest first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Match> {
        self.by_end.values().rev()
    }

    pub(crate) fn into_longest_first(self) -> Vec<Match> {
        self.by_end.into_values().rev().collect()
    }

    pub(crate) fn into_longest(self) -> Option<Match> {
        self.by_end.into_values().next_back()
    }
}

impl FromIterator<Match> for MatchSet {
    fn from_iter<I: IntoIterator<Item = Match>>(iter: I) -> Self {
        let mut set = MatchSet::default();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

/// A computed, single-pass sequence of matches, longest first. Request the matches again to
/// iterate a second time.
#[derive(Debug)]
pub struct Matches {
    inner: std::vec::IntoIter<Match>,
}

impl Iterator for Matches {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Matches {}

impl From<MatchSet> for Matches {
    fn from(set: MatchSet) -> Self {
        Matches {
            inner: set.into_longest_first().into_iter(),
        }
    }
}

/// The failure a combinator reports when none of its paths matched.
pub(crate) fn no_match(this: &Parser, start: usize, cause: Option<ParseError>) -> Error {
    let err = ParseError::new(this.clone(), start);
    match cause {
        Some(cause) => err.caused_by(cause).into(),
        None => err.into(),
    }
}
