use super::{no_match, MatchSet, Parser};
use crate::abnf::error::Error;
use crate::abnf::source::Source;
use std::cell::Cell;
use std::fmt;

/// Ordered choice.
///
/// In the default longest-match mode every alternative is tried and all their matches are
/// reported. In first-match mode the matches of the first alternative that succeeds are
/// returned and the rest are never attempted. The mode can be flipped after construction
/// through [`Rule::set_first_match_alternation`](crate::abnf::grammar::Rule::set_first_match_alternation).
#[derive(Debug)]
pub struct Alternation {
    parsers: Vec<Parser>,
    first_match: Cell<bool>,
}

impl Alternation {
    pub fn new(parsers: Vec<Parser>) -> Self {
        Alternation::with_mode(parsers, false)
    }

    pub fn with_mode(parsers: Vec<Parser>, first_match: bool) -> Self {
        Alternation {
            parsers,
            first_match: Cell::new(first_match),
        }
    }

    pub fn parsers(&self) -> &[Parser] {
        &self.parsers
    }

    pub fn is_first_match(&self) -> bool {
        self.first_match.get()
    }

    pub fn set_first_match(&self, first_match: bool) {
        self.first_match.set(first_match);
    }

    pub(crate) fn enumerate(
        &self,
        this: &Parser,
        source: &Source,
        start: usize,
    ) -> Result<MatchSet, Error> {
        let mut found = MatchSet::default();
        let mut last_failure = None;

        for parser in &self.parsers {
            match parser.enumerate(source, start) {
                Ok(matches) if self.is_first_match() => return Ok(matches),
                Ok(matches) => found.absorb(matches),
                Err(Error::Parse(failure)) => last_failure = Some(failure),
                Err(err) => return Err(err),
            }
        }

        if found.is_empty() {
            return Err(no_match(this, start, last_failure));
        }
        Ok(found)
    }
}

impl fmt::Display for Alternation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Alternation(")?;
        for (i, parser) in self.parsers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parser}")?;
        }
        f.write_str(")")
    }
}
