use super::{no_match, MatchSet, Parser};
use crate::abnf::error::Error;
use crate::abnf::source::Source;
use crate::abnf::tree::Match;
use std::fmt;

/// Sequencing. Each step is tried after every way the previous steps could end, so a
/// short match early on can still lead to a complete parse when a longer one dead-ends.
#[derive(Debug)]
pub struct Concatenation {
    parsers: Vec<Parser>,
}

impl Concatenation {
    pub fn new(parsers: Vec<Parser>) -> Self {
        Concatenation { parsers }
    }

    pub fn parsers(&self) -> &[Parser] {
        &self.parsers
    }

    pub(crate) fn enumerate(
        &self,
        this: &Parser,
        source: &Source,
        start: usize,
    ) -> Result<MatchSet, Error> {
        let mut frontier = MatchSet::single(Match::empty(start));

        for parser in &self.parsers {
            let mut next = MatchSet::default();
            let mut last_failure = None;

            for head in frontier.iter() {
                match parser.enumerate(source, head.end) {
                    Ok(tails) => {
                        for tail in tails.iter() {
                            if !next.contains_end(tail.end) {
                                next.insert(head.followed_by(tail));
                            }
                        }
                    }
                    Err(Error::Parse(failure)) => last_failure = Some(failure),
                    Err(err) => return Err(err),
                }
            }

            if next.is_empty() {
                return Err(no_match(this, start, last_failure));
            }
            frontier = next;
        }

        Ok(frontier)
    }
}

impl fmt::Display for Concatenation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Concatenation(")?;
        for (i, parser) in self.parsers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parser}")?;
        }
        f.write_str(")")
    }
}
