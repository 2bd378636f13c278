use super::{no_match, MatchSet, Parser};
use crate::abnf::cache::{CacheKey, ParseCache, SharedCache, DEFAULT_CACHE_SIZE};
use crate::abnf::error::Error;
use crate::abnf::source::Source;
use crate::abnf::tree::Match;
use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;
use tracing::trace;

/// Repetition bounds: at least `min`, at most `max` (unbounded when `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Repeat {
    pub min: usize,
    pub max: Option<usize>,
}

impl Repeat {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Repeat { min, max }
    }

    pub fn exactly(count: usize) -> Self {
        Repeat::new(count, Some(count))
    }

    fn allows_more_than(&self, count: usize) -> bool {
        self.max.map_or(true, |max| count < max)
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "Repeat({}, {})", self.min, max),
            None => write!(f, "Repeat({}, None)", self.min),
        }
    }
}

/// `element` repeated within `repeat` bounds.
///
/// All match counts are explored breadth first and the whole result set is memoized per
/// `(source, start)` in the node's own cache, failures included. Exploration stops at `max`
/// or as soon as a round reaches no new end offset, so an unbounded repetition of something
/// that can match the empty string still terminates.
pub struct Repetition {
    repeat: Repeat,
    element: Parser,
    cache: SharedCache,
}

impl Repetition {
    pub fn new(repeat: Repeat, element: impl Into<Parser>) -> Self {
        Repetition::with_cache_size(repeat, element, DEFAULT_CACHE_SIZE)
    }

    pub fn with_cache_size(
        repeat: Repeat,
        element: impl Into<Parser>,
        cache_size: NonZeroUsize,
    ) -> Self {
        Repetition {
            repeat,
            element: element.into(),
            cache: Rc::new(RefCell::new(ParseCache::new(cache_size))),
        }
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn element(&self) -> &Parser {
        &self.element
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub(crate) fn enumerate(
        &self,
        this: &Parser,
        source: &Source,
        start: usize,
    ) -> Result<MatchSet, Error> {
        let key = CacheKey::new(source.clone(), start);
        let cached = self.cache.borrow_mut().get(&key).cloned();
        if let Some(entry) = cached {
            return match entry {
                Ok(matches) => Ok(matches.iter().cloned().collect()),
                Err(err) => Err(err.into()),
            };
        }

        let result = self.explore(this, source, start);
        match &result {
            Ok(matches) => {
                let stored: Vec<Match> = matches.iter().cloned().collect();
                self.cache.borrow_mut().insert(key, Ok(stored.into()));
            }
            Err(Error::Parse(err)) => {
                self.cache.borrow_mut().insert(key, Err(err.clone()));
            }
            Err(Error::Grammar(_)) => {}
        }
        result
    }

    fn explore(&self, this: &Parser, source: &Source, start: usize) -> Result<MatchSet, Error> {
        let mut known = MatchSet::single(Match::empty(start));

        for _ in 0..self.repeat.min {
            let mut next = MatchSet::default();
            let mut last_failure = None;
            for head in known.iter() {
                match self.element.enumerate(source, head.end) {
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
            known = next;
        }

        let mut frontier = known.clone();
        let mut count = self.repeat.min;
        while self.repeat.allows_more_than(count) {
            let mut added = MatchSet::default();
            for head in frontier.iter() {
                match self.element.enumerate(source, head.end) {
                    Ok(tails) => {
                        for tail in tails.iter() {
                            if !known.contains_end(tail.end) && !added.contains_end(tail.end) {
                                added.insert(head.followed_by(tail));
                            }
                        }
                    }
                    Err(Error::Parse(_)) => {}
                    Err(err) => return Err(err),
                }
            }
            if added.is_empty() {
                break;
            }
            for m in added.iter() {
                known.insert(m.clone());
            }
            frontier = added;
            count += 1;
        }

        trace!(parser = %this, start, matches = known.len(), "repetition explored");
        Ok(known)
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Repetition({}, {})", self.repeat, self.element)
    }
}

impl fmt::Debug for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repetition")
            .field("repeat", &self.repeat)
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

/// `[element]`: zero or one occurrence.
pub struct Optional {
    inner: Repetition,
}

impl Optional {
    pub fn new(element: impl Into<Parser>) -> Self {
        Optional::with_cache_size(element, DEFAULT_CACHE_SIZE)
    }

    pub fn with_cache_size(element: impl Into<Parser>, cache_size: NonZeroUsize) -> Self {
        Optional {
            inner: Repetition::with_cache_size(Repeat::new(0, Some(1)), element, cache_size),
        }
    }

    pub fn element(&self) -> &Parser {
        self.inner.element()
    }

    pub fn cache(&self) -> &SharedCache {
        self.inner.cache()
    }

    pub(crate) fn enumerate(
        &self,
        this: &Parser,
        source: &Source,
        start: usize,
    ) -> Result<MatchSet, Error> {
        self.inner.enumerate(this, source, start)
    }
}

impl fmt::Display for Optional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Option({})", self.inner.element)
    }
}

impl fmt::Debug for Optional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Optional").field(self.element()).finish()
    }
}
