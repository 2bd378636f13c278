//! Shared parse input
//!
//! Every combinator works on the same input text, re-sliced by byte offset. `Source` wraps
//! that text in a reference-counted buffer and hashes it once, so it can be cloned into
//! repetition cache keys without copying or re-hashing the whole input on every lookup.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

/// Input text shared by all combinators taking part in one parse.
#[derive(Clone)]
pub struct Source {
    text: Rc<str>,
    hash: u64,
}

impl Source {
    pub fn new(text: impl Into<Rc<str>>) -> Self {
        let text = text.into();
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        Source {
            hash: hasher.finish(),
            text,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The text between two byte offsets, or `None` if either is out of bounds or not on a
    /// character boundary.
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        self.text.get(start..end)
    }

    /// The text from `start` to the end of the input.
    pub fn rest(&self, start: usize) -> Option<&str> {
        self.text.get(start..)
    }
}

impl Deref for Source {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.text, &other.text) || (self.hash == other.hash && self.text == other.text)
    }
}

impl Eq for Source {}

impl Hash for Source {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Source").field(&&*self.text).finish()
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::new(text)
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equal_text_is_equal_source() {
        let a = Source::from("rulelist");
        let b = Source::from(String::from("rulelist"));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn slicing_respects_char_boundaries() {
        let source = Source::from("añb");
        assert_eq!(source.slice(0, 1), Some("a"));
        assert_eq!(source.slice(1, 2), None);
        assert_eq!(source.rest(3), Some("b"));
        assert_eq!(source.rest(9), None);
    }
}
