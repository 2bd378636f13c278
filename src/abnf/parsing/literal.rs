use crate::abnf::source::Source;
use crate::abnf::tree::{Match, Node};
use std::fmt;
use std::ops::RangeInclusive;

/// What a literal compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Text(String),
    /// Inclusive code point range matching exactly one character.
    Range(char, char),
}

/// Terminal matcher.
///
/// Text literals are case-insensitive unless built with [`Literal::case_sensitive`], the
/// way ABNF `"quoted"` strings are. Ranges come from `%x41-5A` style values and always
/// compare code points exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    value: LiteralValue,
    case_sensitive: bool,
}

impl Literal {
    pub fn new(value: impl Into<String>) -> Self {
        Literal::with_case(value, false)
    }

    pub fn case_sensitive(value: impl Into<String>) -> Self {
        Literal::with_case(value, true)
    }

    pub fn with_case(value: impl Into<String>, case_sensitive: bool) -> Self {
        Literal {
            value: LiteralValue::Text(value.into()),
            case_sensitive,
        }
    }

    pub fn range(first: char, last: char) -> Self {
        Literal {
            value: LiteralValue::Range(first, last),
            case_sensitive: true,
        }
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The single match at `start`, if any. The leaf carries the source text, not the
    /// pattern, so case-insensitive matches keep the input's spelling.
    pub(crate) fn matched(&self, source: &Source, start: usize) -> Option<Match> {
        let end = match &self.value {
            LiteralValue::Text(text) => self.text_end(text, source, start)?,
            LiteralValue::Range(first, last) => range_end(*first..=*last, source, start)?,
        };
        let text = source.slice(start, end)?;
        Some(Match::new(vec![Node::literal(text, start)], end))
    }

    /// Text literals, the empty one included, never match at the end of the input.
    fn text_end(&self, text: &str, source: &Source, start: usize) -> Option<usize> {
        if start >= source.as_str().len() {
            return None;
        }
        let rest = source.rest(start)?;
        if self.case_sensitive {
            return rest.starts_with(text).then(|| start + text.len());
        }

        let mut found = rest.char_indices();
        let mut consumed = 0;
        for expected in text.chars() {
            let (offset, actual) = found.next()?;
            if !same_ignoring_case(expected, actual) {
                return None;
            }
            consumed = offset + actual.len_utf8();
        }
        Some(start + consumed)
    }
}

fn range_end(range: RangeInclusive<char>, source: &Source, start: usize) -> Option<usize> {
    let c = source.rest(start)?.chars().next()?;
    range.contains(&c).then(|| start + c.len_utf8())
}

/// Compares one character at a time through `char::to_lowercase`. This is not full case
/// folding: a character never matches a multi-character folding such as "ß" against "SS".
fn same_ignoring_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            LiteralValue::Text(text) => {
                write!(f, "Literal('{}'", Escaped(text))?;
                if self.case_sensitive {
                    f.write_str(", case_sensitive")?;
                }
                f.write_str(")")
            }
            LiteralValue::Range(first, last) => write!(
                f,
                "Literal(('{}', '{}'))",
                Escaped(&first.to_string()),
                Escaped(&last.to_string())
            ),
        }
    }
}

/// Control characters rendered as `\xNN`.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            if c.is_control() && (c as u32) < 0x100 {
                write!(f, "\\x{:02x}", c as u32)?;
            } else {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}
