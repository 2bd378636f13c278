use std::fmt;

/// A `<prose-val>` kept as a placeholder. It describes its syntax in words, so it can never
/// match anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prose {
    text: String,
}

impl Prose {
    pub fn new(text: impl Into<String>) -> Self {
        Prose { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Prose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prose(<{}>)", self.text)
    }
}
