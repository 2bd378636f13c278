//! Error types
//!
//! A [`ParseError`] is the ordinary outcome of a combinator that cannot match at some
//! offset; callers catch it and backtrack. A [`GrammarError`] means the grammar itself is
//! unusable, for example an undefined production or an undecodable value, and no amount of
//! backtracking will fix it.

use crate::abnf::parsing::Parser;
use thiserror::Error;

/// Any failure the engine can report.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

impl Error {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    pub fn is_grammar_error(&self) -> bool {
        matches!(self, Error::Grammar(_))
    }

    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Grammar(_) => None,
        }
    }

    pub fn as_grammar_error(&self) -> Option<&GrammarError> {
        match self {
            Error::Parse(_) => None,
            Error::Grammar(err) => Some(err),
        }
    }

    /// Re-raise a parse failure as a failure of an enclosing combinator, keeping the inner
    /// failure as its cause. Grammar errors pass through untouched.
    pub(crate) fn reraise(self, parser: impl Into<Parser>, start: usize) -> Error {
        match self {
            Error::Parse(inner) => Error::Parse(ParseError::new(parser, start).caused_by(inner)),
            grammar => grammar,
        }
    }
}

/// A combinator could not produce a single match at `start`.
#[derive(Debug, Clone, Error)]
#[error("{parser}: {start}")]
pub struct ParseError {
    parser: Parser,
    start: usize,
    #[source]
    cause: Option<Box<ParseError>>,
}

impl ParseError {
    pub fn new(parser: impl Into<Parser>, start: usize) -> Self {
        ParseError {
            parser: parser.into(),
            start,
            cause: None,
        }
    }

    pub fn caused_by(mut self, cause: ParseError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The combinator that failed.
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Offset at which the combinator was asked to match.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn cause(&self) -> Option<&ParseError> {
        self.cause.as_deref()
    }

    /// The failure chain from this error down to the innermost cause.
    pub fn chain(&self) -> impl Iterator<Item = &ParseError> {
        std::iter::successors(Some(self), |err| err.cause())
    }
}

/// The grammar cannot be used as written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Undefined rule \"{0}\".")]
    UndefinedRule(String),
    #[error("Grammar contains a prose-val: <{0}>.")]
    ProseVal(String),
    #[error("Invalid repeat \"{0}\".")]
    InvalidRepeat(String),
    #[error("Invalid numeric value \"{0}\".")]
    InvalidNumVal(String),
    #[error("Rule \"{0}\" belongs to a grammar that no longer exists.")]
    DanglingRule(String),
    #[error("Unexpected node \"{found}\" while compiling {context}.")]
    UnexpectedNode { context: &'static str, found: String },
}
