//! # abnf
//!
//! A parser generator for grammars written in ABNF (RFC 5234, with the RFC 7405
//! case-sensitive string syntax).
//!
//! Rule text is compiled into parser combinators registered in a [`Grammar`]. Every
//! combinator enumerates all the ways it can match, so ambiguous grammars are parsed
//! correctly and the longest overall match is returned.
//!
//! ```ignore
//! use abnf::Grammar;
//!
//! let grammar = Grammar::from_rulelist("uri", r#"
//! uri    = scheme ":" path
//! scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
//! path   = *VCHAR
//! "#, &[])?;
//! let tree = grammar.rule("uri").parse_all("urn:example")?;
//! assert_eq!(tree.child("scheme").map(|n| n.value()), Some("urn".to_string()));
//! ```
//!
//! ## Testing
//!
//! Tree assertions for tests live in the [testing module](abnf::testing).

pub mod abnf;

pub use abnf::cache::{CacheStats, ParseCache};
pub use abnf::error::{Error, GrammarError, ParseError};
pub use abnf::grammar::{Grammar, GrammarOptions, ProseMode, Rule};
pub use abnf::parsing::{Matches, Parser, Repeat};
pub use abnf::source::Source;
pub use abnf::tree::{Match, Node};
