//! The ABNF engine: combinators, grammars and the bootstrap compiler.

mod bootstrap;
pub mod cache;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod parsing;
pub mod source;
pub mod testing;
pub mod tree;
