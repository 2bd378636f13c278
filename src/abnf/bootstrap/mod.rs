//! Hand-built grammars
//!
//! Reading ABNF requires a parser for ABNF. The RFC 5234 core rules and the ABNF
//! meta-grammar (with the RFC 7405 `%s`/`%i` string forms) are therefore assembled directly
//! from combinators, once per thread, and everything else is compiled through them.

mod compiler;
mod core_rules;
mod meta_grammar;
mod values;

pub(crate) use compiler::Compiler;

use crate::abnf::grammar::{Grammar, GrammarOptions};
use crate::abnf::parsing::{
    Alternation, Concatenation, Literal, Optional, Parser, Repeat, Repetition,
};

struct Bootstrap {
    core: Grammar,
    abnf: Grammar,
}

impl Bootstrap {
    fn build() -> Bootstrap {
        let options = GrammarOptions::default();
        let core = Grammar::standalone("core", options);
        core_rules::define(&Builder::new(&core));
        let abnf = Grammar::with_base("abnf", &core, options);
        meta_grammar::define(&Builder::new(&abnf));
        Bootstrap { core, abnf }
    }
}

thread_local! {
    static BOOTSTRAP: Bootstrap = Bootstrap::build();
}

pub(crate) fn core() -> Grammar {
    BOOTSTRAP.with(|bootstrap| bootstrap.core.clone())
}

pub(crate) fn abnf() -> Grammar {
    BOOTSTRAP.with(|bootstrap| bootstrap.abnf.clone())
}

/// Shorthand constructors used by the hand-written grammars.
struct Builder<'g> {
    grammar: &'g Grammar,
}

impl<'g> Builder<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Builder { grammar }
    }

    fn define(&self, name: &str, definition: Parser) {
        self.grammar.define(name, definition);
    }

    fn rule(&self, name: &str) -> Parser {
        self.grammar.rule(name).into()
    }

    fn lit(&self, value: &str) -> Parser {
        Literal::new(value).into()
    }

    fn exact(&self, value: &str) -> Parser {
        Literal::case_sensitive(value).into()
    }

    fn range(&self, first: char, last: char) -> Parser {
        Literal::range(first, last).into()
    }

    fn alt(&self, parsers: Vec<Parser>) -> Parser {
        Alternation::new(parsers).into()
    }

    fn cat(&self, parsers: Vec<Parser>) -> Parser {
        Concatenation::new(parsers).into()
    }

    fn rep(&self, min: usize, max: Option<usize>, element: Parser) -> Parser {
        let size = self.grammar.options().cache_size;
        Repetition::with_cache_size(Repeat::new(min, max), element, size).into()
    }

    /// `*element`
    fn any(&self, element: Parser) -> Parser {
        self.rep(0, None, element)
    }

    /// `1*element`
    fn some(&self, element: Parser) -> Parser {
        self.rep(1, None, element)
    }

    fn opt(&self, element: Parser) -> Parser {
        Optional::with_cache_size(element, self.grammar.options().cache_size).into()
    }
}
