//! Building grammars from ABNF text.

use super::{Grammar, GrammarOptions, Rule};
use crate::abnf::bootstrap::Compiler;
use crate::abnf::error::{Error, GrammarError};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static LINE_ENDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n|\r|\n").expect("line ending pattern is valid"));

/// Rewrite every line ending as CRLF, the only one the ABNF meta-grammar accepts.
pub fn normalize_line_endings(text: &str) -> String {
    LINE_ENDING.replace_all(text, "\r\n").into_owned()
}

fn terminated(text: &str) -> String {
    let mut text = normalize_line_endings(text);
    if !text.ends_with("\r\n") {
        text.push_str("\r\n");
    }
    text
}

impl Grammar {
    /// Compile one rule from its ABNF text and register it. Comment lines and continuation
    /// lines belong to the rule; anything after the rule itself is ignored.
    pub fn create(&self, rule_source: &str) -> Result<Rule, Error> {
        let compiler = Compiler::new(self);
        let node = compiler.read_rule(&terminated(rule_source))?;
        let mut rules = compiler.compile(std::slice::from_ref(&node))?;
        rules
            .pop()
            .ok_or_else(|| GrammarError::UnexpectedNode {
                context: "rule",
                found: node.name().to_string(),
            }
            .into())
    }

    /// Compile several rules, one source text each. All texts are read before any rule is
    /// bound, so a rule may refer to one that comes later in the list.
    pub fn load_rules<I, S>(&self, rule_sources: I) -> Result<Vec<Rule>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiler = Compiler::new(self);
        let nodes = rule_sources
            .into_iter()
            .map(|source| compiler.read_rule(&terminated(source.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        compiler.compile(&nodes)
    }

    /// Compile a whole rulelist, such as the contents of a grammar file.
    pub fn load_rulelist(&self, text: &str) -> Result<Vec<Rule>, Error> {
        let compiler = Compiler::new(self);
        let rules = compiler.compile(&compiler.read_rulelist(&terminated(text.trim_end()))?)?;
        debug!(grammar = %self.name(), rules = rules.len(), "rulelist loaded");
        Ok(rules)
    }

    /// A new grammar holding `rule_sources`, with `imports` bound afterwards as
    /// `(local name, foreign rule)` pairs.
    pub fn from_rules<I, S>(
        name: impl Into<String>,
        rule_sources: I,
        imports: &[(&str, &Rule)],
    ) -> Result<Grammar, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Grammar::from_rules_with_options(name, rule_sources, imports, GrammarOptions::default())
    }

    pub fn from_rules_with_options<I, S>(
        name: impl Into<String>,
        rule_sources: I,
        imports: &[(&str, &Rule)],
        options: GrammarOptions,
    ) -> Result<Grammar, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let grammar = Grammar::with_options(name, options);
        grammar.load_rules(rule_sources)?;
        grammar.import_all(imports)?;
        Ok(grammar)
    }

    /// A new grammar holding the rules of `text`, with `imports` bound afterwards.
    pub fn from_rulelist(
        name: impl Into<String>,
        text: &str,
        imports: &[(&str, &Rule)],
    ) -> Result<Grammar, Error> {
        Grammar::from_rulelist_with_options(name, text, imports, GrammarOptions::default())
    }

    pub fn from_rulelist_with_options(
        name: impl Into<String>,
        text: &str,
        imports: &[(&str, &Rule)],
        options: GrammarOptions,
    ) -> Result<Grammar, Error> {
        let grammar = Grammar::with_options(name, options);
        grammar.load_rulelist(text)?;
        grammar.import_all(imports)?;
        Ok(grammar)
    }

    fn import_all(&self, imports: &[(&str, &Rule)]) -> Result<(), Error> {
        for (name, rule) in imports {
            self.import(name, rule)?;
        }
        Ok(())
    }
}
