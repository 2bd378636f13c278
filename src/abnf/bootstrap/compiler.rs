//! Turns meta-grammar parse trees into combinators registered in a target grammar.

use super::values;
use crate::abnf::error::{Error, GrammarError};
use crate::abnf::grammar::{Grammar, ProseMode, Rule};
use crate::abnf::parsing::{Alternation, Concatenation, Optional, Parser, Prose, Repetition};
use crate::abnf::tree::Node;
use tracing::debug;

pub(crate) struct Compiler<'g> {
    grammar: &'g Grammar,
    abnf: Grammar,
}

impl<'g> Compiler<'g> {
    pub(crate) fn new(grammar: &'g Grammar) -> Self {
        Compiler {
            grammar,
            abnf: Grammar::abnf(),
        }
    }

    /// Read the rule at the start of `text`, which must already use CRLF line endings.
    pub(crate) fn read_rule(&self, text: &str) -> Result<Node, Error> {
        let tree = self.abnf.rule("rule").parse(text, 0);
        self.abnf.clear_caches();
        Ok(tree?.0)
    }

    /// Read every rule of a CRLF-terminated rulelist.
    pub(crate) fn read_rulelist(&self, text: &str) -> Result<Vec<Node>, Error> {
        let tree = self.abnf.rule("rulelist").parse_all(text);
        self.abnf.clear_caches();
        let tree = tree?;
        let nodes = tree.children_named("rule").cloned().collect();
        Ok(nodes)
    }

    /// Compile `rules` (as returned by the readers) and bind them in the target grammar.
    ///
    /// Every name defined here gets a local slot before any body is compiled, so references
    /// resolve to the local rule even when it shadows a base rule defined further down.
    /// Nothing is bound unless every rule compiles.
    pub(crate) fn compile(&self, rules: &[Node]) -> Result<Vec<Rule>, Error> {
        let known = self.grammar.rule_count();
        let compiled = self.declare(rules).and_then(|headers| {
            headers
                .into_iter()
                .zip(rules)
                .map(|(header, node)| Ok((header, self.definition(node)?)))
                .collect::<Result<Vec<_>, Error>>()
        });
        let compiled = match compiled {
            Ok(compiled) => compiled,
            Err(err) => {
                self.grammar.truncate_rules(known);
                return Err(err);
            }
        };

        let rules = compiled
            .into_iter()
            .map(|((name, incremental), definition)| {
                debug!(grammar = %self.grammar.name(), rule = %name, incremental, "compiled rule");
                if incremental {
                    self.grammar.add_alternative(&name, definition)
                } else {
                    self.grammar.define(&name, definition)
                }
            })
            .collect();
        Ok(rules)
    }

    /// Name and `=/` flag of each rule, with a local slot registered for the name.
    fn declare(&self, rules: &[Node]) -> Result<Vec<(String, bool)>, Error> {
        rules
            .iter()
            .map(|node| {
                let name = expect_child(node, "rulename", "rule")?.value();
                let incremental = expect_child(node, "defined-as", "rule")?
                    .children()
                    .iter()
                    .filter_map(Node::as_literal)
                    .any(|leaf| leaf.value == "=/");
                self.grammar.local_rule(&name);
                Ok((name, incremental))
            })
            .collect()
    }

    fn definition(&self, node: &Node) -> Result<Parser, Error> {
        let elements = expect_child(node, "elements", "rule")?;
        self.alternation(expect_child(elements, "alternation", "elements")?)
    }

    fn alternation(&self, node: &Node) -> Result<Parser, Error> {
        let branches = node
            .children_named("concatenation")
            .map(|child| self.concatenation(child))
            .collect::<Result<Vec<_>, _>>()?;
        let first_match = self.grammar.options().first_match_alternation;
        collapse(branches, node, "alternation", |branches| {
            Alternation::with_mode(branches, first_match).into()
        })
    }

    fn concatenation(&self, node: &Node) -> Result<Parser, Error> {
        let items = node
            .children_named("repetition")
            .map(|child| self.repetition(child))
            .collect::<Result<Vec<_>, _>>()?;
        collapse(items, node, "concatenation", |items| {
            Concatenation::new(items).into()
        })
    }

    fn repetition(&self, node: &Node) -> Result<Parser, Error> {
        let element = self.element(expect_child(node, "element", "repetition")?)?;
        match node.child("repeat") {
            Some(repeat) => {
                let repeat = values::repeat(&repeat.value())?;
                let size = self.grammar.options().cache_size;
                Ok(Repetition::with_cache_size(repeat, element, size).into())
            }
            None => Ok(element),
        }
    }

    fn element(&self, node: &Node) -> Result<Parser, Error> {
        let inner = node
            .children()
            .first()
            .ok_or_else(|| unexpected("element", node))?;
        match inner.name() {
            "rulename" => Ok(self.grammar.rule(&inner.value()).into()),
            "group" => self.alternation(expect_child(inner, "alternation", "group")?),
            "option" => {
                let element = self.alternation(expect_child(inner, "alternation", "option")?)?;
                let size = self.grammar.options().cache_size;
                Ok(Optional::with_cache_size(element, size).into())
            }
            "char-val" => Ok(values::char_val(inner)?.into()),
            "num-val" => Ok(values::num_val(inner)?.into()),
            "prose-val" => self.prose_val(inner),
            _ => Err(unexpected("element", inner)),
        }
    }

    /// `<name>` where the text is itself a valid rulename is read as a reference to that
    /// rule. Anything else is prose, handled according to the grammar's [`ProseMode`].
    fn prose_val(&self, node: &Node) -> Result<Parser, Error> {
        let text = node.value();
        let body = text
            .strip_prefix('<')
            .and_then(|text| text.strip_suffix('>'))
            .unwrap_or(&text);

        if self.abnf.rule("rulename").parse_all(body).is_ok() {
            return Ok(self.grammar.rule(body).into());
        }
        match self.grammar.options().prose {
            ProseMode::Reject => Err(GrammarError::ProseVal(body.to_string()).into()),
            ProseMode::Placeholder => Ok(Prose::new(body).into()),
        }
    }
}

fn expect_child<'n>(node: &'n Node, name: &str, context: &'static str) -> Result<&'n Node, Error> {
    node.child(name).ok_or_else(|| unexpected(context, node))
}

fn unexpected(context: &'static str, node: &Node) -> Error {
    GrammarError::UnexpectedNode {
        context,
        found: node.name().to_string(),
    }
    .into()
}

/// A single item stands for itself; several are combined.
fn collapse(
    mut items: Vec<Parser>,
    node: &Node,
    context: &'static str,
    combine: impl FnOnce(Vec<Parser>) -> Parser,
) -> Result<Parser, Error> {
    match items.len() {
        0 => Err(unexpected(context, node)),
        1 => Ok(items.remove(0)),
        _ => Ok(combine(items)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abnf::grammar::GrammarOptions;
    use crate::abnf::parsing::LiteralValue;

    fn compile(grammar: &Grammar, text: &str) -> Parser {
        grammar.create(text).unwrap().definition().unwrap()
    }

    #[test]
    fn failed_compile_leaves_the_grammar_untouched() {
        let grammar = Grammar::new("rollback");
        grammar.create("a = \"a\"").unwrap();
        assert!(grammar.create("DIGIT = b <any text>").is_err());
        assert_eq!(grammar.rules().len(), 1);
        assert!(grammar.rule("DIGIT").parse_all("7").is_ok());
    }

    #[test]
    fn single_branch_alternation_collapses() {
        let grammar = Grammar::new("collapse");
        let parser = compile(&grammar, "a = \"x\"");
        assert!(matches!(parser, Parser::Literal(_)));
    }

    #[test]
    fn structure_follows_the_text() {
        let grammar = Grammar::new("structure");
        let parser = compile(&grammar, "a = b 2*3c / [d]");
        assert_eq!(
            parser.to_string(),
            "Alternation(Concatenation(Rule('b'), Repetition(Repeat(2, 3), Rule('c'))), Option(Rule('d')))"
        );
    }

    #[test]
    fn alternation_mode_comes_from_options() {
        let options = GrammarOptions {
            first_match_alternation: true,
            ..GrammarOptions::default()
        };
        let grammar = Grammar::with_options("first", options);
        match compile(&grammar, "a = \"x\" / \"y\"") {
            Parser::Alternation(alternation) => assert!(alternation.is_first_match()),
            other => panic!("expected alternation, got {other}"),
        }
    }

    #[test]
    fn num_val_range() {
        let grammar = Grammar::new("range");
        match compile(&grammar, "a = %x41-5A") {
            Parser::Literal(literal) => {
                assert_eq!(literal.value(), &LiteralValue::Range('A', 'Z'))
            }
            other => panic!("expected literal, got {other}"),
        }
    }

    #[test]
    fn prose_naming_a_rule_is_a_reference() {
        let grammar = Grammar::new("prose-ref");
        let parser = compile(&grammar, "a = <b>");
        assert_eq!(parser.to_string(), "Rule('b')");
    }

    #[test]
    fn prose_text_follows_prose_mode() {
        let grammar = Grammar::new("prose-reject");
        let err = grammar.create("a = <any text>").unwrap_err();
        assert_eq!(
            err.as_grammar_error(),
            Some(&GrammarError::ProseVal("any text".into()))
        );

        let options = GrammarOptions {
            prose: ProseMode::Placeholder,
            ..GrammarOptions::default()
        };
        let grammar = Grammar::with_options("prose-placeholder", options);
        let rule = grammar.create("a = <any text>").unwrap();
        assert!(rule.parse_all("any text").unwrap_err().is_parse_error());
    }
}
