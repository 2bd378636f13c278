use super::{Grammar, GrammarInner};
use crate::abnf::error::{Error, GrammarError, ParseError};
use crate::abnf::parsing::{no_match, Alternation, MatchSet, Matches, Parser};
use crate::abnf::source::Source;
use crate::abnf::tree::{Match, Node};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::debug;

/// A named production of a [`Grammar`].
///
/// A rule may be unbound: it exists as soon as it is referenced, and parsing through it
/// fails with [`GrammarError::UndefinedRule`] until it gets a definition. Every match of a
/// rule is wrapped in a node carrying the rule's name.
#[derive(Clone)]
pub struct Rule {
    grammar: Grammar,
    id: usize,
}

/// A non-owning reference to a rule, as held by combinators and errors.
#[derive(Clone)]
pub struct RuleRef {
    grammar: Weak<GrammarInner>,
    id: usize,
    name: Rc<str>,
}

impl RuleRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn upgrade(&self) -> Result<Rule, GrammarError> {
        self.grammar
            .upgrade()
            .map(|inner| Rule::new(Grammar::from_inner(inner), self.id))
            .ok_or_else(|| GrammarError::DanglingRule(self.name.to_string()))
    }
}

impl fmt::Debug for RuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule('{}')", self.name)
    }
}

impl Rule {
    pub(crate) fn new(grammar: Grammar, id: usize) -> Rule {
        Rule { grammar, id }
    }

    pub fn name(&self) -> Rc<str> {
        self.grammar
            .slot(self.id)
            .map(|slot| slot.name)
            .unwrap_or_else(|| Rc::from(""))
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn definition(&self) -> Option<Parser> {
        self.grammar.slot(self.id).and_then(|slot| slot.definition)
    }

    pub fn is_defined(&self) -> bool {
        self.definition().is_some()
    }

    /// Bind (or rebind) this rule. Cached results of the grammar are dropped, since they may
    /// have been computed with the old definition.
    pub fn set_definition(&self, definition: impl Into<Parser>) {
        let definition = definition.into();
        self.grammar.adopt(&definition);
        debug!(grammar = %self.grammar.name(), rule = %self.name(), %definition, "rule defined");
        self.grammar
            .update_slot(self.id, |slot| slot.definition = Some(definition));
        self.grammar.clear_caches();
    }

    /// Append an alternative to the current definition, or bind it if there is none.
    pub fn add_alternative(&self, alternative: impl Into<Parser>) {
        let alternative = alternative.into();
        let combined = match self.definition() {
            Some(existing) => Alternation::with_mode(
                vec![existing, alternative],
                self.grammar.options().first_match_alternation,
            )
            .into(),
            None => alternative,
        };
        self.set_definition(combined);
    }

    /// Reject any match of this rule whose text is, in its entirety, a match of `rule`.
    pub fn exclude_rule(&self, rule: &Rule) {
        let exclusion = rule.downgrade();
        self.grammar.adopt(&Parser::Rule(exclusion.clone()));
        self.grammar
            .update_slot(self.id, |slot| slot.exclusion = Some(exclusion));
        self.grammar.clear_caches();
    }

    pub fn clear_exclusion(&self) {
        self.grammar.update_slot(self.id, |slot| slot.exclusion = None);
        self.grammar.clear_caches();
    }

    pub fn exclusion(&self) -> Option<Rule> {
        self.grammar
            .slot(self.id)
            .and_then(|slot| slot.exclusion)
            .and_then(|exclusion| exclusion.upgrade().ok())
    }

    /// Whether this rule's top-level alternation stops at its first match. Rules whose
    /// definition is not an alternation report the grammar's default.
    pub fn first_match_alternation(&self) -> bool {
        match self.definition() {
            Some(Parser::Alternation(alternation)) => alternation.is_first_match(),
            _ => self.grammar.options().first_match_alternation,
        }
    }

    pub fn set_first_match_alternation(&self, first_match: bool) -> Result<(), Error> {
        match self.definition() {
            Some(Parser::Alternation(alternation)) => {
                alternation.set_first_match(first_match);
                self.grammar.clear_caches();
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(GrammarError::UndefinedRule(self.name().to_string()).into()),
        }
    }

    pub fn downgrade(&self) -> RuleRef {
        RuleRef {
            grammar: self.grammar.downgrade(),
            id: self.id,
            name: self.name(),
        }
    }

    /// All matches of this rule at `start`, longest first.
    pub fn lparse(&self, source: &Source, start: usize) -> Result<Matches, Error> {
        self.enumerate(source, start).map(Matches::from)
    }

    pub(crate) fn enumerate(&self, source: &Source, start: usize) -> Result<MatchSet, Error> {
        let slot = self
            .grammar
            .slot(self.id)
            .ok_or_else(|| GrammarError::DanglingRule(self.name().to_string()))?;
        let definition = slot
            .definition
            .ok_or_else(|| GrammarError::UndefinedRule(slot.name.to_string()))?;
        let candidates = definition
            .enumerate(source, start)
            .map_err(|err| err.reraise(self, start))?;
        let exclusion = slot.exclusion.map(|ex| ex.upgrade()).transpose()?;

        let mut matches = MatchSet::default();
        let mut vetoed = None;
        for candidate in candidates.iter() {
            if let Some(exclusion) = &exclusion {
                let text = source.slice(start, candidate.end).unwrap_or_default();
                match exclusion.parse_all(text) {
                    Ok(_) => {
                        vetoed = Some(ParseError::new(exclusion, start));
                        continue;
                    }
                    Err(Error::Parse(_)) => {}
                    Err(err) => return Err(err),
                }
            }
            let node = Node::rule(Rc::clone(&slot.name), candidate.nodes.clone());
            matches.insert(Match::new(vec![node], candidate.end));
        }

        if matches.is_empty() {
            return Err(no_match(&Parser::from(self), start, vetoed));
        }
        Ok(matches)
    }

    /// The longest match at `start`, as a node and the offset right after it.
    pub fn parse(&self, source: &str, start: usize) -> Result<(Node, usize), Error> {
        self.parse_source(&Source::from(source), start)
    }

    pub fn parse_source(&self, source: &Source, start: usize) -> Result<(Node, usize), Error> {
        let longest = self
            .enumerate(source, start)?
            .into_longest()
            .ok_or_else(|| ParseError::new(self, start))?;
        let end = longest.end;
        let node = longest
            .nodes
            .into_iter()
            .next()
            .ok_or_else(|| ParseError::new(self, start))?;
        Ok((node, end))
    }

    /// Parse the whole of `source`. Leftover input is a failure of this rule at the offset
    /// where the longest match stopped.
    pub fn parse_all(&self, source: &str) -> Result<Node, Error> {
        let (node, end) = self.parse(source, 0)?;
        if end < source.len() {
            return Err(ParseError::new(self, end).into());
        }
        Ok(node)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.grammar.ptr_eq(&other.grammar) && self.id == other.id
    }
}

impl Eq for Rule {}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule('{}')", self.name())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule('{}' in {:?})", self.name(), self.grammar.name())
    }
}
