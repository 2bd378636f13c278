//! Grammars and rule registries
//!
//! A [`Grammar`] is a namespace of named [`Rule`]s. Names are case-insensitive, and asking
//! for a name always yields the same rule, creating an unbound one if needed. That is what
//! lets a rule be referenced before it is defined.
//!
//! Lookups fall back to a base grammar, normally the RFC 5234 core rules. A local definition
//! with `=` shadows the base rule of the same name.
//!
//! Rules live in an arena owned by the grammar. Definitions refer to other rules through
//! weak [`RuleRef`]s, so recursive grammars form no reference cycles and are freed with
//! their grammar.

mod loading;
mod rule;

pub use loading::normalize_line_endings;
pub use rule::{Rule, RuleRef};

use crate::abnf::bootstrap;
use crate::abnf::cache::{CacheRegistry, CacheStats, SharedCache, DEFAULT_CACHE_SIZE};
use crate::abnf::error::{Error, GrammarError};
use crate::abnf::parsing::Parser;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::{Rc, Weak};
use tracing::debug;

/// How `<prose-val>` elements are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProseMode {
    /// Fail with [`GrammarError::ProseVal`].
    #[default]
    Reject,
    /// Compile to a [`Prose`](crate::abnf::parsing::Prose) node that never matches.
    Placeholder,
}

/// Settings applied when rules are created and compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarOptions {
    /// Whether compiled alternations stop at their first matching alternative.
    pub first_match_alternation: bool,
    pub prose: ProseMode,
    /// Capacity of each repetition cache built by the compiler.
    pub cache_size: NonZeroUsize,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        GrammarOptions {
            first_match_alternation: false,
            prose: ProseMode::default(),
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

/// Shared handle to a rule registry. Clones refer to the same grammar.
#[derive(Clone)]
pub struct Grammar {
    inner: Rc<GrammarInner>,
}

pub(crate) struct GrammarInner {
    name: String,
    base: Option<Grammar>,
    options: GrammarOptions,
    table: RefCell<RuleTable>,
    caches: CacheRegistry,
    // Foreign grammars whose rules are referenced from this one. Strong handles: two grammars
    // that import from each other form a cycle and are never freed.
    retained: RefCell<Vec<Grammar>>,
}

#[derive(Default)]
struct RuleTable {
    slots: Vec<RuleSlot>,
    index: HashMap<String, usize>,
}

#[derive(Clone)]
pub(crate) struct RuleSlot {
    pub(crate) name: Rc<str>,
    pub(crate) definition: Option<Parser>,
    pub(crate) exclusion: Option<RuleRef>,
}

impl Grammar {
    /// An empty grammar on top of the core rules.
    pub fn new(name: impl Into<String>) -> Grammar {
        Grammar::with_options(name, GrammarOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: GrammarOptions) -> Grammar {
        Grammar::build(name.into(), Some(Grammar::core()), options)
    }

    /// A grammar that falls back to `base` instead of the core rules.
    pub fn with_base(name: impl Into<String>, base: &Grammar, options: GrammarOptions) -> Grammar {
        Grammar::build(name.into(), Some(base.clone()), options)
    }

    /// A grammar with no fallback at all.
    pub fn standalone(name: impl Into<String>, options: GrammarOptions) -> Grammar {
        Grammar::build(name.into(), None, options)
    }

    fn build(name: String, base: Option<Grammar>, options: GrammarOptions) -> Grammar {
        Grammar {
            inner: Rc::new(GrammarInner {
                name,
                base,
                options,
                table: RefCell::new(RuleTable::default()),
                caches: CacheRegistry::new(),
                retained: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The RFC 5234 appendix B core rules.
    pub fn core() -> Grammar {
        bootstrap::core()
    }

    /// The ABNF meta-grammar used to read rule text.
    pub fn abnf() -> Grammar {
        bootstrap::abnf()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn options(&self) -> &GrammarOptions {
        &self.inner.options
    }

    pub fn base(&self) -> Option<&Grammar> {
        self.inner.base.as_ref()
    }

    pub fn ptr_eq(&self, other: &Grammar) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The rule called `name`: this grammar's own, else the base grammar's, else a new
    /// unbound rule registered here.
    pub fn rule(&self, name: &str) -> Rule {
        self.get(name).unwrap_or_else(|| self.local_rule(name))
    }

    /// Like [`Grammar::rule`] but never creates anything.
    pub fn get(&self, name: &str) -> Option<Rule> {
        self.local(name)
            .or_else(|| self.base().and_then(|base| base.get(name)))
    }

    fn local(&self, name: &str) -> Option<Rule> {
        let id = *self.inner.table.borrow().index.get(&name.to_lowercase())?;
        Some(Rule::new(self.clone(), id))
    }

    /// This grammar's own rule called `name`, created unbound if missing. Base grammars are
    /// not consulted.
    pub fn local_rule(&self, name: &str) -> Rule {
        if let Some(rule) = self.local(name) {
            return rule;
        }
        let mut table = self.inner.table.borrow_mut();
        let id = table.slots.len();
        table.slots.push(RuleSlot {
            name: Rc::from(name),
            definition: None,
            exclusion: None,
        });
        table.index.insert(name.to_lowercase(), id);
        Rule::new(self.clone(), id)
    }

    /// Rules registered in this grammar, in creation order.
    pub fn rules(&self) -> Vec<Rule> {
        let count = self.inner.table.borrow().slots.len();
        (0..count).map(|id| Rule::new(self.clone(), id)).collect()
    }

    /// Bind `name` in this grammar, shadowing any base rule of the same name.
    pub fn define(&self, name: &str, definition: impl Into<Parser>) -> Rule {
        let rule = self.local_rule(name);
        rule.set_definition(definition);
        rule
    }

    /// Extend `name` with one more alternative, the way `=/` does. A local rule that has not
    /// been defined yet starts from the base grammar's definition of the same name.
    pub fn add_alternative(&self, name: &str, alternative: impl Into<Parser>) -> Rule {
        let rule = self.local_rule(name);
        if !rule.is_defined() {
            let inherited = self
                .base()
                .and_then(|base| base.get(name))
                .and_then(|base_rule| base_rule.definition());
            if let Some(definition) = inherited {
                rule.set_definition(definition);
            }
        }
        rule.add_alternative(alternative);
        rule
    }

    /// Bind `name` locally to the definition of a rule from another grammar.
    ///
    /// The other grammar is kept alive for as long as this one lives. Grammars that import
    /// from each other keep each other alive and leak once both handles are dropped, so
    /// mutual imports belong in long-lived grammars only.
    pub fn import(&self, name: &str, rule: &Rule) -> Result<Rule, Error> {
        let definition = rule
            .definition()
            .ok_or_else(|| GrammarError::UndefinedRule(rule.name().to_string()))?;
        debug!(
            grammar = %self.name(),
            rule = name,
            from = %rule.grammar().name(),
            "importing rule"
        );
        self.retain(rule.grammar());
        Ok(self.define(name, definition))
    }

    /// Names of this grammar's rules that are referenced or created but never defined.
    pub fn undefined_rules(&self) -> Vec<String> {
        self.inner
            .table
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.definition.is_none())
            .map(|slot| slot.name.to_string())
            .collect()
    }

    pub fn caches(&self) -> Vec<SharedCache> {
        self.inner.caches.caches()
    }

    pub fn clear_caches(&self) {
        self.inner.caches.clear_caches();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.caches.stats()
    }

    pub(crate) fn downgrade(&self) -> Weak<GrammarInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Rc<GrammarInner>) -> Grammar {
        Grammar { inner }
    }

    pub(crate) fn slot(&self, id: usize) -> Option<RuleSlot> {
        self.inner.table.borrow().slots.get(id).cloned()
    }

    pub(crate) fn rule_count(&self) -> usize {
        self.inner.table.borrow().slots.len()
    }

    /// Forget every rule registered after the first `len`.
    pub(crate) fn truncate_rules(&self, len: usize) {
        let mut table = self.inner.table.borrow_mut();
        table.slots.truncate(len);
        table.index.retain(|_, id| *id < len);
    }

    pub(crate) fn update_slot(&self, id: usize, update: impl FnOnce(&mut RuleSlot)) {
        if let Some(slot) = self.inner.table.borrow_mut().slots.get_mut(id) {
            update(slot);
        }
    }

    /// Register the caches found in `parser` and keep alive any grammar it reaches into.
    pub(crate) fn adopt(&self, parser: &Parser) {
        let mut foreign = Vec::new();
        parser.walk(&mut |node| {
            if let Some(cache) = node.cache() {
                self.inner.caches.register(cache);
            }
            if let Parser::Rule(rule) = node {
                if let Ok(rule) = rule.upgrade() {
                    foreign.push(rule.grammar().clone());
                }
            }
        });
        for grammar in foreign {
            self.retain(&grammar);
        }
    }

    fn retain(&self, other: &Grammar) {
        if self.ptr_eq(other) || self.is_based_on(other) {
            return;
        }
        let mut retained = self.inner.retained.borrow_mut();
        if !retained.iter().any(|known| known.ptr_eq(other)) {
            retained.push(other.clone());
        }
    }

    fn is_based_on(&self, other: &Grammar) -> bool {
        let mut base = self.base();
        while let Some(grammar) = base {
            if grammar.ptr_eq(other) {
                return true;
            }
            base = grammar.base();
        }
        false
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Grammar {}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.inner.name)
            .field("rules", &self.inner.table.borrow().slots.len())
            .finish_non_exhaustive()
    }
}
