//! Repetition memoization
//!
//! Each repetition node owns a bounded least-recently-used [`ParseCache`] of its results per
//! `(source, start)`. Ambiguous grammars revisit the same repetition at the same offset
//! many times while backtracking, and the cache turns those revisits into lookups.
//!
//! A [`CacheRegistry`] tracks the caches belonging to one grammar so they can be cleared
//! together, for example after the grammar is edited or once a bulk load is done.

use crate::abnf::error::ParseError;
use crate::abnf::source::Source;
use crate::abnf::tree::Match;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::{Rc, Weak};
use tracing::trace;

/// Capacity used when none is configured.
pub const DEFAULT_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(10_000) {
    Some(size) => size,
    None => panic!("cache size must be non-zero"),
};

pub type SharedCache = Rc<RefCell<ParseCache>>;

/// Every match of a repetition at one offset, longest first, or the reason it failed.
pub type CacheEntry = Result<Rc<[Match]>, ParseError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: Source,
    pub start: usize,
}

impl CacheKey {
    pub fn new(source: Source, start: usize) -> Self {
        CacheKey { source, start }
    }
}

/// Bounded LRU map from [`CacheKey`] to [`CacheEntry`], counting hits and misses.
#[derive(Debug)]
pub struct ParseCache {
    max_size: NonZeroUsize,
    entries: HashMap<CacheKey, (CacheEntry, u64)>,
    recency: BTreeMap<u64, CacheKey>,
    tick: u64,
    hits: u64,
    misses: u64,
}

impl ParseCache {
    pub fn new(max_size: NonZeroUsize) -> Self {
        ParseCache {
            max_size,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up an entry, marking it most recently used and counting the hit or miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<&CacheEntry> {
        self.tick += 1;
        let tick = self.tick;
        match self.entries.get_mut(key) {
            Some((entry, stamp)) => {
                let previous = std::mem::replace(stamp, tick);
                self.recency.remove(&previous);
                self.recency.insert(tick, key.clone());
                self.hits += 1;
                Some(entry)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up an entry without touching recency or statistics.
    pub fn peek(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key).map(|(entry, _)| entry)
    }

    /// Store an entry, evicting the least recently used one when full.
    pub fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        self.tick += 1;
        let tick = self.tick;
        match self.entries.get(&key).map(|(_, stamp)| *stamp) {
            Some(previous) => {
                self.recency.remove(&previous);
            }
            None if self.entries.len() >= self.max_size.get() => self.evict_oldest(),
            None => {}
        }
        self.recency.insert(tick, key.clone());
        self.entries.insert(key, (entry, tick));
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let (entry, stamp) = self.entries.remove(key)?;
        self.recency.remove(&stamp);
        Some(entry)
    }

    fn evict_oldest(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            trace!(start = key.start, "evicting cached repetition result");
            self.entries.remove(&key);
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> NonZeroUsize {
        self.max_size
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.recency.values()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every entry and reset the statistics.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl fmt::Display for ParseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParseCache(len={}, max_size={}, hits={}, misses={})",
            self.len(),
            self.max_size,
            self.hits,
            self.misses
        )
    }
}

/// Aggregate numbers over every live cache of a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub caches: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Weak references to the caches of one grammar. Caches die with their repetition nodes;
/// dead references are pruned as new caches are registered.
#[derive(Debug, Default)]
pub struct CacheRegistry {
    caches: RefCell<Vec<Weak<RefCell<ParseCache>>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        CacheRegistry::default()
    }

    pub fn register(&self, cache: &SharedCache) {
        let mut caches = self.caches.borrow_mut();
        caches.retain(|known| known.strong_count() > 0);
        let cache = Rc::downgrade(cache);
        if !caches.iter().any(|known| known.ptr_eq(&cache)) {
            caches.push(cache);
        }
    }

    pub fn caches(&self) -> Vec<SharedCache> {
        self.caches.borrow().iter().filter_map(Weak::upgrade).collect()
    }

    pub fn len(&self) -> usize {
        self.caches().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear_caches(&self) {
        for cache in self.caches() {
            if let Ok(mut cache) = cache.try_borrow_mut() {
                cache.clear();
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.caches()
            .iter()
            .fold(CacheStats::default(), |mut stats, cache| {
                let cache = cache.borrow();
                stats.caches += 1;
                stats.entries += cache.len();
                stats.hits += cache.hits();
                stats.misses += cache.misses();
                stats
            })
    }
}
