//! Configuration loader for abnf grammars.
//!
//! `defaults/abnf.default.toml` is embedded so documented defaults and runtime behavior
//! stay in sync. Applications layer their own files on top via [`Loader`] and turn the
//! result into [`GrammarOptions`] with [`AbnfConfig::grammar_options`].

use abnf::{GrammarOptions, ProseMode};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/abnf.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AbnfConfig {
    pub grammar: GrammarConfig,
    pub cache: CacheConfig,
}

/// How rule text is compiled.
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    pub first_match_alternation: bool,
    pub prose: ProseMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub max_size: usize,
}

impl AbnfConfig {
    pub fn grammar_options(&self) -> Result<GrammarOptions, ConfigError> {
        let cache_size = NonZeroUsize::new(self.cache.max_size)
            .ok_or_else(|| ConfigError::Message("cache.max_size must be at least 1".into()))?;
        Ok(GrammarOptions {
            first_match_alternation: self.grammar.first_match_alternation,
            prose: self.grammar.prose,
            cache_size,
        })
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<AbnfConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<AbnfConfig, ConfigError> {
    Loader::new().build()
}
