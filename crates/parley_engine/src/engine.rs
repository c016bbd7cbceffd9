//! The intent determination engine.
//!
//! The engine owns the domain registry behind a reader-writer lock.
//! Registrations and drops take the write lock. Queries take the read lock
//! only long enough to clone the persistent registry, so streams never
//! hold the lock while being consumed.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use im::Vector;
use parley_foundation::{
    EngineConfig, EnglishTokenizer, Error, ErrorContext, Result, Tokenizer,
};
use parley_intent::{IntentDefinition, IntentResult, IntentScorer};
use parley_lexicon::normalize_key;
use parley_tagger::EntityTagger;

use crate::domain::{DEFAULT_DOMAIN, Domain};
use crate::stats::{EngineStats, StatsSnapshot};
use crate::stream::IntentStream;

/// Registered domains in registration order.
#[derive(Clone, Debug)]
pub(crate) struct EngineState {
    pub(crate) domains: Vector<Domain>,
}

impl EngineState {
    fn new() -> Self {
        let mut domains = Vector::new();
        domains.push_back(Domain::new(DEFAULT_DOMAIN));
        Self { domains }
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.domains.iter().position(|d| d.name() == name)
    }

    fn get(&self, name: &str) -> Option<&Domain> {
        self.position(name).map(|i| &self.domains[i])
    }

    /// Returns the named domain, creating it if needed.
    pub(crate) fn get_or_create(&mut self, name: &str) -> &mut Domain {
        let index = if let Some(index) = self.position(name) {
            index
        } else {
            tracing::debug!(domain = name, "creating domain implicitly");
            self.domains.push_back(Domain::new(name));
            self.domains.len() - 1
        };
        &mut self.domains[index]
    }
}

/// Recognizes intents in utterances against registered domains.
///
/// All methods take `&self`; the engine can be shared between threads.
///
/// ```
/// use parley_engine::{DEFAULT_DOMAIN, IntentEngine};
/// use parley_intent::IntentBuilder;
///
/// let engine = IntentEngine::new();
/// engine.register_entity("weather", "Weather", DEFAULT_DOMAIN);
/// engine
///     .register_intent_parser(
///         IntentBuilder::new("WeatherIntent").require("Weather").build().unwrap(),
///         DEFAULT_DOMAIN,
///     )
///     .unwrap();
///
/// let best = engine.best_intent("what's the weather").unwrap();
/// assert_eq!(best.intent_type, "WeatherIntent");
/// ```
#[derive(Debug)]
pub struct IntentEngine {
    state: RwLock<EngineState>,
    tokenizer: Arc<dyn Tokenizer>,
    config: EngineConfig,
    stats: Arc<EngineStats>,
}

impl Default for IntentEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentEngine {
    /// Creates an engine with the default configuration and tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(EngineState::new()),
            tokenizer: Arc::new(EnglishTokenizer::new()),
            config: EngineConfig::default(),
            stats: Arc::new(EngineStats::new()),
        }
    }

    /// Creates an engine with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is out of range.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        Self::with_tokenizer(config, Arc::new(EnglishTokenizer::new()))
    }

    /// Creates an engine with a custom configuration and tokenizer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is out of range.
    pub fn with_tokenizer(config: EngineConfig, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: RwLock::new(EngineState::new()),
            tokenizer,
            config,
            stats: Arc::new(EngineStats::new()),
        })
    }

    pub(crate) fn from_state(
        state: EngineState,
        config: EngineConfig,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Self {
        Self {
            state: RwLock::new(state),
            tokenizer,
            config,
            stats: Arc::new(EngineStats::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn state(&self) -> EngineState {
        self.read().clone()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the tokenizer.
    #[must_use]
    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// Returns the live work counters.
    #[must_use]
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Returns the current counter values.
    #[must_use]
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Normalizes a surface value the way utterance windows are normalized.
    fn surface_key(&self, surface: &str) -> String {
        let utterance = self.tokenizer.utterance(surface);
        normalize_key(&utterance.window_key(0..utterance.token_count()))
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a domain. Registering an existing name is a no-op.
    ///
    /// Returns true if the domain was created.
    pub fn register_domain(&self, name: &str) -> bool {
        let mut state = self.write();
        if state.position(name).is_some() {
            return false;
        }
        state.domains.push_back(Domain::new(name));
        tracing::debug!(domain = name, "registered domain");
        true
    }

    /// Registers `surface` as an entity of `entity_type` in `domain`.
    ///
    /// Returns true if the association is new.
    pub fn register_entity(&self, surface: &str, entity_type: &str, domain: &str) -> bool {
        self.register_entity_alias(surface, surface, entity_type, domain)
    }

    /// Registers `surface` as another way of writing `alias_of`.
    ///
    /// Tags matched through `surface` report `alias_of` as their canonical
    /// value. Returns true if the association is new.
    pub fn register_entity_alias(
        &self,
        surface: &str,
        alias_of: &str,
        entity_type: &str,
        domain: &str,
    ) -> bool {
        let key = self.surface_key(surface);
        if key.is_empty() || entity_type.trim().is_empty() {
            tracing::warn!(domain, surface, entity_type, "ignoring blank entity");
            return false;
        }
        let added = self
            .write()
            .get_or_create(domain)
            .register_entity(&key, entity_type, alias_of);
        tracing::debug!(domain, key = %key, entity_type, added, "registered entity");
        added
    }

    /// Registers a regex entity in `domain`.
    ///
    /// Returns the entity types defined by the pattern's named groups. A
    /// pattern without named groups is stored but never produces tags.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the pattern does not compile.
    pub fn register_regex_entity(&self, pattern: &str, domain: &str) -> Result<BTreeSet<String>> {
        let result = self.write().get_or_create(domain).register_regex(pattern);
        match result {
            Ok(types) => {
                tracing::debug!(domain, pattern, ?types, "registered regex entity");
                Ok(types)
            }
            Err(err) => {
                tracing::warn!(domain, pattern, error = %err, "rejected regex entity");
                Err(err.with_context(
                    ErrorContext::new()
                        .with_domain(domain)
                        .with_operation("register_regex_entity"),
                ))
            }
        }
    }

    /// Registers an intent definition in `domain`, replacing any definition
    /// of the same name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the definition is malformed.
    pub fn register_intent_parser(&self, definition: IntentDefinition, domain: &str) -> Result<()> {
        if let Err(err) = definition.validate() {
            tracing::warn!(domain, intent = %definition.name, error = %err, "rejected intent parser");
            return Err(err.with_context(
                ErrorContext::new()
                    .with_domain(domain)
                    .with_operation("register_intent_parser"),
            ));
        }
        let name = definition.name.clone();
        let replaced = self.write().get_or_create(domain).register_intent(definition);
        tracing::debug!(domain, intent = %name, replaced, "registered intent parser");
        Ok(())
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes the named intent definitions from `domain`.
    ///
    /// Returns how many were removed. Unknown names and domains are ignored.
    pub fn drop_intent_parser<S: AsRef<str>>(&self, domain: &str, names: &[S]) -> usize {
        let mut state = self.write();
        let Some(index) = state.position(domain) else {
            return 0;
        };
        let removed = state.domains[index].drop_intents(names);
        tracing::debug!(domain, removed, "dropped intent parsers");
        removed
    }

    /// Removes every keyword and regex entity of `entity_type` from `domain`.
    ///
    /// Returns true if anything was removed.
    pub fn drop_entity(&self, domain: &str, entity_type: &str) -> bool {
        let mut state = self.write();
        let Some(index) = state.position(domain) else {
            return false;
        };
        let removed = state.domains[index].drop_entity(entity_type);
        tracing::debug!(domain, entity_type, removed, "dropped entity");
        removed
    }

    /// Removes the regex entities of `entity_type` from `domain`.
    ///
    /// Returns true if anything was removed.
    pub fn drop_regex_entity(&self, domain: &str, entity_type: &str) -> bool {
        let mut state = self.write();
        let Some(index) = state.position(domain) else {
            return false;
        };
        let removed = state.domains[index].drop_regex(entity_type);
        tracing::debug!(domain, entity_type, removed, "dropped regex entity");
        removed
    }

    /// Removes a domain with everything registered in it.
    ///
    /// Returns false for unknown names and for the default domain.
    pub fn drop_domain(&self, name: &str) -> bool {
        if name == DEFAULT_DOMAIN {
            return false;
        }
        let mut state = self.write();
        let Some(index) = state.position(name) else {
            return false;
        };
        state.domains.remove(index);
        tracing::debug!(domain = name, "dropped domain");
        true
    }

    // =========================================================================
    // Determination
    // =========================================================================

    /// Returns a lazy stream of at most `num_results` interpretations of
    /// `utterance`, best first, across every domain.
    #[must_use]
    pub fn determine_intent(&self, utterance: &str, num_results: usize) -> IntentStream {
        let domains: Vec<Domain> = self.read().domains.iter().cloned().collect();
        IntentStream::new(
            self.tokenizer.utterance(utterance),
            domains,
            EntityTagger::new(&self.config),
            IntentScorer::new(&self.config),
            num_results,
            Arc::clone(&self.stats),
        )
    }

    /// Returns the single best interpretation of `utterance`.
    #[must_use]
    pub fn best_intent(&self, utterance: &str) -> Option<IntentResult> {
        self.determine_intent(utterance, 1).next()
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Returns the domain names in registration order.
    #[must_use]
    pub fn domains(&self) -> Vec<String> {
        self.read()
            .domains
            .iter()
            .map(|d| d.name().to_string())
            .collect()
    }

    /// Returns true if the domain exists.
    #[must_use]
    pub fn has_domain(&self, name: &str) -> bool {
        self.read().position(name).is_some()
    }

    /// Returns the intent definitions of `domain` in registration order.
    #[must_use]
    pub fn intent_parsers(&self, domain: &str) -> Vec<IntentDefinition> {
        self.read()
            .get(domain)
            .map(|d| d.intents().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the keyword entity types registered in `domain`.
    #[must_use]
    pub fn entity_types(&self, domain: &str) -> BTreeSet<String> {
        self.read()
            .get(domain)
            .map(|d| d.index().entity_types())
            .unwrap_or_default()
    }

    /// Returns the entity types defined by regex entities in `domain`.
    #[must_use]
    pub fn regex_entity_types(&self, domain: &str) -> BTreeSet<String> {
        self.read()
            .get(domain)
            .map(|d| d.regexes().entity_types())
            .unwrap_or_default()
    }

    /// Returns the regex entity patterns of `domain` in registration order.
    #[must_use]
    pub fn regex_patterns(&self, domain: &str) -> Vec<String> {
        self.read()
            .get(domain)
            .map(|d| d.regexes().patterns())
            .unwrap_or_default()
    }

    /// Checks that `domain` is registered.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `domain` is not registered.
    pub fn require_domain(&self, domain: &str) -> Result<()> {
        if self.has_domain(domain) {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!("unknown domain '{domain}'"))
                .with_context(ErrorContext::new().with_domain(domain)))
        }
    }
}
