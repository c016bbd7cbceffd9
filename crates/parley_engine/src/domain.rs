//! Domains: isolated partitions of entities, regex entities, and intents.
//!
//! A domain is a persistent value. Cloning it is O(1) and later mutations
//! of either copy do not affect the other, which is what lets a running
//! intent stream keep a consistent view while registrations continue.

use std::collections::BTreeSet;
use std::sync::Arc;

use im::Vector;
use parley_foundation::Result;
use parley_intent::IntentDefinition;
use parley_lexicon::{EntityIndex, RegexRegistry};

/// Name of the domain that always exists.
pub const DEFAULT_DOMAIN: &str = "default";

/// One isolated set of entities and intent definitions.
#[derive(Clone, Debug)]
pub struct Domain {
    name: Arc<str>,
    index: EntityIndex,
    regexes: RegexRegistry,
    intents: Vector<Arc<IntentDefinition>>,
}

impl Domain {
    /// Creates an empty domain.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            index: EntityIndex::new(),
            regexes: RegexRegistry::new(),
            intents: Vector::new(),
        }
    }

    /// Returns the domain name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the keyword entity index.
    #[must_use]
    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    /// Returns the regex entity registry.
    #[must_use]
    pub fn regexes(&self) -> &RegexRegistry {
        &self.regexes
    }

    /// Returns the intent definitions in registration order.
    pub fn intents(&self) -> impl Iterator<Item = &IntentDefinition> {
        self.intents.iter().map(|d| &**d)
    }

    /// Returns the number of intent definitions.
    #[must_use]
    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }

    /// Returns the definition with the given name.
    #[must_use]
    pub fn intent(&self, name: &str) -> Option<&IntentDefinition> {
        self.intents
            .iter()
            .find(|d| d.name == name)
            .map(|d| &**d)
    }

    /// Returns every entity type some definition mentions.
    #[must_use]
    pub fn referenced_types(&self) -> BTreeSet<String> {
        self.intents
            .iter()
            .flat_map(|d| d.entity_types())
            .map(str::to_string)
            .collect()
    }

    /// Indexes a normalized key. Returns true if the association is new.
    pub fn register_entity(&mut self, key: &str, entity_type: &str, canonical: &str) -> bool {
        self.index.insert(key, entity_type, canonical)
    }

    /// Registers a regex entity, returning the entity types it defines.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the pattern does not compile.
    pub fn register_regex(&mut self, pattern: &str) -> Result<BTreeSet<String>> {
        self.regexes.register(pattern)
    }

    /// Adds a definition, replacing one of the same name in place.
    ///
    /// Returns true if a definition was replaced.
    pub fn register_intent(&mut self, definition: IntentDefinition) -> bool {
        let definition = Arc::new(definition);
        match self.intents.iter().position(|d| d.name == definition.name) {
            Some(index) => {
                self.intents[index] = definition;
                true
            }
            None => {
                self.intents.push_back(definition);
                false
            }
        }
    }

    /// Removes the named definitions, returning how many were removed.
    pub fn drop_intents<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let before = self.intents.len();
        self.intents = self
            .intents
            .iter()
            .filter(|d| !names.iter().any(|n| n.as_ref() == d.name))
            .cloned()
            .collect();
        before - self.intents.len()
    }

    /// Removes a keyword entity type and any regex entity of the same name.
    ///
    /// Returns true if anything was removed.
    pub fn drop_entity(&mut self, entity_type: &str) -> bool {
        let keywords = self.index.remove_type(entity_type) > 0;
        let regexes = self.regexes.drop_type(entity_type);
        keywords || regexes
    }

    /// Removes the regex entities defining `entity_type`.
    ///
    /// Returns true if anything was removed.
    pub fn drop_regex(&mut self, entity_type: &str) -> bool {
        self.regexes.drop_type(entity_type)
    }
}
