//! Regex entity registry.
//!
//! Each pattern defines one entity type per named capture group. Patterns
//! run against the raw utterance text; capture spans are mapped back to the
//! smallest enclosing token range.

use std::collections::BTreeSet;
use std::sync::Arc;

use im::Vector;
use parley_foundation::{EntityTag, Error, Result, TagSource, Utterance};
use regex::Regex;

/// A compiled regex entity.
#[derive(Clone, Debug)]
pub struct RegexEntity {
    source: Arc<str>,
    regex: Regex,
    entity_types: BTreeSet<String>,
}

impl RegexEntity {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the pattern does not compile.
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
        let entity_types = regex
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(Self {
            source: Arc::from(pattern),
            regex,
            entity_types,
        })
    }

    /// Returns the pattern source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the entity types defined by the named captures.
    #[must_use]
    pub fn entity_types(&self) -> &BTreeSet<String> {
        &self.entity_types
    }

    /// Returns true if this pattern defines `entity_type`.
    #[must_use]
    pub fn defines(&self, entity_type: &str) -> bool {
        self.entity_types.contains(entity_type)
    }

    /// Collects a tag for every non-empty named capture in `utterance`.
    fn tags(&self, utterance: &Utterance, confidence: f64, out: &mut Vec<EntityTag>) {
        for captures in self.regex.captures_iter(utterance.text()) {
            for name in self.regex.capture_names().flatten() {
                let Some(group) = captures.name(name) else {
                    continue;
                };
                if group.as_str().trim().is_empty() {
                    continue;
                }
                let char_start = utterance.byte_to_char(group.start());
                let char_end = utterance.byte_to_char(group.end());
                let Some(tokens) = utterance.enclosing_tokens(char_start..char_end) else {
                    continue;
                };
                out.push(EntityTag {
                    entity_type: Arc::from(name),
                    surface: group.as_str().to_string(),
                    canonical: group.as_str().to_string(),
                    confidence,
                    start: tokens.start,
                    end: tokens.end,
                    char_start,
                    char_end,
                    source: TagSource::Regex,
                });
            }
        }
    }
}

/// Regex entities registered for one domain.
#[derive(Clone, Debug, Default)]
pub struct RegexRegistry {
    patterns: Vector<Arc<RegexEntity>>,
}

impl RegexRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if no pattern is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Compiles and registers a pattern, returning the entity types it defines.
    ///
    /// Registering an identical pattern string again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the pattern does not compile.
    pub fn register(&mut self, pattern: &str) -> Result<BTreeSet<String>> {
        if let Some(existing) = self.patterns.iter().find(|p| p.source() == pattern) {
            return Ok(existing.entity_types().clone());
        }
        let entity = RegexEntity::compile(pattern)?;
        let types = entity.entity_types().clone();
        self.patterns.push_back(Arc::new(entity));
        Ok(types)
    }

    /// Runs every pattern against the utterance.
    #[must_use]
    pub fn matches(&self, utterance: &Utterance, confidence: f64) -> Vec<EntityTag> {
        let mut tags = Vec::new();
        for pattern in &self.patterns {
            pattern.tags(utterance, confidence, &mut tags);
        }
        tags
    }

    /// Removes every pattern defining `entity_type`.
    ///
    /// Returns false if no pattern defined it.
    pub fn drop_type(&mut self, entity_type: &str) -> bool {
        let before = self.patterns.len();
        self.patterns = self
            .patterns
            .iter()
            .filter(|p| !p.defines(entity_type))
            .cloned()
            .collect();
        self.patterns.len() != before
    }

    /// Returns the registered pattern sources in registration order.
    #[must_use]
    pub fn patterns(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.source().to_string()).collect()
    }

    /// Returns every entity type defined by a registered pattern.
    #[must_use]
    pub fn entity_types(&self) -> BTreeSet<String> {
        self.patterns
            .iter()
            .flat_map(|p| p.entity_types().iter().cloned())
            .collect()
    }
}
