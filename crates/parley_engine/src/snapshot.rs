//! Plain-data copies of the registry, for persistence.
//!
//! Restoring a snapshot re-validates every definition and recompiles every
//! pattern, so a hand-edited or corrupted snapshot cannot bypass the checks
//! applied at registration.

use std::sync::Arc;

use im::Vector;
use parley_foundation::{EngineConfig, ErrorContext, Result, Tokenizer};
use parley_intent::IntentDefinition;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_DOMAIN, Domain};
use crate::engine::{EngineState, IntentEngine};

/// One indexed keyword association.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityRecord {
    /// Normalized surface key.
    pub surface: String,
    /// Entity type.
    pub entity_type: String,
    /// Canonical value.
    pub canonical: String,
}

/// Everything registered in one domain.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DomainSnapshot {
    /// Domain name.
    pub name: String,
    /// Keyword entities in registration order.
    pub entities: Vec<EntityRecord>,
    /// Regex entity patterns in registration order.
    pub regex_patterns: Vec<String>,
    /// Intent definitions in registration order.
    pub intents: Vec<IntentDefinition>,
}

impl DomainSnapshot {
    fn capture(domain: &Domain) -> Self {
        Self {
            name: domain.name().to_string(),
            entities: domain
                .index()
                .entries()
                .into_iter()
                .map(|(surface, entry)| EntityRecord {
                    surface,
                    entity_type: entry.entity_type.to_string(),
                    canonical: entry.canonical.to_string(),
                })
                .collect(),
            regex_patterns: domain.regexes().patterns(),
            intents: domain.intents().cloned().collect(),
        }
    }

    fn restore(&self) -> Result<Domain> {
        let context = || {
            ErrorContext::new()
                .with_domain(&self.name)
                .with_operation("restore snapshot")
        };
        let mut domain = Domain::new(&self.name);
        for record in &self.entities {
            domain.register_entity(&record.surface, &record.entity_type, &record.canonical);
        }
        for pattern in &self.regex_patterns {
            domain
                .register_regex(pattern)
                .map_err(|e| e.with_context(context()))?;
        }
        for intent in &self.intents {
            intent.validate().map_err(|e| e.with_context(context()))?;
            domain.register_intent(intent.clone());
        }
        Ok(domain)
    }
}

/// The whole registry and its configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineSnapshot {
    /// Engine configuration.
    pub config: EngineConfig,
    /// Domains in registration order.
    pub domains: Vec<DomainSnapshot>,
}

impl EngineSnapshot {
    /// Returns the snapshot of the named domain.
    #[must_use]
    pub fn domain(&self, name: &str) -> Option<&DomainSnapshot> {
        self.domains.iter().find(|d| d.name == name)
    }
}

impl IntentEngine {
    /// Captures everything registered, as plain data.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.state();
        EngineSnapshot {
            config: self.config().clone(),
            domains: state.domains.iter().map(DomainSnapshot::capture).collect(),
        }
    }

    /// Rebuilds an engine from a snapshot.
    ///
    /// The default domain is created if the snapshot lacks it. Domains with
    /// the same name are merged.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig`, `InvalidPattern`, or `InvalidArgument` if any
    /// part of the snapshot fails validation.
    pub fn from_snapshot(snapshot: &EngineSnapshot, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        snapshot.config.validate()?;

        let mut domains: Vector<Domain> = Vector::new();
        if snapshot.domain(DEFAULT_DOMAIN).is_none() {
            domains.push_back(Domain::new(DEFAULT_DOMAIN));
        }
        for saved in &snapshot.domains {
            let restored = saved.restore()?;
            match domains.iter().position(|d| d.name() == saved.name) {
                Some(index) => {
                    let existing = &mut domains[index];
                    for record in &saved.entities {
                        existing.register_entity(&record.surface, &record.entity_type, &record.canonical);
                    }
                    for pattern in &saved.regex_patterns {
                        existing.register_regex(pattern)?;
                    }
                    for intent in restored.intents() {
                        existing.register_intent(intent.clone());
                    }
                }
                None => domains.push_back(restored),
            }
        }

        tracing::debug!(domains = domains.len(), "restored engine from snapshot");
        Ok(Self::from_state(
            EngineState { domains },
            snapshot.config.clone(),
            tokenizer,
        ))
    }
}
