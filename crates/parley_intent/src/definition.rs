//! Intent definitions and their builder.

use std::collections::BTreeSet;
use std::fmt;

use parley_foundation::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An entity type bound to a named slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotRequirement {
    /// Entity type that fills the slot.
    pub entity_type: String,
    /// Slot name the bound entity is reported under.
    pub slot: String,
}

impl SlotRequirement {
    /// Creates a requirement whose slot is named after the entity type.
    #[must_use]
    pub fn new(entity_type: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        Self {
            slot: entity_type.clone(),
            entity_type,
        }
    }

    /// Creates a requirement with an explicit slot name.
    #[must_use]
    pub fn named(entity_type: impl Into<String>, slot: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            slot: slot.into(),
        }
    }
}

/// A named action and the entities that signal it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntentDefinition {
    /// Intent name, unique within a domain.
    pub name: String,
    /// Entities that must all be present.
    pub required: Vec<SlotRequirement>,
    /// Entities bound when present.
    #[cfg_attr(feature = "serde", serde(default))]
    pub optional: Vec<SlotRequirement>,
    /// Groups of entity types of which each needs at least one present.
    #[cfg_attr(feature = "serde", serde(default))]
    pub at_least_one: Vec<Vec<String>>,
    /// Entity types whose presence vetoes the intent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub excludes: Vec<String>,
}

impl IntentDefinition {
    /// Starts building a definition.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> IntentBuilder {
        IntentBuilder::new(name)
    }

    /// Returns every entity type the definition mentions.
    #[must_use]
    pub fn entity_types(&self) -> BTreeSet<&str> {
        self.required
            .iter()
            .chain(&self.optional)
            .map(|r| r.entity_type.as_str())
            .chain(self.at_least_one.iter().flatten().map(String::as_str))
            .chain(self.excludes.iter().map(String::as_str))
            .collect()
    }

    /// Checks that the definition is well formed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the name or any entity type is blank,
    /// a group is empty, two slots share a name, or a group member is the
    /// name of a slot bound to another type. Group bindings are reported
    /// under their entity type, so such a member could never be bound.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_argument("intent name must not be empty"));
        }

        let mut slots = BTreeSet::new();
        for requirement in self.required.iter().chain(&self.optional) {
            if requirement.entity_type.trim().is_empty() {
                return Err(Error::invalid_argument(format!(
                    "intent '{}' has an empty entity type",
                    self.name
                )));
            }
            if requirement.slot.trim().is_empty() {
                return Err(Error::invalid_argument(format!(
                    "intent '{}' has an empty slot name",
                    self.name
                )));
            }
            if !slots.insert(requirement.slot.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "intent '{}' uses slot '{}' twice",
                    self.name, requirement.slot
                )));
            }
        }

        for group in &self.at_least_one {
            if group.is_empty() {
                return Err(Error::invalid_argument(format!(
                    "intent '{}' has an empty one-of group",
                    self.name
                )));
            }
            if group.iter().any(|t| t.trim().is_empty()) {
                return Err(Error::invalid_argument(format!(
                    "intent '{}' has an empty entity type in a one-of group",
                    self.name
                )));
            }
            let renamed = self
                .required
                .iter()
                .chain(&self.optional)
                .find(|r| r.slot != r.entity_type && group.contains(&r.slot));
            if let Some(r) = renamed {
                return Err(Error::invalid_argument(format!(
                    "intent '{}' has one-of member '{}' which names the slot for '{}'",
                    self.name, r.slot, r.entity_type
                )));
            }
        }

        if self.excludes.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::invalid_argument(format!(
                "intent '{}' excludes an empty entity type",
                self.name
            )));
        }

        Ok(())
    }
}

impl fmt::Display for IntentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for r in &self.required {
            if r.slot == r.entity_type {
                write!(f, " +{}", r.entity_type)?;
            } else {
                write!(f, " +{}:{}", r.slot, r.entity_type)?;
            }
        }
        for r in &self.optional {
            if r.slot == r.entity_type {
                write!(f, " ?{}", r.entity_type)?;
            } else {
                write!(f, " ?{}:{}", r.slot, r.entity_type)?;
            }
        }
        for group in &self.at_least_one {
            write!(f, " ({})", group.join("|"))?;
        }
        for t in &self.excludes {
            write!(f, " !{t}")?;
        }
        Ok(())
    }
}

/// Builder for [`IntentDefinition`].
///
/// ```
/// use parley_intent::IntentBuilder;
///
/// let weather = IntentBuilder::new("WeatherIntent")
///     .require("Weather")
///     .optionally("Location")
///     .build()
///     .unwrap();
/// assert_eq!(weather.required.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct IntentBuilder {
    definition: IntentDefinition,
}

impl IntentBuilder {
    /// Starts a definition with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            definition: IntentDefinition {
                name: name.into(),
                required: Vec::new(),
                optional: Vec::new(),
                at_least_one: Vec::new(),
                excludes: Vec::new(),
            },
        }
    }

    /// Requires an entity, reported under its type name.
    #[must_use]
    pub fn require(mut self, entity_type: impl Into<String>) -> Self {
        self.definition
            .required
            .push(SlotRequirement::new(entity_type));
        self
    }

    /// Requires an entity, reported under `slot`.
    #[must_use]
    pub fn require_as(mut self, entity_type: impl Into<String>, slot: impl Into<String>) -> Self {
        self.definition
            .required
            .push(SlotRequirement::named(entity_type, slot));
        self
    }

    /// Binds an entity when present, reported under its type name.
    #[must_use]
    pub fn optionally(mut self, entity_type: impl Into<String>) -> Self {
        self.definition
            .optional
            .push(SlotRequirement::new(entity_type));
        self
    }

    /// Binds an entity when present, reported under `slot`.
    #[must_use]
    pub fn optionally_as(
        mut self,
        entity_type: impl Into<String>,
        slot: impl Into<String>,
    ) -> Self {
        self.definition
            .optional
            .push(SlotRequirement::named(entity_type, slot));
        self
    }

    /// Requires at least one entity among `entity_types`.
    #[must_use]
    pub fn one_of<I, S>(mut self, entity_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition
            .at_least_one
            .push(entity_types.into_iter().map(Into::into).collect());
        self
    }

    /// Rejects the intent whenever `entity_type` is present.
    #[must_use]
    pub fn exclude(mut self, entity_type: impl Into<String>) -> Self {
        self.definition.excludes.push(entity_type.into());
        self
    }

    /// Validates and returns the definition.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the definition is malformed; see
    /// [`IntentDefinition::validate`].
    pub fn build(self) -> Result<IntentDefinition> {
        self.definition.validate()?;
        Ok(self.definition)
    }
}
