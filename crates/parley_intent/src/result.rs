//! Scored intent matches.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use parley_foundation::{EntityTag, Utterance};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An entity bound to a slot of an intent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Slot {
    /// Entity type of the bound tag.
    pub entity_type: String,
    /// Utterance text the tag covers.
    pub value: String,
    /// Canonical value the text stands for.
    pub canonical: String,
    /// Tag confidence.
    pub confidence: f64,
    /// Character offset where the value starts.
    pub start: usize,
    /// Character offset where the value ends.
    pub end: usize,
}

impl Slot {
    /// Returns the character range of the value.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<&EntityTag> for Slot {
    fn from(tag: &EntityTag) -> Self {
        Self {
            entity_type: tag.entity_type.to_string(),
            value: tag.surface.clone(),
            canonical: tag.canonical.clone(),
            confidence: tag.confidence,
            start: tag.char_start,
            end: tag.char_end,
        }
    }
}

/// The outcome of scoring one definition against one tagging.
#[derive(Clone, Debug, PartialEq)]
pub struct IntentMatch {
    /// Matched intent name.
    pub intent_type: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Bound slots by name.
    pub slots: BTreeMap<String, Slot>,
}

/// A ranked interpretation of an utterance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntentResult {
    /// Matched intent name.
    pub intent_type: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Domain whose definition matched.
    pub domain: String,
    /// Bound slots by name.
    pub slots: BTreeMap<String, Slot>,
    /// The full utterance.
    pub utterance: String,
    /// The utterance with every bound value removed.
    pub remainder: String,
}

impl IntentResult {
    /// Attaches utterance context to a match.
    #[must_use]
    pub fn new(matched: IntentMatch, domain: impl Into<String>, utterance: &Utterance) -> Self {
        let spans: Vec<Range<usize>> = matched.slots.values().map(Slot::span).collect();
        Self {
            intent_type: matched.intent_type,
            confidence: matched.confidence,
            domain: domain.into(),
            remainder: utterance.remainder(&spans),
            slots: matched.slots,
            utterance: utterance.text().to_string(),
        }
    }

    /// Returns the slot with the given name.
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<&Slot> {
        self.slots.get(slot)
    }

    /// Returns the value bound to the given slot.
    #[must_use]
    pub fn value(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(|s| s.value.as_str())
    }

    /// Returns the identity used to deduplicate results: domain, intent,
    /// and the value of every slot.
    #[must_use]
    pub fn identity(&self) -> (String, String, Vec<(String, String, String)>) {
        (
            self.domain.clone(),
            self.intent_type.clone(),
            self.slots
                .iter()
                .map(|(name, slot)| (name.clone(), slot.entity_type.clone(), slot.value.to_lowercase()))
                .collect(),
        )
    }
}

impl fmt::Display for IntentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.3}) [{}]",
            self.intent_type, self.confidence, self.domain
        )?;
        for (name, slot) in &self.slots {
            write!(f, " {name}={:?}", slot.value)?;
            if slot.canonical != slot.value {
                write!(f, "->{:?}", slot.canonical)?;
            }
        }
        if !self.remainder.is_empty() {
            write!(f, " | {:?}", self.remainder)?;
        }
        Ok(())
    }
}
