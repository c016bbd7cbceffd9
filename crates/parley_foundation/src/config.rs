//! Configuration for the recognition pipeline.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunable search bounds and scoring weights.
///
/// These bound computation; exceeding them is never an error.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Longest token window probed against the entity index.
    pub max_window: usize,

    /// Maximum character edit distance for fuzzy keyword matches (0 = exact only).
    pub max_edit_distance: usize,

    /// Shortest window key (in characters) eligible for fuzzy matching.
    pub fuzzy_min_chars: usize,

    /// Confidence assigned to every regex entity match.
    pub regex_confidence: f64,

    /// Weight of optional entities relative to required ones.
    pub optional_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_window: 5,
            max_edit_distance: 1,
            fuzzy_min_chars: 4,
            regex_confidence: 0.9,
            optional_weight: 0.5,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration that only accepts exact keyword matches.
    #[must_use]
    pub fn exact() -> Self {
        Self {
            max_edit_distance: 0,
            ..Self::default()
        }
    }

    /// Builder method to set the maximum window length.
    #[must_use]
    pub fn with_max_window(mut self, max_window: usize) -> Self {
        self.max_window = max_window;
        self
    }

    /// Builder method to set the fuzzy edit distance threshold.
    #[must_use]
    pub fn with_max_edit_distance(mut self, distance: usize) -> Self {
        self.max_edit_distance = distance;
        self
    }

    /// Builder method to set the minimum key length for fuzzy matching.
    #[must_use]
    pub fn with_fuzzy_min_chars(mut self, chars: usize) -> Self {
        self.fuzzy_min_chars = chars;
        self
    }

    /// Builder method to set the regex match confidence.
    #[must_use]
    pub fn with_regex_confidence(mut self, confidence: f64) -> Self {
        self.regex_confidence = confidence;
        self
    }

    /// Builder method to set the optional entity weight.
    #[must_use]
    pub fn with_optional_weight(mut self, weight: f64) -> Self {
        self.optional_weight = weight;
        self
    }

    /// Returns true if a window key of `chars` characters may be matched fuzzily.
    #[must_use]
    pub fn allows_fuzzy(&self, chars: usize) -> bool {
        self.max_edit_distance > 0 && chars >= self.fuzzy_min_chars
    }

    /// Checks that every field is within range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the window is zero, the regex confidence is
    /// outside `(0, 1]`, or the optional weight is outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.max_window == 0 {
            return Err(Error::invalid_config("max_window must be at least 1"));
        }
        if !(self.regex_confidence > 0.0 && self.regex_confidence <= 1.0) {
            return Err(Error::invalid_config(format!(
                "regex_confidence must be in (0, 1], got {}",
                self.regex_confidence
            )));
        }
        if !(self.optional_weight > 0.0 && self.optional_weight <= 1.0) {
            return Err(Error::invalid_config(format!(
                "optional_weight must be in (0, 1], got {}",
                self.optional_weight
            )));
        }
        Ok(())
    }
}
