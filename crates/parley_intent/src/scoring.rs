//! Matching intent definitions against taggings.
//!
//! Binding is greedy and deterministic: required slots first, in definition
//! order, then one-of groups, then optional slots. Each tag binds at most
//! one slot. Because a tagging is ordered by start and has no overlaps, the
//! first unused tag of a type is also the earliest-starting one.

use std::collections::BTreeMap;

use parley_foundation::{EngineConfig, EntityTag};
use parley_tagger::Tagging;

use crate::definition::IntentDefinition;
use crate::result::{IntentMatch, Slot};

/// Scores definitions against taggings.
#[derive(Clone, Copy, Debug)]
pub struct IntentScorer {
    optional_weight: f64,
}

impl Default for IntentScorer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl IntentScorer {
    /// Creates a scorer using the weights of `config`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            optional_weight: config.optional_weight,
        }
    }

    /// Returns the weight applied to optional slot coverage.
    #[must_use]
    pub fn optional_weight(&self) -> f64 {
        self.optional_weight
    }

    /// Matches `definition` against `tagging`.
    ///
    /// Returns `None` if an excluded type is present, or a required slot or
    /// one-of group cannot be bound.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, definition: &IntentDefinition, tagging: &Tagging) -> Option<IntentMatch> {
        let tags = tagging.tags();
        if tags
            .iter()
            .any(|t| definition.excludes.iter().any(|e| *e == *t.entity_type))
        {
            return None;
        }

        let mut used = vec![false; tags.len()];
        let mut slots = BTreeMap::new();
        let mut core = 0.0;
        let mut extra = 0.0;

        for requirement in &definition.required {
            let index = first_unused(tags, &used, |t| *t.entity_type == *requirement.entity_type)?;
            used[index] = true;
            core += tags[index].coverage();
            slots.insert(requirement.slot.clone(), Slot::from(&tags[index]));
        }

        for group in &definition.at_least_one {
            let index = first_unused(tags, &used, |t| {
                group.iter().any(|g| *g == *t.entity_type) && !slots.contains_key(&*t.entity_type)
            })?;
            used[index] = true;
            core += tags[index].coverage();
            slots.insert(tags[index].entity_type.to_string(), Slot::from(&tags[index]));
        }

        for requirement in &definition.optional {
            if slots.contains_key(&requirement.slot) {
                continue;
            }
            if let Some(index) =
                first_unused(tags, &used, |t| *t.entity_type == *requirement.entity_type)
            {
                used[index] = true;
                extra += tags[index].coverage();
                slots.insert(requirement.slot.clone(), Slot::from(&tags[index]));
            }
        }

        let confidence = if tagging.token_count() == 0 {
            0.0
        } else {
            (core + self.optional_weight * extra) / tagging.token_count() as f64
        };

        Some(IntentMatch {
            intent_type: definition.name.clone(),
            confidence: confidence.clamp(0.0, 1.0),
            slots,
        })
    }
}

fn first_unused(
    tags: &[EntityTag],
    used: &[bool],
    accepts: impl Fn(&EntityTag) -> bool,
) -> Option<usize> {
    tags.iter()
        .enumerate()
        .filter(|(i, t)| !used[*i] && accepts(t))
        .min_by(|(ia, a), (ib, b)| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| ia.cmp(ib))
        })
        .map(|(i, _)| i)
}
