//! Entity tagging.
//!
//! Converts an utterance into a lattice of possibly-overlapping entity
//! candidates. No disambiguation happens here.

use std::collections::HashMap;
use std::sync::Arc;

use parley_foundation::{EngineConfig, EntityTag, TagSource, Utterance};
use parley_lexicon::{EntityIndex, IndexEntry, RegexRegistry};

/// The full candidate set for one utterance.
#[derive(Clone, Debug, Default)]
pub struct Lattice {
    tags: Vec<EntityTag>,
    token_count: usize,
}

impl Lattice {
    /// Builds a lattice from raw candidates.
    ///
    /// Duplicates of the same `(start, end, entity_type)` keep only the most
    /// confident. The result is sorted by start, then descending confidence,
    /// then longer span, then discovery order.
    #[must_use]
    pub fn new(candidates: Vec<EntityTag>, token_count: usize) -> Self {
        let mut best: HashMap<(usize, usize, Arc<str>), usize> = HashMap::new();
        let mut tags: Vec<EntityTag> = Vec::with_capacity(candidates.len());

        for tag in candidates {
            if tag.is_empty() || tag.end > token_count {
                continue;
            }
            let key = (tag.start, tag.end, Arc::clone(&tag.entity_type));
            match best.get(&key) {
                Some(&index) => {
                    if tag.confidence > tags[index].confidence {
                        tags[index] = tag;
                    }
                }
                None => {
                    best.insert(key, tags.len());
                    tags.push(tag);
                }
            }
        }

        // Stable sort keeps discovery order among equals
        tags.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| b.end.cmp(&a.end))
        });

        Self { tags, token_count }
    }

    /// Returns the candidate tags.
    #[must_use]
    pub fn tags(&self) -> &[EntityTag] {
        &self.tags
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the number of tokens in the tagged utterance.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Keeps only the candidates accepted by `keep`, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&EntityTag) -> bool) {
        self.tags.retain(keep);
    }

    /// Returns true if any candidate has the given entity type.
    #[must_use]
    pub fn contains_type(&self, entity_type: &str) -> bool {
        self.tags.iter().any(|t| &*t.entity_type == entity_type)
    }
}

/// Produces lattices from an entity index and a regex registry.
#[derive(Clone, Debug)]
pub struct EntityTagger {
    config: EngineConfig,
}

impl Default for EntityTagger {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl EntityTagger {
    /// Creates a tagger using the search bounds of `config`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Tags an utterance.
    #[must_use]
    pub fn tag(
        &self,
        utterance: &Utterance,
        index: &EntityIndex,
        regexes: &RegexRegistry,
    ) -> Lattice {
        if utterance.is_empty() {
            return Lattice::default();
        }

        let mut candidates = Vec::new();
        let token_count = utterance.token_count();

        for start in 0..token_count {
            let longest = self.config.max_window.max(1).min(token_count - start);
            for len in 1..=longest {
                let end = start + len;
                let key = utterance.window_key(start..end);
                let chars = key.chars().count();
                if self.config.allows_fuzzy(chars) {
                    for hit in index.lookup_fuzzy(&key, self.config.max_edit_distance) {
                        let confidence = hit.confidence(&key);
                        let source = if hit.distance == 0 {
                            TagSource::Keyword
                        } else {
                            TagSource::Fuzzy {
                                distance: hit.distance,
                            }
                        };
                        candidates.push(Self::keyword_tag(
                            utterance, &hit.entry, start, end, confidence, source,
                        ));
                    }
                } else {
                    for entry in index.lookup_exact(&key) {
                        candidates.push(Self::keyword_tag(
                            utterance,
                            &entry,
                            start,
                            end,
                            1.0,
                            TagSource::Keyword,
                        ));
                    }
                }

                // Stop growing once no longer key can match. A longer key
                // adds a space and at least one char.
                let distance = if self.config.allows_fuzzy(chars + 2) {
                    self.config.max_edit_distance
                } else {
                    0
                };
                if !index.has_extension(&format!("{key} "), distance) {
                    break;
                }
            }
        }

        candidates.extend(regexes.matches(utterance, self.config.regex_confidence));
        let lattice = Lattice::new(candidates, token_count);
        tracing::trace!(
            tokens = token_count,
            candidates = lattice.len(),
            "tagged utterance"
        );
        lattice
    }

    fn keyword_tag(
        utterance: &Utterance,
        entry: &IndexEntry,
        start: usize,
        end: usize,
        confidence: f64,
        source: TagSource,
    ) -> EntityTag {
        let chars = utterance.token_char_span(start..end).unwrap_or_default();
        EntityTag {
            entity_type: Arc::clone(&entry.entity_type),
            surface: utterance.span_text(start..end).to_string(),
            canonical: entry.canonical.to_string(),
            confidence,
            start,
            end,
            char_start: chars.start,
            char_end: chars.end,
            source,
        }
    }
}
