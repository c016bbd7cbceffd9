//! Lazy, globally ranked intent results.
//!
//! Each domain gets a cursor that is untagged, active, or exhausted. A
//! cursor's bound is the best confidence it could still produce: 1.0 before
//! tagging, then the larger of its resolver's upper bound and its best
//! buffered result. Every pull works on the cursor with the highest bound,
//! so a result is only yielded once nothing anywhere can beat it.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;

use parley_foundation::Utterance;
use parley_intent::{IntentResult, IntentScorer};
use parley_tagger::{EntityTagger, TaggingResolver};

use crate::domain::Domain;
use crate::stats::EngineStats;

type ResultIdentity = (String, String, Vec<(String, String, String)>);

#[derive(Debug)]
struct Buffered {
    seq: u64,
    result: IntentResult,
}

impl PartialEq for Buffered {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Buffered {}

impl Ord for Buffered {
    fn cmp(&self, other: &Self) -> Ordering {
        self.result
            .confidence
            .total_cmp(&other.result.confidence)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Buffered {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
enum Phase {
    Untagged,
    Active(Box<TaggingResolver>),
    Exhausted,
}

#[derive(Debug)]
struct Cursor {
    domain: Domain,
    phase: Phase,
    buffer: BinaryHeap<Buffered>,
}

impl Cursor {
    fn new(domain: Domain) -> Self {
        let phase = if domain.intent_count() == 0 {
            Phase::Exhausted
        } else {
            Phase::Untagged
        };
        Self {
            domain,
            phase,
            buffer: BinaryHeap::new(),
        }
    }

    /// Best confidence the unexplored part of this domain could reach.
    fn pending_bound(&self) -> Option<f64> {
        match &self.phase {
            Phase::Untagged => Some(1.0),
            Phase::Active(resolver) => resolver.upper_bound().filter(|b| *b > 0.0),
            Phase::Exhausted => None,
        }
    }

    fn best_buffered(&self) -> Option<f64> {
        self.buffer.peek().map(|b| b.result.confidence)
    }

    fn bound(&self) -> Option<f64> {
        match (self.pending_bound(), self.best_buffered()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}

/// An iterator over intent results in non-increasing confidence order.
///
/// Created by [`IntentEngine::determine_intent`](crate::IntentEngine::determine_intent).
/// The stream works on a snapshot of the registry taken at creation, and
/// performs only the tagging and scoring needed for the results pulled.
#[derive(Debug)]
pub struct IntentStream {
    utterance: Utterance,
    tagger: EntityTagger,
    scorer: IntentScorer,
    cursors: Vec<Cursor>,
    seen: HashSet<ResultIdentity>,
    remaining: usize,
    next_seq: u64,
    stats: Arc<EngineStats>,
}

impl IntentStream {
    pub(crate) fn new(
        utterance: Utterance,
        domains: Vec<Domain>,
        tagger: EntityTagger,
        scorer: IntentScorer,
        num_results: usize,
        stats: Arc<EngineStats>,
    ) -> Self {
        Self {
            utterance,
            tagger,
            scorer,
            cursors: domains.into_iter().map(Cursor::new).collect(),
            seen: HashSet::new(),
            remaining: num_results,
            next_seq: 0,
            stats,
        }
    }

    /// Returns the tokenized utterance being interpreted.
    #[must_use]
    pub fn utterance(&self) -> &Utterance {
        &self.utterance
    }

    /// Returns how many more results may be yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Index of the cursor with the highest bound; ties go to the earliest.
    fn leading_cursor(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, cursor) in self.cursors.iter().enumerate() {
            if let Some(bound) = cursor.bound() {
                if best.is_none_or(|(_, b)| bound > b) {
                    best = Some((i, bound));
                }
            }
        }
        best.map(|(i, _)| i)
    }

    fn advance(&mut self, index: usize) {
        let cursor = &mut self.cursors[index];
        match &mut cursor.phase {
            Phase::Untagged => {
                let mut lattice =
                    self.tagger
                        .tag(&self.utterance, cursor.domain.index(), cursor.domain.regexes());
                let relevant = cursor.domain.referenced_types();
                lattice.retain(|tag| relevant.contains(&*tag.entity_type));
                self.stats.record_domain_tagged();
                tracing::trace!(
                    domain = cursor.domain.name(),
                    candidates = lattice.len(),
                    "tagged domain"
                );
                cursor.phase = Phase::Active(Box::new(TaggingResolver::new(lattice)));
            }
            Phase::Active(resolver) => {
                let Some(tagging) = resolver.next() else {
                    cursor.phase = Phase::Exhausted;
                    return;
                };
                self.stats.record_tagging_resolved();
                for definition in cursor.domain.intents() {
                    self.stats.record_scoring();
                    let Some(matched) = self.scorer.score(definition, &tagging) else {
                        continue;
                    };
                    if matched.confidence <= 0.0 {
                        continue;
                    }
                    let result = IntentResult::new(matched, cursor.domain.name(), &self.utterance);
                    cursor.buffer.push(Buffered {
                        seq: self.next_seq,
                        result,
                    });
                    self.next_seq += 1;
                }
                if resolver.upper_bound().is_none_or(|b| b <= 0.0) {
                    cursor.phase = Phase::Exhausted;
                }
            }
            Phase::Exhausted => {}
        }
    }
}

impl Iterator for IntentStream {
    type Item = IntentResult;

    fn next(&mut self) -> Option<IntentResult> {
        while self.remaining > 0 {
            let Some(index) = self.leading_cursor() else {
                tracing::trace!(utterance = self.utterance.text(), "intent stream exhausted");
                self.remaining = 0;
                return None;
            };

            let cursor = &mut self.cursors[index];
            let ready = match (cursor.best_buffered(), cursor.pending_bound()) {
                (Some(best), Some(pending)) => best >= pending,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !ready {
                self.advance(index);
                continue;
            }

            let Some(Buffered { result, .. }) = cursor.buffer.pop() else {
                continue;
            };
            if self.seen.insert(result.identity()) {
                self.remaining -= 1;
                return Some(result);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl std::iter::FusedIterator for IntentStream {}
