//! Lazy disambiguation of a lattice into non-overlapping taggings.
//!
//! The resolver runs a best-first search over "pick a tag starting here" or
//! "skip this token" decisions. Each state's priority is its accumulated
//! weight plus the exact best weight reachable from its position when
//! overlap constraints between earlier skips are ignored. That bound never
//! underestimates, so complete taggings leave the heap in non-increasing
//! order of weight and [`TaggingResolver::upper_bound`] caps every tagging
//! not yet produced.
//!
//! Only maximal taggings are produced: a tag may be left out only if it
//! overlaps a chosen one.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use im::Vector;
use parley_foundation::EntityTag;

use crate::tagger::Lattice;

/// Bonus per extra token of a chosen tag, so that one multi-token entity
/// outranks an equally-confident split into single tokens.
pub const SPAN_PREFERENCE: f64 = 1e-3;

/// A set of pairwise non-overlapping tags drawn from one lattice.
#[derive(Clone, Debug, PartialEq)]
pub struct Tagging {
    tags: Vec<EntityTag>,
    score: f64,
    token_count: usize,
}

impl Tagging {
    #[allow(clippy::cast_precision_loss)]
    fn new(tags: Vec<EntityTag>, token_count: usize) -> Self {
        let score = if token_count == 0 {
            0.0
        } else {
            tags.iter().map(EntityTag::coverage).sum::<f64>() / token_count as f64
        };
        Self {
            tags,
            score,
            token_count,
        }
    }

    /// Returns the chosen tags, ordered by start token.
    #[must_use]
    pub fn tags(&self) -> &[EntityTag] {
        &self.tags
    }

    /// Returns the confidence-weighted share of tokens covered, in `[0, 1]`.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the number of tokens in the tagged utterance.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Returns true if no tag was chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the chosen tags of one entity type.
    pub fn of_type<'a>(&'a self, entity_type: &'a str) -> impl Iterator<Item = &'a EntityTag> + 'a {
        self.tags
            .iter()
            .filter(move |t| &*t.entity_type == entity_type)
    }
}

impl fmt::Display for Tagging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{tag}")?;
        }
        write!(f, "] {:.3}", self.score)
    }
}

#[derive(Clone, Debug)]
struct SearchState {
    pos: usize,
    weight: f64,
    /// Earliest end among tags skipped since the last pick. Some tag must
    /// start before it or the skipped tag could still be added.
    deadline: Option<usize>,
    chosen: Vector<usize>,
}

#[derive(Debug)]
struct HeapEntry {
    priority: f64,
    seq: u64,
    state: SearchState,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Highest priority first, then first pushed
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Yields the taggings of a lattice, best first.
#[derive(Debug)]
pub struct TaggingResolver {
    lattice: Lattice,
    starting_at: Vec<Vec<usize>>,
    best_suffix: Vec<f64>,
    heap: BinaryHeap<HeapEntry>,
    next_seq: u64,
    produced: usize,
}

impl TaggingResolver {
    /// Prepares the search over `lattice`.
    #[must_use]
    pub fn new(lattice: Lattice) -> Self {
        let n = lattice.token_count();
        let mut starting_at = vec![Vec::new(); n];
        for (i, tag) in lattice.tags().iter().enumerate() {
            starting_at[tag.start].push(i);
        }

        let mut best_suffix = vec![0.0; n + 1];
        for pos in (0..n).rev() {
            let mut best = best_suffix[pos + 1];
            for &i in &starting_at[pos] {
                let tag = &lattice.tags()[i];
                best = f64::max(best, Self::weight(tag) + best_suffix[tag.end]);
            }
            best_suffix[pos] = best;
        }

        let mut resolver = Self {
            lattice,
            starting_at,
            best_suffix,
            heap: BinaryHeap::new(),
            next_seq: 0,
            produced: 0,
        };
        resolver.push(SearchState {
            pos: 0,
            weight: 0.0,
            deadline: None,
            chosen: Vector::new(),
        });
        resolver
    }

    /// Returns the lattice being resolved.
    #[must_use]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Returns how many taggings have been produced so far.
    #[must_use]
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Returns an upper bound on the score of every tagging not yet
    /// produced, or `None` once the search is exhausted.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn upper_bound(&self) -> Option<f64> {
        let top = self.heap.peek()?;
        let n = self.lattice.token_count();
        if n == 0 {
            return Some(0.0);
        }
        Some(top.priority / n as f64)
    }

    #[allow(clippy::cast_precision_loss)]
    fn weight(tag: &EntityTag) -> f64 {
        tag.coverage() + SPAN_PREFERENCE * (tag.len().saturating_sub(1)) as f64
    }

    fn push(&mut self, state: SearchState) {
        let priority = state.weight + self.best_suffix[state.pos];
        self.heap.push(HeapEntry {
            priority,
            seq: self.next_seq,
            state,
        });
        self.next_seq += 1;
    }

    fn expand(&mut self, state: &SearchState) {
        let pos = state.pos;
        let candidates = self.starting_at[pos].clone();

        for &i in &candidates {
            let tag = &self.lattice.tags()[i];
            let mut chosen = state.chosen.clone();
            chosen.push_back(i);
            let next = SearchState {
                pos: tag.end,
                weight: state.weight + Self::weight(tag),
                deadline: None,
                chosen,
            };
            self.push(next);
        }

        let earliest_end = candidates
            .iter()
            .map(|&i| self.lattice.tags()[i].end)
            .min();
        let deadline = match (state.deadline, earliest_end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if deadline.is_some_and(|d| d <= pos + 1) {
            // A skipped tag would end with nothing overlapping it
            return;
        }
        self.push(SearchState {
            pos: pos + 1,
            weight: state.weight,
            deadline,
            chosen: state.chosen.clone(),
        });
    }
}

impl Iterator for TaggingResolver {
    type Item = Tagging;

    fn next(&mut self) -> Option<Tagging> {
        while let Some(HeapEntry { state, .. }) = self.heap.pop() {
            if state.pos == self.lattice.token_count() {
                let tags = state
                    .chosen
                    .iter()
                    .map(|&i| self.lattice.tags()[i].clone())
                    .collect();
                self.produced += 1;
                return Some(Tagging::new(tags, self.lattice.token_count()));
            }
            self.expand(&state);
        }
        None
    }
}
