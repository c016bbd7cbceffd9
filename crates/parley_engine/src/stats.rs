//! Work counters.
//!
//! Counters are shared between an engine and the streams it creates, so the
//! amount of tagging and scoring a query actually performed is observable.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated by intent streams.
#[derive(Debug, Default)]
pub struct EngineStats {
    domains_tagged: AtomicU64,
    taggings_resolved: AtomicU64,
    scoring_invocations: AtomicU64,
}

impl EngineStats {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_domain_tagged(&self) {
        self.domains_tagged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tagging_resolved(&self) {
        self.taggings_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scoring(&self) {
        self.scoring_invocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            domains_tagged: self.domains_tagged.load(Ordering::Relaxed),
            taggings_resolved: self.taggings_resolved.load(Ordering::Relaxed),
            scoring_invocations: self.scoring_invocations.load(Ordering::Relaxed),
        }
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.domains_tagged.store(0, Ordering::Relaxed);
        self.taggings_resolved.store(0, Ordering::Relaxed);
        self.scoring_invocations.store(0, Ordering::Relaxed);
    }
}

/// Counter values at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Domains whose utterance lattice was built.
    pub domains_tagged: u64,
    /// Taggings pulled from resolvers.
    pub taggings_resolved: u64,
    /// Definition-against-tagging scoring calls.
    pub scoring_invocations: u64,
}

impl StatsSnapshot {
    /// Returns the per-counter difference from an earlier snapshot.
    #[must_use]
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            domains_tagged: self.domains_tagged.saturating_sub(earlier.domains_tagged),
            taggings_resolved: self
                .taggings_resolved
                .saturating_sub(earlier.taggings_resolved),
            scoring_invocations: self
                .scoring_invocations
                .saturating_sub(earlier.scoring_invocations),
        }
    }
}
