//! Identifier generation, one monotonically increasing counter per entity kind

use std::sync::atomic::{AtomicU64, Ordering};

/// The kinds of record that receive their own identifier sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Proposal,
    AnalysisResult,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proposal => write!(f, "proposal"),
            Self::AnalysisResult => write!(f, "analysis result"),
        }
    }
}

/// Hands out identifiers starting at 1 for each kind.
///
/// Counters only move forward and are never reset for the lifetime of the
/// generator. Durability across restarts is not provided; a persistent
/// backend would swap in a database sequence behind the same contract.
#[derive(Debug)]
pub struct IdGenerator {
    proposals: AtomicU64,
    analysis_results: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            proposals: AtomicU64::new(0),
            analysis_results: AtomicU64::new(0),
        }
    }

    fn counter(&self, kind: EntityKind) -> &AtomicU64 {
        match kind {
            EntityKind::Proposal => &self.proposals,
            EntityKind::AnalysisResult => &self.analysis_results,
        }
    }

    /// Allocate the next identifier for `kind`.
    ///
    /// Returns `None` once the identifier space is used up; the counter is
    /// left untouched in that case so no identifier is ever handed out twice.
    pub fn next(&self, kind: EntityKind) -> Option<u64> {
        self.counter(kind)
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()
            .map(|previous| previous + 1)
    }

    /// The most recently allocated identifier for `kind` (0 if none yet)
    pub fn last(&self, kind: EntityKind) -> u64 {
        self.counter(kind).load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn starting_after(kind: EntityKind, last: u64) -> Self {
        let ids = Self::new();
        ids.counter(kind).store(last, Ordering::SeqCst);
        ids
    }
}
