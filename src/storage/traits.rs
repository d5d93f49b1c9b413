//! Storage trait definitions

use crate::record::{
    AnalysisResponse, AnalysisResult, EntityKind, NewAnalysisResult, NewProposal, Proposal,
};
use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// Neither variant is recoverable inside the core: both surface to the
/// caller as internal errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage exhausted for {kind} records (limit {limit})")]
    Exhausted { kind: EntityKind, limit: u64 },

    #[error("Storage lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record storage backends
///
/// Implementations must be thread-safe (Send + Sync): requests are served
/// concurrently. Identifier allocation and insertion must be atomic with
/// respect to each other per entity kind. Reads may observe a snapshot that
/// is already stale.
pub trait RecordStore: Send + Sync {
    // === Writes ===

    /// Store a proposal, assigning its id and `created_at`
    fn insert_proposal(&self, data: NewProposal) -> StorageResult<Proposal>;

    /// Store an analysis result, assigning its id and `created_at`
    fn insert_analysis_result(&self, data: NewAnalysisResult) -> StorageResult<AnalysisResult>;

    // === Reads ===

    /// Load a proposal by id
    fn proposal(&self, id: u64) -> StorageResult<Option<Proposal>>;

    /// All proposals owned by `user_id`, newest first, ties broken by descending id
    fn proposals_by_user(&self, user_id: &str) -> StorageResult<Vec<Proposal>>;

    /// The first analysis result linked to `proposal_id`, if any
    fn analysis_result_by_proposal(&self, proposal_id: u64)
        -> StorageResult<Option<AnalysisResult>>;

    /// A user's completed analyses, newest analysis first.
    ///
    /// Proposals whose analysis never completed are left out. Ties on
    /// `created_at` are broken by descending analysis id.
    fn analysis_results_by_user(&self, user_id: &str) -> StorageResult<Vec<AnalysisResponse>> {
        let mut pairs = Vec::new();
        for proposal in self.proposals_by_user(user_id)? {
            if let Some(analysis) = self.analysis_result_by_proposal(proposal.id)? {
                pairs.push(AnalysisResponse { proposal, analysis });
            }
        }
        pairs.sort_by(|a, b| {
            b.analysis
                .created_at
                .cmp(&a.analysis.created_at)
                .then_with(|| b.analysis.id.cmp(&a.analysis.id))
        });
        Ok(pairs)
    }
}
