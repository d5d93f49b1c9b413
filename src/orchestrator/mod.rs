//! Orchestrator: the request-handling core.
//!
//! One `analyze` call walks a fixed pipeline:
//!
//! ```text
//! RECEIVED -> VALIDATED -> PROPOSAL_SAVED -> ANALYZED -> RESULT_SAVED -> RESPONDED
//! ```
//!
//! Any step may fail; the error carries the stage it failed at. The two
//! inserts are not a transaction: if analysis fails, the saved proposal
//! stays in the store without an analysis and is left out of history.

mod validation;

pub use validation::{validate, ValidationError, MAX_CONTENT_CHARS, MAX_TITLE_CHARS};

use crate::gateway::{AnalysisGateway, GatewayError};
use crate::record::{AnalysisResponse, AnalysisResult, NewAnalysisResult};
use crate::storage::{RecordStore, StorageError, StorageResult};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Pipeline stages of one `analyze` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Received,
    Validated,
    ProposalSaved,
    Analyzed,
    ResultSaved,
    Responded,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "RECEIVED",
            Self::Validated => "VALIDATED",
            Self::ProposalSaved => "PROPOSAL_SAVED",
            Self::Analyzed => "ANALYZED",
            Self::ResultSaved => "RESULT_SAVED",
            Self::Responded => "RESPONDED",
        };
        write!(f, "{}", name)
    }
}

/// Coarse classification for transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Fix the input and resubmit
    Validation,
    /// The analysis capability failed; see `AnalyzeError::is_retryable`
    Analysis,
    /// Storage failure inside the core
    Internal,
}

/// Terminal failure of an `analyze` call
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The proposal identified by `proposal_id` stays stored without analysis
    #[error("Analysis failed: {source}")]
    Gateway {
        proposal_id: u64,
        #[source]
        source: GatewayError,
    },

    #[error("Storage failure at {stage}: {source}")]
    Storage {
        stage: Stage,
        #[source]
        source: StorageError,
    },
}

impl AnalyzeError {
    /// The stage whose transition failed
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation(_) => Stage::Validated,
            Self::Gateway { .. } => Stage::Analyzed,
            Self::Storage { stage, .. } => *stage,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Gateway { .. } => ErrorKind::Analysis,
            Self::Storage { .. } => ErrorKind::Internal,
        }
    }

    /// Whether resubmitting unchanged input might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Gateway { source, .. } => source.is_retryable(),
            Self::Validation(_) | Self::Storage { .. } => false,
        }
    }

    /// The proposal left behind by this failure, if one was saved
    pub fn saved_proposal_id(&self) -> Option<u64> {
        match self {
            Self::Gateway { proposal_id, .. } => Some(*proposal_id),
            Self::Validation(_) | Self::Storage { .. } => None,
        }
    }
}

/// Validates submissions, stores records and delegates analysis.
///
/// Store and gateway are injected; the orchestrator holds no other state.
#[derive(Clone)]
pub struct Orchestrator {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn AnalysisGateway>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn RecordStore>, gateway: Arc<dyn AnalysisGateway>) -> Self {
        Self { store, gateway }
    }

    /// Validate, store and analyze one proposal.
    #[tracing::instrument(
        name = "analyze",
        skip_all,
        fields(user_id = %user_id, proposal_id = tracing::field::Empty)
    )]
    pub async fn analyze(
        &self,
        content: &str,
        title: Option<&str>,
        user_id: &str,
    ) -> Result<AnalysisResponse, AnalyzeError> {
        tracing::debug!(stage = %Stage::Received, chars = content.chars().count());

        let new_proposal = validate(content, title, user_id).inspect_err(|e| {
            tracing::debug!(stage = %Stage::Validated, error = %e, "rejected input");
        })?;
        tracing::debug!(stage = %Stage::Validated);

        let proposal = self
            .store
            .insert_proposal(new_proposal)
            .map_err(|source| AnalyzeError::Storage {
                stage: Stage::ProposalSaved,
                source,
            })?;
        tracing::Span::current().record("proposal_id", proposal.id);
        tracing::debug!(stage = %Stage::ProposalSaved);

        let assessment = match self.gateway.infer(&proposal.content).await {
            Ok(assessment) => assessment,
            Err(source) => {
                tracing::warn!(
                    stage = %Stage::Analyzed,
                    error = %source,
                    retryable = source.is_retryable(),
                    "analysis failed, proposal kept without analysis"
                );
                return Err(AnalyzeError::Gateway {
                    proposal_id: proposal.id,
                    source,
                });
            }
        };
        tracing::debug!(stage = %Stage::Analyzed, recommendation = %assessment.recommendation);

        let analysis = self
            .store
            .insert_analysis_result(NewAnalysisResult::for_proposal(&proposal, assessment))
            .map_err(|source| AnalyzeError::Storage {
                stage: Stage::ResultSaved,
                source,
            })?;
        tracing::debug!(stage = %Stage::ResultSaved, analysis_id = analysis.id);

        tracing::info!(
            stage = %Stage::Responded,
            analysis_id = analysis.id,
            recommendation = %analysis.recommendation,
            "proposal analyzed"
        );
        Ok(AnalysisResponse { proposal, analysis })
    }

    /// A user's completed analyses, newest first
    pub fn history(&self, user_id: &str) -> StorageResult<Vec<AnalysisResponse>> {
        self.store.analysis_results_by_user(user_id)
    }

    /// The analysis for a proposal; `None` when there is none
    pub fn get_analysis(&self, proposal_id: u64) -> StorageResult<Option<AnalysisResult>> {
        self.store.analysis_result_by_proposal(proposal_id)
    }
}
