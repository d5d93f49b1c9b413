//! Analysis results and the structured assessment they carry

use super::proposal::Proposal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vote recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

/// Risk assessment of a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Categorized facts extracted from a proposal. All four fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDetails {
    /// Financial impact, e.g. "+500K TOKENS" or "No Impact"
    pub budget_impact: String,
    /// Time period, e.g. "3 Months" or "Ongoing"
    pub duration: String,
    pub risk_level: RiskLevel,
    /// Proposal type, e.g. "Funding" or "Governance"
    pub category: String,
}

/// What the analysis capability returns for one proposal text.
///
/// Only ever constructed from a response that passed shape validation in
/// [`crate::gateway`], or directly by callers and test doubles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub recommendation: Recommendation,
    pub reasoning: String,
    pub summary: String,
    pub key_details: KeyDetails,
}

/// A stored analysis, linked to exactly one proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: u64,
    pub proposal_id: u64,
    pub user_id: String,
    pub recommendation: Recommendation,
    pub reasoning: String,
    pub summary: String,
    pub key_details: KeyDetails,
    pub created_at: DateTime<Utc>,
}

/// Data for an analysis result that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnalysisResult {
    pub proposal_id: u64,
    pub user_id: String,
    pub assessment: Assessment,
}

impl NewAnalysisResult {
    /// Link an assessment to the proposal it was produced for
    pub fn for_proposal(proposal: &Proposal, assessment: Assessment) -> Self {
        Self {
            proposal_id: proposal.id,
            user_id: proposal.user_id.clone(),
            assessment,
        }
    }

    pub fn into_result(self, id: u64, created_at: DateTime<Utc>) -> AnalysisResult {
        let Assessment {
            recommendation,
            reasoning,
            summary,
            key_details,
        } = self.assessment;
        AnalysisResult {
            id,
            proposal_id: self.proposal_id,
            user_id: self.user_id,
            recommendation,
            reasoning,
            summary,
            key_details,
            created_at,
        }
    }
}

/// A proposal paired with its analysis, as returned to callers. Not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub proposal: Proposal,
    pub analysis: AnalysisResult,
}
