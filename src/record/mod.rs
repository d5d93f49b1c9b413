//! Core record types: proposals, analysis results, and their identifiers

mod analysis;
mod ids;
mod proposal;


pub use analysis::{
    AnalysisResponse, AnalysisResult, Assessment, KeyDetails, NewAnalysisResult, Recommendation,
    RiskLevel,
};
pub use ids::{EntityKind, IdGenerator};
pub use proposal::{NewProposal, Proposal};
