//! Analysis gateway: the seam between the core and the external analysis
//! capability.
//!
//! The core only knows the `AnalysisGateway` trait. Two implementations:
//! - `GeminiGateway`: calls the Gemini `generateContent` REST API (production)
//! - `MockGateway`: returns scripted replies (testing)
//!
//! Every reply is checked against the `Assessment` shape before it leaves
//! the gateway. Nothing is retried here; retry policy belongs to callers.

mod gemini;
mod mock;
mod schema;

pub use gemini::{GeminiGateway, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use mock::MockGateway;
pub use schema::parse_assessment;

use crate::record::Assessment;
use async_trait::async_trait;

/// Errors from the analysis capability, normalized at the gateway boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("analysis provider unreachable: {0}")]
    Unreachable(String),
    #[error("analysis provider returned status {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("empty response from analysis provider")]
    EmptyResponse,
    #[error("malformed analysis response: {0}")]
    Malformed(String),
    #[error("analysis response violates schema: {0}")]
    SchemaViolation(String),
    #[error("analysis gateway misconfigured: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Whether the same request might succeed later without changes
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Provider { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyResponse | Self::Malformed(_) | Self::SchemaViolation(_) => false,
            Self::Configuration(_) => false,
        }
    }
}

/// The external analysis capability.
///
/// Abstracts over transport (HTTP provider, mock) so the orchestrator does
/// not depend on how an assessment is produced.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Produce an assessment for the given proposal text.
    ///
    /// Fails rather than returning a partially valid assessment.
    async fn infer(&self, content: &str) -> Result<Assessment, GatewayError>;
}
