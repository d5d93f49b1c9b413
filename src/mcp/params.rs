//! MCP tool parameter structs with schemars-derived JSON schemas.

use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeProposalParams {
    #[schemars(description = "Full proposal text (at most 5000 characters)")]
    #[serde(default)]
    pub content: String,
    #[schemars(description = "Optional proposal title (truncated to 255 characters)")]
    pub title: Option<String>,
    #[schemars(description = "Opaque identifier of the submitting user")]
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    #[schemars(description = "User whose analysis history to list, newest first")]
    pub user_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetAnalysisParams {
    #[schemars(description = "The proposal ID")]
    pub proposal_id: u64,
}
