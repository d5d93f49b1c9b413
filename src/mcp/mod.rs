//! MCP server for quorum. Exposes proposal analysis and history via the
//! Model Context Protocol.
//!
//! Tools: analyze_proposal, history, get_analysis.

pub mod params;

use crate::orchestrator::{AnalyzeError, Orchestrator};
use crate::storage::StorageError;
use crate::Config;
use params::*;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ok_json(value: &impl Serialize) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => Err(McpError::internal_error(e.to_string(), None)),
    }
}

fn err_json(body: Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(body.to_string())]))
}

/// Error body for a failed `analyze_proposal` call.
///
/// `error` tells "fix your input" (validation) apart from "try again later"
/// (analysis, when `retryable`) and internal failures.
pub(crate) fn analyze_error_body(err: &AnalyzeError) -> Value {
    json!({
        "error": err.kind(),
        "stage": err.stage(),
        "message": err.to_string(),
        "retryable": err.is_retryable(),
        "proposalId": err.saved_proposal_id(),
    })
}

fn storage_error_body(err: &StorageError) -> Value {
    json!({
        "error": "internal",
        "message": err.to_string(),
        "retryable": false,
    })
}

// ---------------------------------------------------------------------------
// QuorumMcpServer
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct QuorumMcpServer {
    orchestrator: Orchestrator,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl QuorumMcpServer {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Analyze a governance proposal and return a YES/NO vote recommendation with summary, reasoning and key details"
    )]
    async fn analyze_proposal(
        &self,
        Parameters(p): Parameters<AnalyzeProposalParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .orchestrator
            .analyze(&p.content, p.title.as_deref(), &p.user_id)
            .await
        {
            Ok(response) => ok_json(&response),
            Err(e) => err_json(analyze_error_body(&e)),
        }
    }

    #[tool(description = "List a user's completed analyses, newest first")]
    fn history(
        &self,
        Parameters(p): Parameters<HistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.orchestrator.history(&p.user_id) {
            Ok(entries) => ok_json(&entries),
            Err(e) => err_json(storage_error_body(&e)),
        }
    }

    #[tool(description = "Get the analysis for a proposal; analysis is null when none exists")]
    fn get_analysis(
        &self,
        Parameters(p): Parameters<GetAnalysisParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.orchestrator.get_analysis(p.proposal_id) {
            Ok(analysis) => ok_json(&json!({
                "proposalId": p.proposal_id,
                "analysis": analysis,
            })),
            Err(e) => err_json(storage_error_body(&e)),
        }
    }
}

#[tool_handler]
impl ServerHandler for QuorumMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "quorum MCP server: governance proposal analysis (vote recommendation, summary, key details) and per-user history"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run_mcp_server(config: &Config) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        let orchestrator = match config.build_orchestrator() {
            Ok(o) => o,
            Err(e) => {
                eprintln!("failed to set up analysis gateway: {}", e);
                return 1;
            }
        };

        let server = QuorumMcpServer::new(orchestrator);

        tracing::info!(model = %config.gateway.model, "quorum mcp server starting on stdio");

        let service = match server.serve(rmcp::transport::stdio()).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to start MCP server: {}", e);
                return 1;
            }
        };

        if let Err(e) = service.waiting().await {
            eprintln!("MCP server error: {}", e);
            return 1;
        }

        0
    })
}
