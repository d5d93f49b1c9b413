//! Gemini REST implementation of the analysis gateway

use super::{parse_assessment, AnalysisGateway, GatewayError};
use crate::config::GatewayConfig;
use crate::record::Assessment;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const INSTRUCTIONS: &str = "\
You are a DAO governance expert. Analyze the proposal below and provide:
1. A clear YES or NO voting recommendation
2. Brief reasoning for the recommendation (2-3 sentences)
3. A concise summary of the proposal (3-4 sentences)
4. Key details:
   - budgetImpact: financial impact (e.g. \"+500K TOKENS\", \"No Impact\", \"-100K USD\")
   - duration: time period (e.g. \"3 Months\", \"Ongoing\", \"One-time\")
   - riskLevel: exactly one of \"Low\", \"Medium\", \"High\"
   - category: proposal type (e.g. \"Funding\", \"Governance\", \"Technical\", \"Partnership\")

Respond with a single JSON object with the fields recommendation, reasoning, summary and
keyDetails { budgetImpact, duration, riskLevel, category }.";

/// Gateway that talks to the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiGateway {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiGateway {
    /// Creates a gateway with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Builds a gateway from configuration, resolving the API key.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            GatewayError::Configuration(format!(
                "no API key: set gateway.api_key or the {} environment variable",
                config.api_key_env
            ))
        })?;

        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Overrides the endpoint base URL (for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn request_body(content: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: format!("{INSTRUCTIONS}\n\nProposal:\n{content}"),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| GatewayError::Unreachable(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::Malformed(format!("Gemini response envelope: {err}")))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AnalysisGateway for GeminiGateway {
    async fn infer(&self, content: &str) -> Result<Assessment, GatewayError> {
        let started = Instant::now();
        let text = self.send_request(&Self::request_body(content)).await?;
        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gemini request completed"
        );
        parse_assessment(&text)
    }
}

/// Structured-output schema sent with every request.
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "recommendation": { "type": "STRING", "enum": ["YES", "NO"] },
            "reasoning": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "keyDetails": {
                "type": "OBJECT",
                "properties": {
                    "budgetImpact": { "type": "STRING" },
                    "duration": { "type": "STRING" },
                    "riskLevel": { "type": "STRING", "enum": ["Low", "Medium", "High"] },
                    "category": { "type": "STRING" }
                },
                "required": ["budgetImpact", "duration", "riskLevel", "category"]
            }
        },
        "required": ["recommendation", "reasoning", "summary", "keyDetails"]
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, GatewayError> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(GatewayError::EmptyResponse)
    } else {
        Ok(text)
    }
}

fn map_http_error(status: StatusCode, body: String) -> GatewayError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    GatewayError::Provider {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_model() {
        let gateway = GeminiGateway::new("k", "gemini-x").with_base_url("http://localhost:1/v1/");
        assert_eq!(
            gateway.endpoint(),
            "http://localhost:1/v1/gemini-x:generateContent"
        );
    }

    #[test]
    fn request_body_embeds_proposal_and_schema() {
        let body = serde_json::to_value(GeminiGateway::request_body("Fund 10k")).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.ends_with("Proposal:\nFund 10k"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["properties"]["recommendation"]["enum"],
            json!(["YES", "NO"])
        );
    }

    #[test]
    fn extracts_joined_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn missing_candidates_is_empty_response() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert_eq!(
            extract_text_response(response),
            Err(GatewayError::EmptyResponse)
        );
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            extract_text_response(response),
            Err(GatewayError::EmptyResponse)
        );
    }

    #[test]
    fn http_error_uses_provider_message() {
        let body = r#"{"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string());
        assert_eq!(
            err,
            GatewayError::Provider {
                status: 429,
                message: "RESOURCE_EXHAUSTED: quota exceeded".to_string()
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "nope".to_string());
        assert_eq!(
            err,
            GatewayError::Provider {
                status: 400,
                message: "nope".to_string()
            }
        );
    }

    #[test]
    fn from_config_requires_api_key() {
        let config = GatewayConfig {
            api_key: None,
            api_key_env: "QUORUM_TEST_UNSET_VARIABLE".into(),
            ..Default::default()
        };
        assert!(matches!(
            GeminiGateway::from_config(&config),
            Err(GatewayError::Configuration(_))
        ));
    }

    #[test]
    fn from_config_uses_configured_model() {
        let config = GatewayConfig {
            api_key: Some("k".into()),
            model: "gemini-2.5-pro".into(),
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        let gateway = GeminiGateway::from_config(&config).unwrap();
        assert_eq!(gateway.model(), "gemini-2.5-pro");
    }
}
