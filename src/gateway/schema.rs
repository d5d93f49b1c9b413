//! Validation of raw provider output against the `Assessment` shape

use super::GatewayError;
use crate::record::Assessment;

/// Strip a surrounding markdown code fence, if there is one.
///
/// Models sometimes wrap JSON in ```json ... ``` even when asked not to.
/// Anything else around the payload is left alone and will fail to parse.
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.strip_suffix("```") {
        Some(body) => body.trim(),
        None => trimmed,
    }
}

/// Parse provider text into an `Assessment`.
///
/// Rejects text that is not a JSON object (`Malformed`), and objects with a
/// missing field, an out-of-enum `recommendation` or `riskLevel`, or blank
/// `reasoning`/`summary` (`SchemaViolation`). Values are never coerced.
pub fn parse_assessment(raw: &str) -> Result<Assessment, GatewayError> {
    let body = strip_fence(raw);
    if body.is_empty() {
        return Err(GatewayError::EmptyResponse);
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(GatewayError::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    let assessment: Assessment = serde_json::from_value(value)
        .map_err(|e| GatewayError::SchemaViolation(e.to_string()))?;

    if assessment.reasoning.trim().is_empty() {
        return Err(GatewayError::SchemaViolation("reasoning is empty".into()));
    }
    if assessment.summary.trim().is_empty() {
        return Err(GatewayError::SchemaViolation("summary is empty".into()));
    }

    Ok(assessment)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
