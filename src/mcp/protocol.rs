//! MCP protocol response helpers.

use rmcp::model::{CallToolResult, Content};
use rmcp::schemars::{self, JsonSchema};
use rmcp::ErrorData as McpError;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// How list-style tool results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    /// Token-Oriented Object Notation, compact for tabular results.
    Toon,
}

/// A tool result plus the format the caller asked for.
///
/// ```ignore
/// Response::json(entry).into()
/// Response(ChangelogResult { entries, count }, params.format).into()
/// ```
pub struct Response<T>(pub T, pub Option<OutputFormat>);

impl<T: Serialize> Response<T> {
    pub fn json(data: T) -> Self {
        Response(data, None)
    }

    /// Renders the payload. TOON falls back to JSON if the value has no
    /// TOON encoding.
    fn into_content(self) -> Result<Content, McpError> {
        if self.1.unwrap_or_default() == OutputFormat::Toon {
            match serde_toon::to_string(&self.0) {
                Ok(toon) => return Ok(Content::text(toon)),
                Err(e) => tracing::warn!(error = %e, "TOON encoding failed, returning JSON"),
            }
        }
        let value = serde_json::to_value(&self.0).map_err(AppError::from)?;
        Content::json(value)
    }
}

impl<T: Serialize> From<Response<T>> for Result<CallToolResult, McpError> {
    fn from(response: Response<T>) -> Self {
        Ok(CallToolResult::success(vec![response.into_content()?]))
    }
}

/// Plain-text tool response.
pub fn text(message: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(message.into())]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn first_text(result: &CallToolResult) -> String {
        let value = serde_json::to_value(result).unwrap();
        value["content"][0]["text"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_json_response_is_raw_value() {
        let result: Result<CallToolResult, McpError> =
            Response::json(json!({"categories": ["npu"]})).into();
        let text = first_text(&result.unwrap());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"categories": ["npu"]}));
    }

    #[test]
    fn test_toon_response_is_text() {
        let result: Result<CallToolResult, McpError> =
            Response(json!({"count": 2}), Some(OutputFormat::Toon)).into();
        let text = first_text(&result.unwrap());
        assert!(text.contains("count"));
        assert!(!text.starts_with('{'));
    }
}
