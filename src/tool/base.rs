use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tool execution result handed back to the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Human-readable title/summary
    pub title: String,
    /// JSON-encoded result (search response, fetch result or HTTP outcome)
    pub output: String,
    /// Additional metadata (provider, status code, counts)
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    pub fn new(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            output: output.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Parse `output` back into JSON
    pub fn output_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.output)
    }
}

/// Tool execution errors.
///
/// Only malformed calls end up here; backend and network failures are
/// reported inside the result's `error` field.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Base tool trait - all tools must implement this
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool identifier (e.g., "web_search", "fetch_url")
    fn id(&self) -> &str;

    /// Human-readable description for the model
    fn description(&self) -> &str;

    /// JSON schema for tool parameters
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given parameters
    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError>;
}

/// Decode tool parameters, mapping serde errors to [`ToolError::InvalidParams`]
pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(
    params: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParams(e.to_string()))
}
