use crate::http::{HttpExecutor, HttpRequest};
use crate::tool::base::{parse_params, Tool, ToolError, ToolResult};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

/// http_request tool - call an arbitrary API or web service
pub struct HttpRequestTool {
    executor: HttpExecutor,
    default_timeout_secs: u64,
}

impl HttpRequestTool {
    pub fn new(executor: HttpExecutor, default_timeout_secs: u64) -> Self {
        Self {
            executor,
            default_timeout_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HttpRequestParams {
    url: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    headers: Option<HashMap<String, String>>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    params: Option<HashMap<String, String>>,
    #[serde(default)]
    timeout: Option<u64>,
}

#[async_trait::async_trait]
impl Tool for HttpRequestTool {
    fn id(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Make HTTP requests to APIs and web services. \
         Returns JSON with `success`, `status_code`, `headers`, `content` \
         (parsed JSON when possible, otherwise text) and the final `url`. \
         Timeouts and connection failures come back with success=false and status_code=0."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "Target URL"},
                "method": {
                    "type": "string",
                    "description": "HTTP method (GET, POST, PUT, DELETE, etc.). Default: GET"
                },
                "headers": {
                    "type": "object",
                    "additionalProperties": {"type": "string"},
                    "description": "HTTP headers to include"
                },
                "data": {"description": "Request body, sent as JSON"},
                "params": {
                    "type": "object",
                    "additionalProperties": {"type": "string"},
                    "description": "URL query parameters"
                },
                "timeout": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Request timeout in seconds (default: 30)"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params: HttpRequestParams = parse_params(params)?;

        if params.url.trim().is_empty() {
            return Err(ToolError::InvalidParams("url cannot be empty".into()));
        }

        let mut request = HttpRequest::get(params.url.trim())
            .timeout_secs(params.timeout.unwrap_or(self.default_timeout_secs).max(1));
        if let Some(method) = params.method {
            request = request.method(method);
        }
        request.headers = params.headers;
        request.data = params.data;
        request.params = params.params;

        let outcome = self.executor.request(&request).await;

        Ok(ToolResult::new(
            format!("{} {}", request.method.to_uppercase(), request.url),
            serde_json::to_string_pretty(&outcome)?,
        )
        .with_metadata("success", json!(outcome.success))
        .with_metadata("status_code", json!(outcome.status_code)))
    }
}
