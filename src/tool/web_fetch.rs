use crate::fetch::{FetchResult, PageFetcher};
use crate::tool::base::{parse_params, Tool, ToolError, ToolResult};
use serde::Deserialize;
use serde_json::json;

/// fetch_url tool - fetch a page and return it as markdown
pub struct FetchUrlTool {
    fetcher: PageFetcher,
    default_timeout_secs: u64,
}

impl FetchUrlTool {
    pub fn new(fetcher: PageFetcher, default_timeout_secs: u64) -> Self {
        Self {
            fetcher,
            default_timeout_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FetchUrlParams {
    url: String,
    #[serde(default)]
    timeout: Option<u64>,
}

#[async_trait::async_trait]
impl Tool for FetchUrlTool {
    fn id(&self) -> &str {
        "fetch_url"
    }

    fn description(&self) -> &str {
        "Fetch content from a URL and convert the HTML to markdown. \
         Returns JSON with `url` (after redirects), `markdown_content`, \
         `status_code` and `content_length`, or `error` and `url` on failure \
         (including HTTP status 400 and above).\
         \n\n\
         Read the markdown and synthesize the relevant information; \
         do not show the raw markdown unless asked."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch (must be a valid HTTP/HTTPS URL)",
                    "format": "uri"
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
        let params: FetchUrlParams = parse_params(params)?;
        let url = params.url.trim();

        if url.is_empty() {
            return Err(ToolError::InvalidParams("url cannot be empty".into()));
        }

        let timeout = params.timeout.unwrap_or(self.default_timeout_secs).max(1);
        let result = self.fetcher.fetch(url, timeout).await;

        let tool_result = ToolResult::new(
            format!("Fetched {}", url),
            serde_json::to_string_pretty(&result)?,
        )
        .with_metadata("url", json!(result.url()));

        Ok(match &result {
            FetchResult::Success {
                status_code,
                content_length,
                ..
            } => tool_result
                .with_metadata("status_code", json!(status_code))
                .with_metadata("content_length", json!(content_length)),
            FetchResult::Failure { .. } => tool_result.with_metadata("error", json!(true)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::FetchConfig;

    #[tokio::test]
    async fn test_missing_url_is_invalid() {
        let tool = FetchUrlTool::new(PageFetcher::new(&FetchConfig::default()), 30);
        let result = tool.execute(json!({ "timeout": 5 })).await;
        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_unparseable_url_is_error_shaped() {
        let tool = FetchUrlTool::new(PageFetcher::new(&FetchConfig::default()), 30);
        let result = tool.execute(json!({ "url": "not-a-valid-url" })).await.unwrap();

        let output = result.output_json().unwrap();
        assert!(output["error"].as_str().unwrap().starts_with("Fetch URL error"));
        assert_eq!(output["url"], json!("not-a-valid-url"));
        assert!(output.get("markdown_content").is_none());
    }
}
