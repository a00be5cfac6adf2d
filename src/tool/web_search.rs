use crate::search::{SearchDispatcher, SearchQuery, Topic};
use crate::tool::base::{parse_params, Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Web search tool - runs the query through the provider fallback chain
pub struct WebSearchTool {
    dispatcher: SearchDispatcher,
    default_max_results: usize,
}

impl WebSearchTool {
    pub fn new(dispatcher: SearchDispatcher, default_max_results: usize) -> Self {
        Self {
            dispatcher,
            default_max_results: default_max_results.max(1),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchParams {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
    #[serde(default)]
    topic: Topic,
    #[serde(default)]
    include_raw_content: bool,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn id(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information and documentation. \
         Tries Tavily, then Serper, then Brave, then DuckDuckGo, and returns \
         the first provider's results.\
         \n\n\
         Returns JSON with `results` (each with title, url, content, score), \
         `query` and `provider`, or `error` and `query` when no provider could answer.\
         \n\n\
         After using this tool:\n\
         - Read the `content` field of each result\n\
         - Synthesize the relevant parts into a natural language answer\n\
         - Cite sources by page title or URL\n\
         - Never show the raw JSON to the user"
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "The search query (be specific and detailed)"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Number of results to return (default: 5)"
                },
                "topic": {
                    "type": "string",
                    "enum": ["general", "news", "finance"],
                    "description": "\"general\" for most queries, \"news\" for current events"
                },
                "include_raw_content": {
                    "type": "boolean",
                    "description": "Include full page content where supported (uses more tokens)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        let params: WebSearchParams = parse_params(params)?;

        if params.query.trim().is_empty() {
            return Err(ToolError::InvalidParams("query cannot be empty".into()));
        }
        if params.max_results == Some(0) {
            return Err(ToolError::InvalidParams("max_results must be at least 1".into()));
        }

        let query = SearchQuery::new(params.query.trim())
            .max_results(params.max_results.unwrap_or(self.default_max_results))
            .topic(params.topic)
            .include_raw(params.include_raw_content);

        let response = self
            .dispatcher
            .search(&query)
            .await
            .with_query(params.query.as_str());

        let mut result = ToolResult::new(
            format!("Web search: {}", query.text),
            serde_json::to_string_pretty(&response)?,
        )
        .with_metadata("query", json!(params.query))
        .with_metadata("num_results", json!(response.results().len()));

        result = match response.provider() {
            Some(provider) => result.with_metadata("provider", json!(provider)),
            None => result.with_metadata("error", json!(true)),
        };

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ProviderRegistry;
    use std::sync::Arc;

    fn tool() -> WebSearchTool {
        let dispatcher = SearchDispatcher::new(Arc::new(ProviderRegistry::empty()));
        WebSearchTool::new(dispatcher, 5)
    }

    #[tokio::test]
    async fn test_tool_validates_empty_query() {
        let result = tool().execute(json!({ "query": "   " })).await;
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[tokio::test]
    async fn test_tool_rejects_zero_results_and_unknown_topic() {
        let zero = tool().execute(json!({ "query": "q", "max_results": 0 })).await;
        assert!(matches!(zero, Err(ToolError::InvalidParams(_))));

        let topic = tool().execute(json!({ "query": "q", "topic": "sports" })).await;
        assert!(matches!(topic, Err(ToolError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_no_provider_is_a_result_not_an_error() {
        let result = tool()
            .execute(json!({ "query": "rust ownership model" }))
            .await
            .unwrap();

        let output = result.output_json().unwrap();
        assert!(output["error"]
            .as_str()
            .unwrap()
            .starts_with("No search provider available"));
        assert_eq!(output["query"], json!("rust ownership model"));
        assert_eq!(result.metadata.get("error"), Some(&json!(true)));
    }
}
