pub mod base;
pub mod http_request;
pub mod web_fetch;
pub mod web_search;

use crate::config::Config;
use crate::fetch::PageFetcher;
use crate::http::HttpExecutor;
use crate::search::{ProviderRegistry, SearchDispatcher};
use base::Tool;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool registry - manages all available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a registry with `web_search`, `fetch_url` and `http_request`.
    ///
    /// `providers` is the startup snapshot of usable search backends.
    pub fn new(config: &Config, providers: Arc<ProviderRegistry>) -> Self {
        let mut tools: HashMap<String, Arc<dyn Tool>> = HashMap::new();

        let dispatcher = SearchDispatcher::new(providers);
        tools.insert(
            "web_search".to_string(),
            Arc::new(web_search::WebSearchTool::new(
                dispatcher,
                config.search.default_max_results,
            )),
        );
        tools.insert(
            "fetch_url".to_string(),
            Arc::new(web_fetch::FetchUrlTool::new(
                PageFetcher::new(&config.fetch),
                config.fetch.timeout_secs,
            )),
        );
        tools.insert(
            "http_request".to_string(),
            Arc::new(http_request::HttpRequestTool::new(
                HttpExecutor::new(),
                config.http.timeout_secs,
            )),
        );

        Self { tools }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Tool definitions in the shape model APIs expect
    pub fn list_tool_definitions(&self) -> Vec<serde_json::Value> {
        let mut names = self.list_names();
        names.sort();
        names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                json!({
                    "name": tool.id(),
                    "description": tool.description(),
                    "input_schema": tool.input_schema(),
                })
            })
            .collect()
    }

    /// Get all tool names
    pub fn list_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}
