use super::{build_client, ensure_success, read_json, str_field};
use crate::config::settings::SearchConfig;
use crate::search::{SearchError, SearchProvider, SearchQuery, SearchResultItem, Topic};
use serde_json::json;
use std::time::Duration;

pub const NAME: &str = "serper";
pub const PRIORITY: i32 = 30;

/// Serper.dev (Google results). Requires SERPER_API_KEY.
///
/// `topic == news` goes to the news endpoint; everything else is a web search.
pub struct SerperProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout_secs: u64,
}

impl SerperProvider {
    pub fn new(api_key: impl Into<String>, config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client(concat!("scout/", env!("CARGO_PKG_VERSION")))?,
            api_key: api_key.into(),
            base_url: config.serper_base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Endpoint path and the response key holding the result list
    fn route(topic: Topic) -> (&'static str, &'static str) {
        match topic {
            Topic::News => ("/news", "news"),
            Topic::General | Topic::Finance => ("/search", "organic"),
        }
    }

    fn parse_results(
        json: &serde_json::Value,
        key: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        if !json.is_object() {
            return Err(SearchError::Parse("expected a JSON object".into()));
        }

        Ok(json[key]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .take(max_results)
                    .map(|r| {
                        SearchResultItem::new(
                            str_field(r, "title"),
                            str_field(r, "link"),
                            str_field(r, "snippet"),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl SearchProvider for SerperProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn label(&self) -> &str {
        "Serper"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn probe(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResultItem>, SearchError> {
        let (path, key) = Self::route(query.topic);
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(
            query = %query.text,
            max_results = query.max_results,
            endpoint = %url,
            "performing serper search"
        );

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query.text, "num": query.max_results }))
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| SearchError::transport(e, self.timeout_secs))?;

        let response = ensure_success(response, NAME).await?;
        let json = read_json(response).await?;
        let items = Self::parse_results(&json, key, query.max_results)?;

        tracing::debug!(query = %query.text, result_count = items.len(), "serper search completed");

        Ok(items)
    }
}
