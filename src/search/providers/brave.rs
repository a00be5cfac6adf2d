use super::{build_client, ensure_success, read_json, str_field};
use crate::config::settings::SearchConfig;
use crate::search::{SearchError, SearchProvider, SearchQuery, SearchResultItem};
use std::time::Duration;

pub const NAME: &str = "brave";
pub const PRIORITY: i32 = 20;

/// Brave caps `count` at 20
const MAX_COUNT: usize = 20;

/// Brave Search API provider
///
/// Requires BRAVE_API_KEY. Free tier: 2000 requests/month.
/// Documentation: https://brave.com/search/api/
pub struct BraveSearchProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    timeout_secs: u64,
}

impl BraveSearchProvider {
    pub fn new(api_key: impl Into<String>, config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client(concat!("scout/", env!("CARGO_PKG_VERSION")))?,
            api_key: api_key.into(),
            endpoint: config.brave_endpoint.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Map `web.results[]` onto the unified schema
    fn parse_results(
        json: &serde_json::Value,
        max_results: usize,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        if !json.is_object() {
            return Err(SearchError::Parse("expected a JSON object".into()));
        }

        let Some(results) = json["web"]["results"].as_array() else {
            return Ok(Vec::new());
        };

        Ok(results
            .iter()
            .take(max_results)
            .map(|r| {
                SearchResultItem::new(
                    str_field(r, "title"),
                    str_field(r, "url"),
                    str_field(r, "description"),
                )
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl SearchProvider for BraveSearchProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn label(&self) -> &str {
        "Brave"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn probe(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResultItem>, SearchError> {
        tracing::debug!(
            query = %query.text,
            max_results = query.max_results,
            "performing brave search"
        );

        let count = query.max_results.min(MAX_COUNT).to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query.text.as_str()), ("count", count.as_str())])
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| SearchError::transport(e, self.timeout_secs))?;

        let response = ensure_success(response, NAME).await?;
        let json = read_json(response).await?;
        let items = Self::parse_results(&json, query.max_results)?;

        tracing::debug!(
            query = %query.text,
            result_count = items.len(),
            "brave search completed"
        );

        Ok(items)
    }
}
