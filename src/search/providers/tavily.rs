use super::{build_client, ensure_success, read_json, str_field};
use crate::config::settings::SearchConfig;
use crate::search::{SearchError, SearchProvider, SearchQuery, SearchResultItem};
use serde_json::json;
use std::time::Duration;

pub const NAME: &str = "tavily";
pub const PRIORITY: i32 = 40;

/// Tavily search API, the highest quality backend
///
/// Requires TAVILY_API_KEY. Honors `topic` and `include_raw`, and returns
/// native relevance scores.
pub struct TavilyProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    timeout_secs: u64,
}

impl TavilyProvider {
    pub fn new(api_key: impl Into<String>, config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client(concat!("scout/", env!("CARGO_PKG_VERSION")))?,
            api_key: api_key.into(),
            endpoint: config.tavily_endpoint.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn parse_results(
        json: &serde_json::Value,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResultItem>, SearchError> {
        if !json.is_object() {
            return Err(SearchError::Parse("expected a JSON object".into()));
        }

        let Some(results) = json["results"].as_array() else {
            return Ok(Vec::new());
        };

        Ok(results
            .iter()
            .take(query.max_results)
            .map(|r| {
                let raw = if query.include_raw {
                    r["raw_content"].as_str().map(str::to_string)
                } else {
                    None
                };

                SearchResultItem::new(
                    str_field(r, "title"),
                    str_field(r, "url"),
                    str_field(r, "content"),
                )
                .with_score(r["score"].as_f64())
                .with_raw_content(raw)
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn label(&self) -> &str {
        "Tavily"
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
            topic = %query.topic,
            include_raw = query.include_raw,
            "performing tavily search"
        );

        let body = json!({
            "query": query.text,
            "max_results": query.max_results,
            "topic": query.topic.as_str(),
            "include_raw_content": query.include_raw,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| SearchError::transport(e, self.timeout_secs))?;

        let response = ensure_success(response, NAME).await?;
        let json = read_json(response).await?;
        let items = Self::parse_results(&json, query)?;

        tracing::debug!(query = %query.text, result_count = items.len(), "tavily search completed");

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Topic;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> TavilyProvider {
        TavilyProvider::new("tvly-test-key", &SearchConfig::default())
            .unwrap()
            .with_endpoint(format!("{}/search", server.uri()))
    }

    #[test]
    fn test_parse_results_keeps_scores_in_range() {
        let json = json!({
            "query": "q",
            "results": [
                {"title": "A", "url": "https://a.example", "content": "alpha", "score": 0.83},
                {"title": "B", "url": "https://b.example", "content": "beta", "score": 3.5},
                {"title": "C", "url": "https://c.example"}
            ]
        });

        let items = TavilyProvider::parse_results(&json, &SearchQuery::new("q")).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].score, 0.83);
        assert_eq!(items[1].score, 1.0);
        assert_eq!(items[2].score, 1.0);
        assert_eq!(items[2].content, "");
    }

    #[test]
    fn test_raw_content_only_when_requested() {
        let json = json!({"results": [
            {"title": "A", "url": "https://a.example", "content": "alpha", "raw_content": "full text"}
        ]});

        let plain = TavilyProvider::parse_results(&json, &SearchQuery::new("q")).unwrap();
        assert!(plain[0].raw_content.is_none());

        let raw =
            TavilyProvider::parse_results(&json, &SearchQuery::new("q").include_raw(true)).unwrap();
        assert_eq!(raw[0].raw_content.as_deref(), Some("full text"));
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        let err =
            TavilyProvider::parse_results(&json!([1, 2]), &SearchQuery::new("q")).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_search_forwards_topic_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("Authorization", "Bearer tvly-test-key"))
            .and(body_partial_json(json!({
                "query": "fed rate decision",
                "max_results": 2,
                "topic": "news",
                "include_raw_content": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"title": "A", "url": "https://a.example", "content": "alpha", "score": 0.9}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = SearchQuery::new("fed rate decision").max_results(2).topic(Topic::News);
        let response = provider(&server).query(&query).await;

        assert_eq!(response.provider(), Some("tavily"));
        assert_eq!(response.results().len(), 1);
        assert_eq!(response.results()[0].score, 0.9);
    }

    #[tokio::test]
    async fn test_unauthorized_becomes_error_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key tvly-test-key"))
            .mount(&server)
            .await;

        let response = provider(&server).query(&SearchQuery::new("q")).await;
        assert_eq!(response.error(), Some("Tavily search error: Invalid API key"));
        assert_eq!(response.query(), "q");
    }

    #[tokio::test]
    async fn test_garbage_body_becomes_error_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let response = provider(&server).query(&SearchQuery::new("q")).await;
        assert!(response
            .error()
            .unwrap()
            .starts_with("Tavily search error: Malformed response"));
    }
}
