//! Multi-provider web search.
//!
//! Backends implement [`SearchProvider`]. The [`registry::ProviderRegistry`]
//! decides once which of them are usable, and the
//! [`dispatcher::SearchDispatcher`] walks them in priority order until one
//! answers.

pub mod dispatcher;
pub mod providers;
pub mod registry;

pub use dispatcher::SearchDispatcher;
pub use registry::{ProviderDescriptor, ProviderRegistry};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Search provider abstraction - different backends can be plugged in
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable lowercase identifier, reported as `provider` in responses
    fn name(&self) -> &str;

    /// Name used in error messages
    fn label(&self) -> &str {
        self.name()
    }

    /// Higher runs first
    fn priority(&self) -> i32;

    /// Side-effect-free check whether this backend can be used at all.
    /// Called once by the registry.
    fn probe(&self) -> bool {
        true
    }

    /// Run the query against the backend
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResultItem>, SearchError>;

    /// Run the query and normalize the outcome. Never fails: backend errors
    /// become the error-shaped [`SearchResponse`].
    async fn query(&self, query: &SearchQuery) -> SearchResponse {
        match self.search(query).await {
            Ok(mut results) => {
                results.truncate(query.max_results);
                for item in &mut results {
                    item.score = normalize_score(Some(item.score));
                }
                SearchResponse::Success {
                    results,
                    query: query.text.clone(),
                    provider: self.name().to_string(),
                }
            }
            Err(e) => SearchResponse::Failure {
                error: format!("{} search error: {}", self.label(), e),
                query: query.text.clone(),
            },
        }
    }
}

/// Topic hint; only some backends use it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    General,
    News,
    Finance,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::General => "general",
            Topic::News => "news",
            Topic::Finance => "finance",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Topic::General),
            "news" => Ok(Topic::News),
            "finance" => Ok(Topic::Finance),
            other => Err(format!(
                "unknown topic '{}', expected general, news or finance",
                other
            )),
        }
    }
}

/// A search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    /// Always at least 1
    pub max_results: usize,
    pub topic: Topic,
    /// Ask for full page content where the backend supports it
    pub include_raw: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_results: 5,
            topic: Topic::General,
            include_raw: false,
        }
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn topic(mut self, topic: Topic) -> Self {
        self.topic = topic;
        self
    }

    pub fn include_raw(mut self, include_raw: bool) -> Self {
        self.include_raw = include_raw;
        self
    }
}

/// One result in the unified schema shared by every backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    /// Snippet or excerpt
    pub content: String,
    /// Relevance in [0, 1]; 1.0 when the backend has no scoring
    pub score: f64,
    /// Full page text, only when requested and supported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl SearchResultItem {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            score: 1.0,
            raw_content: None,
        }
    }

    pub fn with_score(mut self, score: Option<f64>) -> Self {
        self.score = normalize_score(score);
        self
    }

    pub fn with_raw_content(mut self, raw: Option<String>) -> Self {
        self.raw_content = raw;
        self
    }
}

/// Clamp a backend score into [0, 1]; missing or non-finite scores become 1.0
pub fn normalize_score(score: Option<f64>) -> f64 {
    match score {
        Some(s) if s.is_finite() => s.clamp(0.0, 1.0),
        _ => 1.0,
    }
}

/// Search outcome
///
/// Exactly one of the two shapes; consumers detect failure by the presence
/// of the `error` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Success {
        results: Vec<SearchResultItem>,
        query: String,
        provider: String,
    },
    Failure {
        error: String,
        query: String,
    },
}

impl SearchResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, SearchResponse::Failure { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SearchResponse::Failure { error, .. } => Some(error),
            SearchResponse::Success { .. } => None,
        }
    }

    pub fn provider(&self) -> Option<&str> {
        match self {
            SearchResponse::Success { provider, .. } => Some(provider),
            SearchResponse::Failure { .. } => None,
        }
    }

    pub fn results(&self) -> &[SearchResultItem] {
        match self {
            SearchResponse::Success { results, .. } => results,
            SearchResponse::Failure { .. } => &[],
        }
    }

    pub fn query(&self) -> &str {
        match self {
            SearchResponse::Success { query, .. } | SearchResponse::Failure { query, .. } => query,
        }
    }

    /// Replace the echoed query text
    pub fn with_query(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            SearchResponse::Success { query, .. } | SearchResponse::Failure { query, .. } => {
                *query = text.into()
            }
        }
        self
    }
}

/// Search-related errors raised inside a backend adapter
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Malformed response: {0}")]
    Parse(String),
}

impl SearchError {
    /// Classify a failed `send()`
    pub fn transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            SearchError::Timeout(timeout_secs)
        } else {
            SearchError::NetworkError(err)
        }
    }
}

/// API credentials for the paid backends, read from the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub tavily_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub brave_api_key: Option<String>,
}

impl Credentials {
    pub const TAVILY_ENV: &'static str = "TAVILY_API_KEY";
    pub const SERPER_ENV: &'static str = "SERPER_API_KEY";
    pub const BRAVE_ENV: &'static str = "BRAVE_API_KEY";

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as missing
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            tavily_api_key: get(Self::TAVILY_ENV),
            serper_api_key: get(Self::SERPER_ENV),
            brave_api_key: get(Self::BRAVE_ENV),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_score() {
        assert_eq!(normalize_score(None), 1.0);
        assert_eq!(normalize_score(Some(f64::NAN)), 1.0);
        assert_eq!(normalize_score(Some(1.7)), 1.0);
        assert_eq!(normalize_score(Some(-0.2)), 0.0);
        assert_eq!(normalize_score(Some(0.42)), 0.42);
    }

    #[test]
    fn test_query_builder_enforces_positive_limit() {
        let q = SearchQuery::new("rust").max_results(0);
        assert_eq!(q.max_results, 1);
        assert_eq!(q.topic, Topic::General);
        assert!(!q.include_raw);
    }

    #[test]
    fn test_topic_parsing() {
        assert_eq!("News".parse::<Topic>().unwrap(), Topic::News);
        assert_eq!("finance".parse::<Topic>().unwrap(), Topic::Finance);
        assert!("sports".parse::<Topic>().is_err());
    }

    #[test]
    fn test_response_shapes_are_exclusive() {
        let ok = SearchResponse::Success {
            results: vec![SearchResultItem::new("t", "https://a.example", "c")],
            query: "q".into(),
            provider: "serper".into(),
        };
        let value = serde_json::to_value(&ok).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["provider"], json!("serper"));
        assert_eq!(value["results"][0]["score"], json!(1.0));
        assert!(value["results"][0].get("raw_content").is_none());

        let err = SearchResponse::Failure {
            error: "boom".into(),
            query: "q".into(),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value, json!({"error": "boom", "query": "q"}));
    }

    #[test]
    fn test_response_round_trips_through_json() {
        let parsed: SearchResponse =
            serde_json::from_value(json!({"error": "nope", "query": "x"})).unwrap();
        assert!(parsed.is_error());
        assert_eq!(parsed.error(), Some("nope"));
        assert!(parsed.results().is_empty());
    }

    #[test]
    fn test_credentials_ignore_blank_values() {
        let creds = Credentials::from_lookup(|key| match key {
            "TAVILY_API_KEY" => Some("  ".to_string()),
            "SERPER_API_KEY" => Some(" serper-key ".to_string()),
            _ => None,
        });
        assert!(creds.tavily_api_key.is_none());
        assert_eq!(creds.serper_api_key.as_deref(), Some("serper-key"));
        assert!(creds.brave_api_key.is_none());
    }
}
