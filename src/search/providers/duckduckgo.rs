//! DuckDuckGo HTML endpoint. Free, no credential; scores are always 1.0.

use super::{build_client, ensure_success, DUCKDUCKGO_NAME, DUCKDUCKGO_PRIORITY};
use crate::config::settings::SearchConfig;
use crate::search::{SearchError, SearchProvider, SearchQuery, SearchResultItem};
use scraper::{Html, Selector};
use std::time::Duration;

/// Browser-like agent; the HTML endpoint serves a challenge page to bare clients
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

impl DuckDuckGoProvider {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client(USER_AGENT)?,
            endpoint: config.duckduckgo_endpoint.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Extract results from the HTML result page. Ads are skipped.
    fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchResultItem>, SearchError> {
        let document = Html::parse_document(html);
        let result_sel = selector(".result")?;
        let link_sel = selector("a.result__a")?;
        let snippet_sel = selector(".result__snippet")?;

        let mut items = Vec::new();
        for result in document.select(&result_sel) {
            if items.len() >= max_results {
                break;
            }

            let classes = result.value().attr("class").unwrap_or("");
            if classes.contains("result--ad") {
                continue;
            }

            let Some(link) = result.select(&link_sel).next() else {
                continue;
            };
            let url = resolve_href(link.value().attr("href").unwrap_or(""));
            if url.is_empty() {
                continue;
            }

            let title = collapse_whitespace(&link.text().collect::<String>());
            let content = result
                .select(&snippet_sel)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .unwrap_or_default();

            items.push(SearchResultItem::new(title, url, content));
        }

        Ok(items)
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("bad selector {css}: {e}")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Unwrap `//duckduckgo.com/l/?uddg=<encoded>&rut=...` redirect links
fn resolve_href(href: &str) -> String {
    if let Some(start) = href.find("uddg=") {
        let encoded = &href[start + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }

    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    href.to_string()
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        DUCKDUCKGO_NAME
    }

    fn label(&self) -> &str {
        "DuckDuckGo"
    }

    fn priority(&self) -> i32 {
        DUCKDUCKGO_PRIORITY
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResultItem>, SearchError> {
        tracing::debug!(
            query = %query.text,
            max_results = query.max_results,
            "performing duckduckgo search"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query.text.as_str())])
            .header("Accept", "text/html")
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| SearchError::transport(e, self.timeout_secs))?;

        // 202 is how the HTML endpoint signals throttling
        if response.status() == reqwest::StatusCode::ACCEPTED {
            return Err(SearchError::RateLimitExceeded);
        }
        let response = ensure_success(response, DUCKDUCKGO_NAME).await?;
        let body = response.text().await?;

        if body.contains("anomaly-modal") {
            return Err(SearchError::RateLimitExceeded);
        }

        let items = Self::parse_results(&body, query.max_results)?;

        tracing::debug!(
            query = %query.text,
            result_count = items.len(),
            "duckduckgo search completed"
        );

        Ok(items)
    }
}
