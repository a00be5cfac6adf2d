//! Page fetching: download a URL and render it as markdown.

pub mod markdown;

use crate::config::settings::FetchConfig;
use crate::http::describe_transport_error;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of [`PageFetcher::fetch`]
///
/// Serializes to either the success shape or `{error, url}`; callers tell
/// them apart by the presence of `error`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FetchResult {
    Success {
        /// Final URL after redirects
        url: String,
        markdown_content: String,
        status_code: u16,
        /// Character count of `markdown_content`
        content_length: usize,
    },
    Failure {
        error: String,
        url: String,
    },
}

impl FetchResult {
    pub fn is_error(&self) -> bool {
        matches!(self, FetchResult::Failure { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            FetchResult::Success { url, .. } | FetchResult::Failure { url, .. } => url,
        }
    }
}

/// Why a fetch failed
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP status {status} for url: {url}")]
    Status { status: StatusCode, url: String },

    #[error("{0}")]
    Transport(String),
}

/// Fetches pages and converts them to markdown
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    user_agent: String,
    wrap_width: usize,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &FetchConfig) -> Self {
        Self {
            client,
            user_agent: config.user_agent.clone(),
            wrap_width: config.wrap_width,
        }
    }

    /// Fetch `url` and render it. Never fails; errors come back as
    /// [`FetchResult::Failure`].
    pub async fn fetch(&self, url: &str, timeout_secs: u64) -> FetchResult {
        tracing::debug!(url = %url, timeout_secs, "fetch_url start");

        match self.try_fetch(url, timeout_secs).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "fetch_url failed");
                FetchResult::Failure {
                    error: format!("Fetch URL error: {}", e),
                    url: url.to_string(),
                }
            }
        }
    }

    async fn try_fetch(&self, url: &str, timeout_secs: u64) -> Result<FetchResult, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
            .map_err(|e| FetchError::Transport(describe_transport_error(&e, timeout_secs)))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                status,
                url: final_url,
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(describe_transport_error(&e, timeout_secs)))?;

        let markdown_content = markdown::html_to_markdown(&html, self.wrap_width);
        let content_length = markdown_content.chars().count();

        tracing::debug!(
            url = %final_url,
            status = status.as_u16(),
            content_length,
            "fetch_url complete"
        );

        Ok(FetchResult::Success {
            url: final_url,
            markdown_content,
            status_code: status.as_u16(),
            content_length,
        })
    }
}
