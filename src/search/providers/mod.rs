pub mod brave;
#[cfg(feature = "duckduckgo")]
pub mod duckduckgo;
pub mod serper;
pub mod tavily;

pub use brave::BraveSearchProvider;
#[cfg(feature = "duckduckgo")]
pub use duckduckgo::DuckDuckGoProvider;
pub use serper::SerperProvider;
pub use tavily::TavilyProvider;

use crate::logging::redact_secrets;
use crate::search::SearchError;
use std::time::Duration;

/// Longest error body echoed back in an error message
const MAX_ERROR_BODY: usize = 300;

// Declared here so the registry can describe the backend even when the
// `duckduckgo` feature is off.
pub const DUCKDUCKGO_NAME: &str = "duckduckgo";
pub const DUCKDUCKGO_PRIORITY: i32 = 10;

pub(crate) fn build_client(user_agent: &str) -> Result<reqwest::Client, SearchError> {
    Ok(reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Turn non-2xx responses into the matching [`SearchError`]
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    provider: &str,
) -> Result<reqwest::Response, SearchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = redact_secrets(&response.text().await.unwrap_or_default());

    tracing::warn!(
        provider,
        status = %status,
        error = %body,
        "search api error"
    );

    Err(match status.as_u16() {
        401 | 403 => SearchError::InvalidApiKey,
        429 => SearchError::RateLimitExceeded,
        _ => {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
                body.push('…');
            }
            SearchError::ApiError(format!("HTTP {}: {}", status, body))
        }
    })
}

/// Read a JSON body, reporting decode failures as malformed responses
pub(crate) async fn read_json(
    response: reqwest::Response,
) -> Result<serde_json::Value, SearchError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| SearchError::Parse(e.to_string()))
}

/// String field or empty string
pub(crate) fn str_field(value: &serde_json::Value, key: &str) -> String {
    value[key].as_str().unwrap_or("").to_string()
}
