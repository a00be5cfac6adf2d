//! Generic HTTP execution with structured, never-failing outcomes.
//!
//! [`HttpExecutor::request`] is total: transport faults, timeouts and bad
//! input all come back as an [`HttpOutcome`] with `success == false` and
//! `status_code == 0` instead of an `Err`.

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One arbitrary HTTP request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRequest {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// JSON request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// URL query parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, String>>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: None,
            data: None,
            params: None,
            timeout_secs: default_timeout(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Result of an HTTP call
///
/// `success` is true iff the transport completed and `status_code < 400`.
/// On transport failure `status_code` is 0 and `content` holds a diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpOutcome {
    pub success: bool,
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    /// Parsed JSON when the body is JSON, otherwise the raw text
    pub content: serde_json::Value,
    pub url: String,
}

impl HttpOutcome {
    fn failed(url: &str, diagnostic: String) -> Self {
        Self {
            success: false,
            status_code: 0,
            headers: HashMap::new(),
            content: serde_json::Value::String(diagnostic),
            url: url.to_string(),
        }
    }

    /// `content` as text, whether it was parsed or not
    pub fn content_text(&self) -> String {
        match &self.content {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Human-readable diagnostic for a transport-level failure
pub fn describe_transport_error(err: &reqwest::Error, timeout_secs: u64) -> String {
    if err.is_timeout() {
        format!("Request timed out after {} seconds", timeout_secs)
    } else {
        format!("Request error: {}", err)
    }
}

/// Flatten response headers. Repeated headers are joined with ", ";
/// non-UTF-8 values are dropped.
pub fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .keys()
        .filter_map(|name| {
            let values: Vec<&str> = headers
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect();
            (!values.is_empty()).then(|| (name.as_str().to_string(), values.join(", ")))
        })
        .collect()
}

/// Whether a request body carries anything worth sending
fn has_payload(data: &serde_json::Value) -> bool {
    match data {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Parse a body as JSON, falling back to the raw text
pub fn parse_body(text: String) -> serde_json::Value {
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => serde_json::Value::String(text),
    }
}

/// Executes arbitrary HTTP requests on a shared connection pool
#[derive(Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
}

impl HttpExecutor {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn request(&self, request: &HttpRequest) -> HttpOutcome {
        let method = match Method::from_bytes(request.method.to_uppercase().as_bytes()) {
            Ok(m) => m,
            Err(e) => {
                return HttpOutcome::failed(
                    &request.url,
                    format!("Error making request: invalid method {:?}: {}", request.method, e),
                )
            }
        };

        tracing::debug!(
            method = %method,
            url = %request.url,
            timeout_secs = request.timeout_secs,
            "http request"
        );

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(Duration::from_secs(request.timeout_secs));

        if let Some(headers) = &request.headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if let Some(params) = request.params.as_ref().filter(|p| !p.is_empty()) {
            builder = builder.query(params);
        }
        if let Some(data) = request.data.as_ref().filter(|d| has_payload(d)) {
            builder = builder.json(data);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "http transport failure");
                return HttpOutcome::failed(
                    &request.url,
                    describe_transport_error(&e, request.timeout_secs),
                );
            }
        };

        let status = response.status();
        let headers = header_map(response.headers());
        let final_url = response.url().to_string();

        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                return HttpOutcome::failed(
                    &request.url,
                    describe_transport_error(&e, request.timeout_secs),
                )
            }
        };

        tracing::debug!(status = status.as_u16(), url = %final_url, "http response");

        HttpOutcome {
            success: status.as_u16() < 400,
            status_code: status.as_u16(),
            headers,
            content: parse_body(text),
            url: final_url,
        }
    }
}

impl Default for HttpExecutor {
    fn default() -> Self {
        Self::new()
    }
}
