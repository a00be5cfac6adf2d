use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// Where and how much to log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for this crate's targets (other crates log at `warn`)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path. When unset, logs go to stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Rotation policy for `file`
    #[serde(default)]
    pub rotation: LogRotation,

    /// How many rotated files to keep (0 = keep everything)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep: Option<usize>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            rotation: LogRotation::default(),
            keep: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Append to a single file
    None,
    /// One file per day (`{name}.YYYY-MM-DD`)
    Daily,
    /// One file per process run (`{name}.session-YYYYmmdd-HHMMSS`)
    #[default]
    Session,
}

/// Search backend settings. Credentials are never stored here; they come
/// from the environment (see [`crate::search::Credentials`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Per-provider request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Allow the credential-less DuckDuckGo backend
    #[serde(default = "default_true")]
    pub duckduckgo: bool,

    #[serde(default = "default_tavily_endpoint")]
    pub tavily_endpoint: String,

    /// Serper routes between `/search` and `/news` under this base
    #[serde(default = "default_serper_base_url")]
    pub serper_base_url: String,

    #[serde(default = "default_brave_endpoint")]
    pub brave_endpoint: String,

    #[serde(default = "default_duckduckgo_endpoint")]
    pub duckduckgo_endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            default_max_results: default_max_results(),
            duckduckgo: true,
            tavily_endpoint: default_tavily_endpoint(),
            serper_base_url: default_serper_base_url(),
            brave_endpoint: default_brave_endpoint(),
            duckduckgo_endpoint: default_duckduckgo_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Column width used when rendering HTML to markdown
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            wrap_width: default_wrap_width(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_results() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_tavily_endpoint() -> String {
    "https://api.tavily.com/search".to_string()
}

fn default_serper_base_url() -> String {
    "https://google.serper.dev".to_string()
}

fn default_brave_endpoint() -> String {
    "https://api.search.brave.com/res/v1/web/search".to_string()
}

fn default_duckduckgo_endpoint() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; Scout/1.0)".to_string()
}

fn default_wrap_width() -> usize {
    100
}
