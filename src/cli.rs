use crate::config::{self, Config};
use crate::fetch::PageFetcher;
use crate::http::{HttpExecutor, HttpRequest};
use crate::search::{ProviderRegistry, SearchDispatcher, SearchQuery, Topic};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "scout", version, about = "Web search and page fetching for agents")]
pub struct Cli {
    /// Config file (defaults to $SCOUT_CONFIG or <config dir>/scout/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the web, falling back across providers
    Search {
        query: String,
        #[arg(long, short = 'n')]
        max_results: Option<usize>,
        #[arg(long, default_value_t = Topic::General)]
        topic: Topic,
        #[arg(long)]
        include_raw: bool,
    },
    /// Fetch a page and print it as markdown
    Fetch {
        url: String,
        /// Timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Make an arbitrary HTTP request
    Http {
        url: String,
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,
        /// `Name: value`, repeatable
        #[arg(long = "header", short = 'H', value_parser = parse_header)]
        headers: Vec<(String, String)>,
        /// `key=value` query parameter, repeatable
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// JSON request body
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List search providers and whether they are usable
    Providers,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected `Name: value`, got {raw:?}"))
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected `key=value`, got {raw:?}"))
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load_or_default()?,
    };
    if cli.debug {
        config.logging.level = "debug".to_string();
    }

    let _log_guard = crate::logging::init(&config.logging)?;

    execute(cli.command, &config).await
}

async fn execute(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Search {
            query,
            max_results,
            topic,
            include_raw,
        } => {
            let registry = Arc::new(ProviderRegistry::detect(config));
            let dispatcher = SearchDispatcher::new(registry);
            let query = SearchQuery::new(query)
                .max_results(max_results.unwrap_or(config.search.default_max_results))
                .topic(topic)
                .include_raw(include_raw);
            print_json(&dispatcher.search(&query).await)
        }
        Command::Fetch { url, timeout } => {
            let fetcher = PageFetcher::new(&config.fetch);
            let result = fetcher
                .fetch(&url, timeout.unwrap_or(config.fetch.timeout_secs))
                .await;
            print_json(&result)
        }
        Command::Http {
            url,
            method,
            headers,
            params,
            data,
            timeout,
        } => {
            let mut request = HttpRequest::get(url)
                .method(method)
                .timeout_secs(timeout.unwrap_or(config.http.timeout_secs));
            for (name, value) in headers {
                request = request.header(name, value);
            }
            for (name, value) in params {
                request = request.param(name, value);
            }
            if let Some(raw) = data {
                let body = serde_json::from_str(&raw).context("--data must be valid JSON")?;
                request = request.json(body);
            }
            print_json(&HttpExecutor::new().request(&request).await)
        }
        Command::Providers => {
            let registry = ProviderRegistry::detect(config);
            print_json(&registry.descriptors())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
