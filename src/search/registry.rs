use super::providers::{self, BraveSearchProvider, SerperProvider, TavilyProvider};
use super::{Credentials, SearchError, SearchProvider};
use crate::config::settings::SearchConfig;
use crate::config::Config;
use serde::Serialize;
use std::sync::Arc;

/// A backend and whether it can be used in this process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub priority: i32,
    pub available: bool,
}

/// Snapshot of usable search backends, built once at startup.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
    providers: Vec<Arc<dyn SearchProvider>>,
}

impl ProviderRegistry {
    /// Detect backends from environment credentials and the search config
    pub fn detect(config: &Config) -> Self {
        Self::from_credentials(&Credentials::from_env(), &config.search)
    }

    pub fn from_credentials(credentials: &Credentials, config: &SearchConfig) -> Self {
        let mut candidates: Vec<(&str, i32, Option<Arc<dyn SearchProvider>>)> = Vec::new();

        candidates.push((
            providers::tavily::NAME,
            providers::tavily::PRIORITY,
            credentials
                .tavily_api_key
                .as_ref()
                .and_then(|key| {
                    construct(providers::tavily::NAME, TavilyProvider::new(key.as_str(), config))
                }),
        ));

        candidates.push((
            providers::serper::NAME,
            providers::serper::PRIORITY,
            credentials
                .serper_api_key
                .as_ref()
                .and_then(|key| {
                    construct(providers::serper::NAME, SerperProvider::new(key.as_str(), config))
                }),
        ));

        candidates.push((
            providers::brave::NAME,
            providers::brave::PRIORITY,
            credentials
                .brave_api_key
                .as_ref()
                .and_then(|key| {
                    construct(
                        providers::brave::NAME,
                        BraveSearchProvider::new(key.as_str(), config),
                    )
                }),
        ));

        candidates.push((
            providers::DUCKDUCKGO_NAME,
            providers::DUCKDUCKGO_PRIORITY,
            duckduckgo(config),
        ));

        Self::build(candidates)
    }

    /// Build from explicit adapters. Each adapter is probed exactly once.
    pub fn from_providers(adapters: Vec<Arc<dyn SearchProvider>>) -> Self {
        let candidates = adapters
            .into_iter()
            .map(|p| (p.name().to_string(), p.priority(), Some(p)))
            .collect::<Vec<_>>();
        Self::build(candidates)
    }

    /// No backends at all
    pub fn empty() -> Self {
        Self {
            descriptors: Vec::new(),
            providers: Vec::new(),
        }
    }

    fn build<N: Into<String>>(candidates: Vec<(N, i32, Option<Arc<dyn SearchProvider>>)>) -> Self {
        let mut entries: Vec<(ProviderDescriptor, Option<Arc<dyn SearchProvider>>)> = candidates
            .into_iter()
            .map(|(name, priority, provider)| {
                let provider = provider.filter(|p| p.probe());
                let descriptor = ProviderDescriptor {
                    name: name.into(),
                    priority,
                    available: provider.is_some(),
                };
                (descriptor, provider)
            })
            .collect();

        // Stable: equal priorities keep insertion order.
        entries.sort_by(|a, b| b.0.priority.cmp(&a.0.priority));

        let (descriptors, providers): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        let providers: Vec<_> = providers.into_iter().flatten().collect();

        tracing::info!(
            available = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "search providers detected"
        );

        Self {
            descriptors,
            providers,
        }
    }

    /// Every known backend in priority order, usable or not
    pub fn descriptors(&self) -> &[ProviderDescriptor] {
        &self.descriptors
    }

    /// Usable backends in priority order
    pub fn available_providers(&self) -> Vec<ProviderDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.available)
            .cloned()
            .collect()
    }

    pub fn has_any_provider(&self) -> bool {
        !self.providers.is_empty()
    }

    /// The backend a search tries first
    pub fn active_provider(&self) -> Option<&str> {
        self.providers.first().map(|p| p.name())
    }

    /// Adapters in trial order
    pub(crate) fn providers(&self) -> &[Arc<dyn SearchProvider>] {
        &self.providers
    }
}

/// Client construction failures leave the backend unavailable without
/// surfacing anything to the caller.
fn construct<P>(name: &str, result: Result<P, SearchError>) -> Option<Arc<dyn SearchProvider>>
where
    P: SearchProvider + 'static,
{
    match result {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            tracing::debug!(provider = name, error = %e, "search client construction failed");
            None
        }
    }
}

#[cfg(feature = "duckduckgo")]
fn duckduckgo(config: &SearchConfig) -> Option<Arc<dyn SearchProvider>> {
    if !config.duckduckgo {
        return None;
    }
    construct(
        providers::DUCKDUCKGO_NAME,
        providers::DuckDuckGoProvider::new(config),
    )
}

#[cfg(not(feature = "duckduckgo"))]
fn duckduckgo(_config: &SearchConfig) -> Option<Arc<dyn SearchProvider>> {
    None
}
