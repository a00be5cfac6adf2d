use super::{ProviderRegistry, SearchQuery, SearchResponse};
use std::sync::Arc;

/// Returned when the registry is empty or every provider failed
pub const NO_PROVIDER_MESSAGE: &str = "No search provider available. Set TAVILY_API_KEY, SERPER_API_KEY or BRAVE_API_KEY, or enable the duckduckgo backend.";

/// Fallback chain progress
enum DispatchState {
    NotStarted,
    TryingProvider(usize),
    Succeeded(SearchResponse),
    Exhausted,
}

/// Runs a query through the provider chain.
///
/// Providers are tried one at a time in priority order; the first response
/// without an error is returned as-is. No provider is retried and results
/// are never merged.
#[derive(Clone)]
pub struct SearchDispatcher {
    registry: Arc<ProviderRegistry>,
}

impl SearchDispatcher {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub async fn search(&self, query: &SearchQuery) -> SearchResponse {
        let providers = self.registry.providers();
        let next = |i: usize| {
            if i < providers.len() {
                DispatchState::TryingProvider(i)
            } else {
                DispatchState::Exhausted
            }
        };

        let mut state = DispatchState::NotStarted;
        loop {
            state = match state {
                DispatchState::NotStarted => next(0),
                DispatchState::TryingProvider(i) => {
                    let provider = &providers[i];
                    tracing::debug!(
                        provider = provider.name(),
                        query = %query.text,
                        "trying search provider"
                    );

                    let response = provider.query(query).await;
                    match response.error() {
                        Some(error) => {
                            tracing::warn!(
                                provider = provider.name(),
                                error = %error,
                                "search provider failed"
                            );
                            next(i + 1)
                        }
                        None => DispatchState::Succeeded(response),
                    }
                }
                DispatchState::Succeeded(response) => {
                    tracing::info!(
                        provider = response.provider().unwrap_or_default(),
                        result_count = response.results().len(),
                        "search succeeded"
                    );
                    return response;
                }
                DispatchState::Exhausted => {
                    tracing::info!(
                        tried = providers.len(),
                        query = %query.text,
                        "no search provider produced results"
                    );
                    return SearchResponse::Failure {
                        error: NO_PROVIDER_MESSAGE.to_string(),
                        query: query.text.clone(),
                    };
                }
            };
        }
    }
}
