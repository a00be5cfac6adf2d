//! Fallback-chain behaviour of the search dispatcher

mod common;

use common::{CallLog, ScriptedProvider};
use scout::search::dispatcher::NO_PROVIDER_MESSAGE;
use scout::search::{ProviderRegistry, SearchDispatcher, SearchQuery};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn dispatcher(providers: Vec<ScriptedProvider>) -> SearchDispatcher {
    let registry = ProviderRegistry::from_providers(
        providers.into_iter().map(ScriptedProvider::into_arc).collect(),
    );
    SearchDispatcher::new(Arc::new(registry))
}

#[tokio::test]
async fn test_first_success_wins_and_lower_priority_is_never_called() {
    let log = CallLog::new();
    let dispatcher = dispatcher(vec![
        ScriptedProvider::succeeding("low", 10, 2, &log),
        ScriptedProvider::succeeding("high", 40, 2, &log),
    ]);

    let response = dispatcher.search(&SearchQuery::new("rust")).await;

    assert_eq!(response.provider(), Some("high"));
    assert_eq!(log.calls(), ["high"]);
}

#[tokio::test]
async fn test_errors_advance_in_descending_priority() {
    let log = CallLog::new();
    let dispatcher = dispatcher(vec![
        ScriptedProvider::succeeding("duckduckgo", 10, 1, &log),
        ScriptedProvider::failing("tavily", 40, "quota exhausted", &log),
        ScriptedProvider::failing("serper", 30, "bad gateway", &log),
        ScriptedProvider::succeeding("brave", 20, 3, &log),
    ]);

    let response = dispatcher.search(&SearchQuery::new("rust")).await;

    assert_eq!(log.calls(), ["tavily", "serper", "brave"]);
    assert_eq!(response.provider(), Some("brave"));
    assert_eq!(response.results().len(), 3);
    assert!(!response.is_error());
}

#[tokio::test]
async fn test_all_failures_exhaust_with_single_message() {
    let log = CallLog::new();
    let dispatcher = dispatcher(vec![
        ScriptedProvider::failing("tavily", 40, "down", &log),
        ScriptedProvider::failing("duckduckgo", 10, "captcha", &log),
    ]);

    let response = dispatcher.search(&SearchQuery::new("rust ownership model")).await;

    assert_eq!(log.calls(), ["tavily", "duckduckgo"]);
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({ "error": NO_PROVIDER_MESSAGE, "query": "rust ownership model" })
    );
}

#[tokio::test]
async fn test_empty_registry_makes_no_calls() {
    let log = CallLog::new();
    let registry = Arc::new(ProviderRegistry::from_providers(vec![
        ScriptedProvider::succeeding("tavily", 40, 1, &log)
            .unavailable()
            .into_arc(),
    ]));
    assert!(!registry.has_any_provider());

    let response = SearchDispatcher::new(registry)
        .search(&SearchQuery::new("anything"))
        .await;

    assert!(response
        .error()
        .unwrap()
        .starts_with("No search provider available"));
    assert_eq!(response.query(), "anything");
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_unavailable_provider_is_skipped_but_listed() {
    let log = CallLog::new();
    let registry = ProviderRegistry::from_providers(vec![
        ScriptedProvider::succeeding("tavily", 40, 1, &log)
            .unavailable()
            .into_arc(),
        ScriptedProvider::succeeding("serper", 30, 1, &log).into_arc(),
    ]);

    let names: Vec<_> = registry
        .descriptors()
        .iter()
        .map(|d| (d.name.as_str(), d.available))
        .collect();
    assert_eq!(names, [("tavily", false), ("serper", true)]);
    assert_eq!(registry.active_provider(), Some("serper"));

    let response = SearchDispatcher::new(Arc::new(registry))
        .search(&SearchQuery::new("q"))
        .await;
    assert_eq!(response.provider(), Some("serper"));
    assert_eq!(log.calls(), ["serper"]);
}

#[tokio::test]
async fn test_probes_run_once_at_construction() {
    let log = CallLog::new();
    let provider = ScriptedProvider::succeeding("serper", 30, 1, &log);
    let probes = provider.probe_counter();

    let dispatcher = SearchDispatcher::new(Arc::new(ProviderRegistry::from_providers(vec![
        provider.into_arc(),
    ])));
    dispatcher.search(&SearchQuery::new("a")).await;
    dispatcher.search(&SearchQuery::new("b")).await;

    assert_eq!(probes.load(Ordering::SeqCst), 1);
    assert_eq!(log.calls(), ["serper", "serper"]);
}

#[tokio::test]
async fn test_results_are_limited_to_max_results() {
    let log = CallLog::new();
    let dispatcher = dispatcher(vec![ScriptedProvider::succeeding("serper", 30, 10, &log)]);

    let response = dispatcher
        .search(&SearchQuery::new("q").max_results(4))
        .await;

    assert_eq!(response.results().len(), 4);
    assert!(response
        .results()
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.score)));
}

#[tokio::test]
async fn test_trial_order_is_deterministic() {
    for _ in 0..5 {
        let log = CallLog::new();
        let dispatcher = dispatcher(vec![
            ScriptedProvider::failing("c", 10, "x", &log),
            ScriptedProvider::failing("a", 30, "x", &log),
            ScriptedProvider::failing("b", 20, "x", &log),
        ]);
        dispatcher.search(&SearchQuery::new("q")).await;
        assert_eq!(log.calls(), ["a", "b", "c"]);
    }
}
