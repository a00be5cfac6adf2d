//! Common test utilities: scripted search providers and canned HTML pages

#![allow(dead_code)]

use scout::search::{SearchError, SearchProvider, SearchQuery, SearchResultItem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared record of which providers were called, in order, and with what text
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
    texts: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str, query: &SearchQuery) {
        self.calls.lock().unwrap().push(name.to_string());
        self.texts.lock().unwrap().push(query.text.clone());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

/// Provider with a fixed outcome
pub struct ScriptedProvider {
    name: String,
    priority: i32,
    available: bool,
    outcome: Result<Vec<SearchResultItem>, String>,
    log: CallLog,
    probes: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn succeeding(name: &str, priority: i32, hits: usize, log: &CallLog) -> Self {
        let results = (0..hits)
            .map(|i| {
                SearchResultItem::new(
                    format!("{name} result {i}"),
                    format!("https://{name}.example/{i}"),
                    format!("snippet {i}"),
                )
            })
            .collect();
        Self::new(name, priority, Ok(results), log)
    }

    pub fn failing(name: &str, priority: i32, message: &str, log: &CallLog) -> Self {
        Self::new(name, priority, Err(message.to_string()), log)
    }

    fn new(
        name: &str,
        priority: i32,
        outcome: Result<Vec<SearchResultItem>, String>,
        log: &CallLog,
    ) -> Self {
        Self {
            name: name.to_string(),
            priority,
            available: true,
            outcome,
            log: log.clone(),
            probes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn probe_counter(&self) -> Arc<AtomicUsize> {
        self.probes.clone()
    }

    pub fn into_arc(self) -> Arc<dyn SearchProvider> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl SearchProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn probe(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.available
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResultItem>, SearchError> {
        self.log.record(&self.name, query);
        self.outcome.clone().map_err(SearchError::ApiError)
    }
}

/// DuckDuckGo HTML results page with `count` organic results
pub fn duckduckgo_page(count: usize) -> String {
    let mut html = String::from("<html><body><div class=\"results\">");
    for i in 0..count {
        html.push_str(&format!(
            "<div class=\"result results_links web-result\">\
               <h2 class=\"result__title\"><a class=\"result__a\" \
                 href=\"//duckduckgo.com/l/?uddg=https%3A%2F%2Fsite{i}.example%2Fownership&amp;rut=x\">Ownership {i}</a></h2>\
               <a class=\"result__snippet\">Rust ownership explained, part {i}</a>\
             </div>"
        ));
    }
    html.push_str("</div></body></html>");
    html
}
