//! Scout library
//!
//! Multi-provider web search with priority fallback, page fetching with
//! HTML-to-markdown conversion, and a generic HTTP request executor,
//! exposed as agent tools.

pub mod cli;
pub mod config;
pub mod fetch;
pub mod http;
pub mod logging;
pub mod search;
pub mod tool;
