use regex::Regex;
use std::sync::OnceLock;

/// Elements whose contents never belong in readable output
fn non_content_blocks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<noscript\b[^>]*>.*?</noscript\s*>|<template\b[^>]*>.*?</template\s*>")
            .expect("static regex")
    })
}

/// Convert an HTML document to markdown-flavoured text.
///
/// Headings, links and lists survive the conversion; scripts and styles are
/// dropped before rendering. Output is deterministic for a given input and width.
pub fn html_to_markdown(html: &str, width: usize) -> String {
    let cleaned = non_content_blocks().replace_all(html, "");
    html2text::from_read(cleaned.as_bytes(), width.max(20))
}
