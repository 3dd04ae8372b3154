//! Visible-text extraction from raw HTML
//!
//! References fetched over plain HTTP are stored twice: the raw source and
//! the text a reader would see. This module derives the latter.

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

fn non_rendered_blocks() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>",
        )
        .expect("static block pattern is valid")
    })
}

/// Extracts the visible text from an HTML document
///
/// `script`, `style`, and `noscript` blocks are removed before parsing so
/// their contents never leak into the text. Text nodes are trimmed and
/// newline-separated; the result is stable for a given input but makes no
/// layout promises beyond that.
pub fn extract_text(html: &str) -> String {
    let cleaned = non_rendered_blocks().replace_all(html, "");
    let document = Html::parse_document(&cleaned);

    let mut out = String::new();
    for fragment in document.root_element().text() {
        let trimmed = fragment.trim();
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}
