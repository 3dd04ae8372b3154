//! URL extraction from free text
//!
//! Posting bodies embed URLs both as hyperlinks and as bare text. This is
//! the shared extraction routine applied to both: hyperlink targets are run
//! through it too, so the same shape rules apply everywhere.

use regex::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("static URL pattern is valid")
    })
}

/// Extracts every http(s) URL appearing in `text`
///
/// Trailing sentence punctuation is trimmed so that `see https://x.com.`
/// yields `https://x.com`. Order follows appearance in the text; duplicates
/// are kept (callers deduplicate via set union).
pub fn extract_urls(text: &str) -> Vec<String> {
    url_pattern()
        .find_iter(text)
        .map(|m| trim_trailing_punctuation(m.as_str()).to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

fn trim_trailing_punctuation(url: &str) -> &str {
    url.trim_end_matches(|c| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
}
