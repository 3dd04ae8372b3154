//! Canonical item URLs and item id derivation

use rand::Rng;

/// An item id derived from a URL
///
/// `placeholder` is set when the URL carried no trailing numeric segment and
/// a random 13-digit value was substituted. Placeholder ids are not
/// collision-checked against the dedup index; at realistic store sizes the
/// collision probability is negligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemId {
    pub value: String,
    pub placeholder: bool,
}

/// Collapses a reply-index URL onto its canonical item URL
///
/// Listing pages link both to items and to individual replies within an
/// item; a reply URL carries one extra numeric path segment after the
/// numeric item id. The rule: split the path on `/`; when the last two
/// segments are both entirely numeric, drop the final one; otherwise return
/// the URL unchanged.
///
/// The rule is idempotent: a canonical URL never has two trailing numeric
/// segments, so applying it again is a no-op.
///
/// # Examples
///
/// ```
/// use magpie_ledger::canonical_item_url;
///
/// assert_eq!(
///     canonical_item_url("https://site/t/x/2148/1"),
///     "https://site/t/x/2148"
/// );
/// assert_eq!(
///     canonical_item_url("https://site/t/x/2148"),
///     "https://site/t/x/2148"
/// );
/// ```
pub fn canonical_item_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let parts: Vec<&str> = trimmed.split('/').collect();

    if parts.len() > 1 && is_numeric(parts[parts.len() - 1]) && is_numeric(parts[parts.len() - 2])
    {
        return parts[..parts.len() - 1].join("/");
    }

    url.to_string()
}

/// Derives the item id from a canonical item URL
///
/// Uses the URL's trailing numeric path segment when present. For a URL
/// without one (malformed input), substitutes a random 13-digit placeholder
/// and logs the anomaly. Total: never fails, for any string input.
pub fn derive_item_id(url: &str) -> ItemId {
    let trimmed = url.trim_end_matches('/');

    if let Some(last) = trimmed.rsplit('/').next() {
        if is_numeric(last) {
            return ItemId {
                value: last.to_string(),
                placeholder: false,
            };
        }
    }

    let placeholder: u64 = rand::rng().random_range(1_000_000_000_000..10_000_000_000_000);
    tracing::warn!(
        "URL {} has no numeric id segment; using placeholder id {}",
        url,
        placeholder
    );
    ItemId {
        value: placeholder.to_string(),
        placeholder: true,
    }
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}
