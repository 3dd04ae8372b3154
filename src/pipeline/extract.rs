//! Item detail extraction
//!
//! For each discovered URL the extractor first derives the stable item id
//! and consults the dedup index; known items are skipped before any
//! navigation happens. New items get a detail-page visit that pulls the
//! body text and every URL embedded in it, from both anchor targets and
//! bare URLs in the prose.

use crate::browser::BrowserSession;
use crate::retry::{OnExhaustion, RetryPolicy};
use crate::state::{DedupIndex, ExtractionOutcome, PostingRecord};
use crate::url::{derive_item_id, extract_urls};
use crate::{HarvestError, Result};
use std::collections::BTreeSet;

/// Extracts posting records from item detail pages
pub struct ItemExtractor<'a> {
    session: &'a BrowserSession,
    policy: &'a RetryPolicy,
}

impl<'a> ItemExtractor<'a> {
    pub fn new(session: &'a BrowserSession, policy: &'a RetryPolicy) -> Self {
        Self { session, policy }
    }

    /// Processes one canonical item URL
    ///
    /// Returns `None` when the item is already indexed. Exhausted fetch
    /// attempts still yield a record, marked failed, so the item is
    /// permanently accounted for.
    pub async fn process(&self, url: &str, index: &DedupIndex) -> Option<PostingRecord> {
        let item_id = derive_item_id(url);
        if index.contains(&item_id.value) {
            tracing::debug!("Skipping known item {} ({})", item_id.value, url);
            return None;
        }

        let session = self.session;
        let body_selector = session.body_selector();
        let outcome = self
            .policy
            .run("extract item detail", OnExhaustion::Recover, move || {
                extract_once(session, url, body_selector)
            })
            .await;

        let extraction = match outcome {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::warn!("Extraction of {} failed permanently: {}", url, e);
                ExtractionOutcome::Failed
            }
        };

        Some(PostingRecord {
            id: item_id.value,
            url: url.to_string(),
            discovered_at: crate::pipeline::coordinator::timestamp(),
            extraction,
            placeholder_id: item_id.placeholder,
        })
    }
}

/// One extraction attempt: navigate, read the body, collect embedded URLs
async fn extract_once(
    session: &BrowserSession,
    url: &str,
    body_selector: &str,
) -> Result<ExtractionOutcome> {
    session.visit(url).await?;

    let body_text = session
        .element_text(body_selector)?
        .ok_or_else(|| HarvestError::MissingElement {
            selector: body_selector.to_string(),
            url: url.to_string(),
        })?;

    // Anchor targets go through the same extraction as prose, so mailto:
    // and javascript: hrefs never become embedded URLs.
    let mut embedded_urls: BTreeSet<String> = BTreeSet::new();
    for href in session.collect_hyperlinks_within(body_selector)? {
        embedded_urls.extend(extract_urls(&href));
    }
    embedded_urls.extend(extract_urls(&body_text));

    Ok(ExtractionOutcome::Extracted {
        embedded_urls,
        body_text,
    })
}
