//! Record types produced by a harvest run
//!
//! Both record shapes are created once, never mutated after the attempt
//! that produced them, and never deleted. A failed fetch is recorded, not
//! dropped: the sentinel value makes the failure visible to operators while
//! keeping the row shape uniform.

use std::collections::BTreeSet;

/// Sentinel value marking an unrecoverable fetch failure
///
/// Distinguishable from an empty successful result: an empty body is `""`,
/// a failed fetch is `FAILURE`.
pub const FAILURE: &str = "FAILURE";

/// Outcome of a posting detail extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// Detail page was fetched and parsed
    Extracted {
        /// Deduplicated embedded URLs, in lexicographic order
        embedded_urls: BTreeSet<String>,
        /// Full rendered body text
        body_text: String,
    },
    /// Every fetch attempt failed; payload fields carry the sentinel
    Failed,
}

/// One discovered posting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingRecord {
    /// Derived from the URL's trailing numeric segment, or a random
    /// 13-digit placeholder for malformed URLs. Unique within a single
    /// run's output only.
    pub id: String,
    /// Canonical item URL
    pub url: String,
    /// `%Y-%m-%d %H:%M:%S` UTC
    pub discovered_at: String,
    pub extraction: ExtractionOutcome,
    /// True when the id is a random placeholder rather than URL-derived
    pub placeholder_id: bool,
}

impl PostingRecord {
    /// The tabular row persisted for this posting: `[id, url, timestamp]`
    pub fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.url.clone(),
            self.discovered_at.clone(),
        ]
    }

    /// Embedded URLs, or `None` when extraction failed
    pub fn embedded_urls(&self) -> Option<&BTreeSet<String>> {
        match &self.extraction {
            ExtractionOutcome::Extracted { embedded_urls, .. } => Some(embedded_urls),
            ExtractionOutcome::Failed => None,
        }
    }

    /// Body text blob content; the sentinel when extraction failed
    pub fn body_blob(&self) -> &str {
        match &self.extraction {
            ExtractionOutcome::Extracted { body_text, .. } => body_text,
            ExtractionOutcome::Failed => FAILURE,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.extraction == ExtractionOutcome::Failed
    }
}

/// Outcome of a reference fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched {
        /// Raw page source as returned by the server
        raw_source: String,
        /// Visible text derived from the source
        derived_text: String,
    },
    /// Every fetch attempt failed; both blobs carry the sentinel
    Failed,
}

/// One external URL found embedded in a posting's body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// Strictly increasing, unique across the store's lifetime. Allocated
    /// before the fetch, so ids are consumed even on failure.
    pub sequence_id: u64,
    /// Weak back-reference to a posting: a lookup key, not ownership
    pub posting_id: String,
    pub posting_url: String,
    pub reference_url: String,
    /// `%Y-%m-%d %H:%M:%S` UTC
    pub fetched_at: String,
    pub fetch: FetchOutcome,
}

impl ReferenceRecord {
    /// The tabular row persisted for this reference:
    /// `[seq_id, posting_id, posting_url, reference_url, timestamp]`
    pub fn row(&self) -> Vec<String> {
        vec![
            self.sequence_id.to_string(),
            self.posting_id.clone(),
            self.posting_url.clone(),
            self.reference_url.clone(),
            self.fetched_at.clone(),
        ]
    }

    /// Raw source blob content; the sentinel when the fetch failed
    pub fn source_blob(&self) -> &str {
        match &self.fetch {
            FetchOutcome::Fetched { raw_source, .. } => raw_source,
            FetchOutcome::Failed => FAILURE,
        }
    }

    /// Derived text blob content; the sentinel when the fetch failed
    pub fn text_blob(&self) -> &str {
        match &self.fetch {
            FetchOutcome::Fetched { derived_text, .. } => derived_text,
            FetchOutcome::Failed => FAILURE,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.fetch == FetchOutcome::Failed
    }
}
