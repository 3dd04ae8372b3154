//! Embedded-reference fetching
//!
//! References are plain HTTP fetches; the browser is gone by the time
//! this phase runs. Each reference consumes a sequence id whether or not
//! its fetch succeeds, so ids stay strictly increasing across the store's
//! lifetime even through failures.

use crate::retry::{OnExhaustion, RetryPolicy};
use crate::state::{FetchOutcome, ReferenceRecord};
use crate::text::extract_text;
use crate::{HarvestError, Result};
use std::time::Duration;

const USER_AGENT: &str = concat!("magpie-ledger/", env!("CARGO_PKG_VERSION"));

/// Fetches embedded reference pages over HTTP
pub struct ReferenceFetcher<'a> {
    client: reqwest::Client,
    policy: &'a RetryPolicy,
}

impl<'a> ReferenceFetcher<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, policy })
    }

    /// Fetches one reference and builds its record
    ///
    /// `sequence_id` was allocated by the caller before this call; it is
    /// consumed even when every attempt fails.
    pub async fn process(
        &self,
        sequence_id: u64,
        posting_id: &str,
        posting_url: &str,
        reference_url: &str,
    ) -> ReferenceRecord {
        let client = &self.client;
        let outcome = self
            .policy
            .run("fetch reference page", OnExhaustion::Recover, move || {
                fetch_reference(client, reference_url)
            })
            .await;

        let fetch = match outcome {
            Ok(raw_source) => {
                let derived_text = extract_text(&raw_source);
                FetchOutcome::Fetched {
                    raw_source,
                    derived_text,
                }
            }
            Err(e) => {
                tracing::warn!("Reference {} failed permanently: {}", reference_url, e);
                FetchOutcome::Failed
            }
        };

        ReferenceRecord {
            sequence_id,
            posting_id: posting_id.to_string(),
            posting_url: posting_url.to_string(),
            reference_url: reference_url.to_string(),
            fetched_at: crate::pipeline::coordinator::timestamp(),
            fetch,
        }
    }
}

/// One fetch attempt; non-2xx statuses are errors so they get retried
async fn fetch_reference(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await.map_err(|e| HarvestError::Http {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response.text().await.map_err(|e| HarvestError::Http {
        url: url.to_string(),
        source: e,
    })
}
