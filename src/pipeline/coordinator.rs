//! Run coordination
//!
//! [`Coordinator`] owns the whole run: load the dedup index, crawl, close
//! the browser, fetch references, persist. Everything is sequential; the
//! jittered pauses between requests are part of the crawl's contract, so
//! nothing here fans out.

use crate::browser::{BrowserDriver, BrowserSession, ChromeDriver};
use crate::config::{resolve_credentials, resolve_store_token, Config, Credentials};
use crate::pipeline::discover::ListingDiscoverer;
use crate::pipeline::extract::ItemExtractor;
use crate::pipeline::references::ReferenceFetcher;
use crate::retry::{OnExhaustion, RetryPolicy};
use crate::state::{DedupIndex, PostingRecord};
use crate::storage::{BlobStore, PersistenceWriter, RestStore, TabularStore};
use crate::{HarvestError, Result};
use std::sync::Arc;

/// Counters reported at the end of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct canonical item URLs found across all sources
    pub discovered: usize,
    /// Items skipped because the dedup index already knew them
    pub skipped: usize,
    /// Posting records written this run (successful and failed)
    pub new_postings: usize,
    /// Reference records written this run (successful and failed)
    pub new_references: usize,
}

/// Drives one complete harvest run
pub struct Coordinator {
    config: Config,
    credentials: Option<Credentials>,
    session: BrowserSession,
    tables: Arc<dyn TabularStore>,
    blobs: Arc<dyn BlobStore>,
    policy: RetryPolicy,
}

impl Coordinator {
    pub fn new(
        config: Config,
        driver: Box<dyn BrowserDriver>,
        tables: Arc<dyn TabularStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Result<Self> {
        let login_needed = config.sources.iter().any(|s| s.login_required);
        let credentials = resolve_credentials(&config.credentials, login_needed)?;
        let policy = config.retry_policy();
        let session = BrowserSession::new(driver, config.retry_policy(), config.selectors.clone());

        Ok(Self {
            config,
            credentials,
            session,
            tables,
            blobs,
            policy,
        })
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let index = DedupIndex::load(
            self.tables.as_ref(),
            &self.config.store.postings_table,
            &self.config.store.references_table,
            &self.policy,
        )
        .await?;

        // The browser must be released whether or not crawling succeeded;
        // nothing after this point uses it.
        let crawl = self.crawl(&index).await;
        self.session.close();
        let (postings, discovered, skipped) = crawl?;

        let references = self.fetch_references(&index, &postings).await;

        let writer = PersistenceWriter::new(
            self.tables.as_ref(),
            self.blobs.as_ref(),
            &self.policy,
            &self.config.store,
        );
        writer
            .append_postings(index.postings_count(), &postings)
            .await?;
        writer
            .append_references(index.references_count(), &references)
            .await?;
        writer.upload_posting_blobs(&postings).await;
        writer.upload_reference_blobs(&references).await;

        let summary = RunSummary {
            discovered,
            skipped,
            new_postings: postings.len(),
            new_references: references.len(),
        };
        tracing::info!(
            "Run complete: {} discovered, {} skipped, {} new postings, {} new references",
            summary.discovered,
            summary.skipped,
            summary.new_postings,
            summary.new_references
        );
        Ok(summary)
    }

    /// Discovery plus extraction, inside the live browser session
    async fn crawl(&self, index: &DedupIndex) -> Result<(Vec<PostingRecord>, usize, usize)> {
        let discoverer = ListingDiscoverer::new(&self.session, &self.config, self.credentials.as_ref());
        let items = discoverer.discover().await?;
        let discovered = items.len();

        let extractor = ItemExtractor::new(&self.session, &self.policy);
        let max_items = self.config.run.max_items;
        let mut postings = Vec::new();
        let mut skipped = 0;
        for url in &items {
            if max_items > 0 && postings.len() >= max_items {
                tracing::info!("Reached max-items cap of {}", max_items);
                break;
            }
            match extractor.process(url, index).await {
                Some(record) => postings.push(record),
                None => skipped += 1,
            }
        }

        Ok((postings, discovered, skipped))
    }

    /// Fetches every embedded URL of every newly extracted posting
    ///
    /// Sequence ids continue from the count of reference rows already in
    /// the store, and advance even for failed fetches.
    async fn fetch_references(
        &self,
        index: &DedupIndex,
        postings: &[PostingRecord],
    ) -> Vec<crate::state::ReferenceRecord> {
        let fetcher = match ReferenceFetcher::new(&self.policy) {
            Ok(fetcher) => fetcher,
            Err(e) => {
                tracing::error!("Reference client unavailable, skipping references: {}", e);
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        let mut next_sequence = index.references_count();
        for posting in postings {
            let Some(urls) = posting.embedded_urls() else {
                continue;
            };
            for url in urls {
                next_sequence += 1;
                let record = fetcher
                    .process(next_sequence, &posting.id, &posting.url, url)
                    .await;
                records.push(record);
                self.policy.pause().await;
            }
        }
        records
    }
}

/// Current wall-clock time in the row timestamp format
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Builds the production coordinator and runs it once
pub async fn run_harvest(config: Config) -> Result<RunSummary> {
    let policy = config.retry_policy();
    let driver = policy
        .run("launch browser", OnExhaustion::Fatal, || async {
            ChromeDriver::launch().map_err(HarvestError::from)
        })
        .await?;

    let token = resolve_store_token(&config.store)?;
    let store = Arc::new(RestStore::new(&config.store.base_url, token)?);
    let tables: Arc<dyn TabularStore> = store.clone();
    let blobs: Arc<dyn BlobStore> = store;

    let coordinator = Coordinator::new(config, Box::new(driver), tables, blobs)?;
    coordinator.run().await
}
