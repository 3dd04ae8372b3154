//! Dedup index: the snapshot of already-recorded keys
//!
//! Loaded once from both tabular stores at startup and treated as immutable
//! for the run. Records written during the run stay invisible to the dedup
//! check until the next run; a single pass never needs to see its own
//! output.

use crate::retry::{OnExhaustion, RetryPolicy};
use crate::storage::TabularStore;
use crate::Result;
use std::collections::HashSet;

/// Snapshot of previously persisted keys and row counts
#[derive(Debug, Clone)]
pub struct DedupIndex {
    existing_ids: HashSet<String>,
    postings_count: u64,
    references_count: u64,
}

impl DedupIndex {
    /// Loads the index from the key columns of both tables
    ///
    /// This read is on the critical path: every attempt failing aborts the
    /// run, because continuing with an unknown baseline risks both silent
    /// reprocessing and duplicate row writes.
    pub async fn load(
        store: &dyn TabularStore,
        postings_table: &str,
        references_table: &str,
        policy: &RetryPolicy,
    ) -> Result<Self> {
        let posting_keys = policy
            .run("load posting key column", OnExhaustion::Fatal, move || {
                store.read_key_column(postings_table)
            })
            .await?;

        let reference_keys = policy
            .run(
                "load reference key column",
                OnExhaustion::Fatal,
                move || store.read_key_column(references_table),
            )
            .await?;

        let postings_count = posting_keys.len() as u64;
        let references_count = reference_keys.len() as u64;
        tracing::info!(
            "Dedup index loaded: {} existing postings, {} existing references",
            postings_count,
            references_count
        );

        Ok(Self {
            existing_ids: posting_keys.into_iter().collect(),
            postings_count,
            references_count,
        })
    }

    /// Builds an index directly from known contents (tests, tooling)
    pub fn from_parts(
        existing_ids: HashSet<String>,
        postings_count: u64,
        references_count: u64,
    ) -> Self {
        Self {
            existing_ids,
            postings_count,
            references_count,
        }
    }

    /// Whether `id` was recorded by a prior run
    pub fn contains(&self, id: &str) -> bool {
        self.existing_ids.contains(id)
    }

    /// Row count of the postings table before this run
    pub fn postings_count(&self) -> u64 {
        self.postings_count
    }

    /// Row count of the references table before this run
    pub fn references_count(&self) -> u64 {
        self.references_count
    }
}
