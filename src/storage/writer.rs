//! Append-only persistence of harvest records
//!
//! Row appends are classified fatal: losing a row after the network work
//! that produced it is the one failure the run cannot absorb. Blob uploads
//! are best-effort; the row is the ledger, the blob is the attachment.

use crate::config::StoreConfig;
use crate::retry::{OnExhaustion, RetryPolicy};
use crate::state::{PostingRecord, ReferenceRecord};
use crate::storage::traits::{BlobStore, TabularStore};
use crate::Result;

const TEXT_MIME: &str = "text/plain";

/// Writes posting and reference records to the tabular and blob stores
pub struct PersistenceWriter<'a> {
    tables: &'a dyn TabularStore,
    blobs: &'a dyn BlobStore,
    policy: &'a RetryPolicy,
    store: &'a StoreConfig,
}

impl<'a> PersistenceWriter<'a> {
    pub fn new(
        tables: &'a dyn TabularStore,
        blobs: &'a dyn BlobStore,
        policy: &'a RetryPolicy,
        store: &'a StoreConfig,
    ) -> Self {
        Self {
            tables,
            blobs,
            policy,
            store,
        }
    }

    /// Appends posting rows starting immediately after `existing` rows
    ///
    /// Failed extractions are written too, as permanent sentinel rows;
    /// each one is logged so an operator can follow up by hand.
    pub async fn append_postings(
        &self,
        existing: u64,
        records: &[PostingRecord],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        for record in records.iter().filter(|r| r.is_failed()) {
            tracing::warn!(
                "Posting {} recorded as permanently failed ({})",
                record.id,
                record.url
            );
        }

        let rows: Vec<Vec<String>> = records.iter().map(PostingRecord::row).collect();
        self.append(&self.store.postings_table, existing, &rows)
            .await
    }

    /// Appends reference rows starting immediately after `existing` rows
    pub async fn append_references(
        &self,
        existing: u64,
        records: &[ReferenceRecord],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        for record in records.iter().filter(|r| r.is_failed()) {
            tracing::warn!(
                "Reference {} of posting {} recorded as permanently failed ({})",
                record.sequence_id,
                record.posting_id,
                record.reference_url
            );
        }

        let rows: Vec<Vec<String>> = records.iter().map(ReferenceRecord::row).collect();
        self.append(&self.store.references_table, existing, &rows)
            .await
    }

    async fn append(&self, table: &str, existing: u64, rows: &[Vec<String>]) -> Result<()> {
        // Row offsets are 1-based; the first free row sits right after the
        // rows already present.
        let start_row = existing + 1;
        let label = format!("append {} rows to {table}", rows.len());
        self.policy
            .run(&label, OnExhaustion::Fatal, move || async move {
                self.tables
                    .append_rows(table, start_row, rows)
                    .await
                    .map_err(crate::HarvestError::from)
            })
            .await?;
        tracing::info!("Appended {} rows to {} at row {}", rows.len(), table, start_row);
        Ok(())
    }

    /// Uploads one body-text blob per posting. Failed extractions get a
    /// sentinel blob so the blob set stays aligned with the rows.
    pub async fn upload_posting_blobs(&self, records: &[PostingRecord]) {
        for record in records {
            let filename = format!("{}_text.txt", record.id);
            self.upload(&self.store.postings_folder, &filename, record.body_blob())
                .await;
        }
    }

    /// Uploads raw-source and derived-text blobs per reference
    pub async fn upload_reference_blobs(&self, records: &[ReferenceRecord]) {
        for record in records {
            let source_name = format!("{}_source.txt", record.sequence_id);
            let text_name = format!("{}_text.txt", record.sequence_id);
            self.upload(&self.store.references_folder, &source_name, record.source_blob())
                .await;
            self.upload(&self.store.references_folder, &text_name, record.text_blob())
                .await;
        }
    }

    /// Best-effort blob upload: exhaustion is logged and swallowed so one
    /// sick blob never blocks the rest of the batch.
    async fn upload(&self, folder: &str, filename: &str, content: &str) {
        let label = format!("upload blob {folder}/{filename}");
        let outcome = self
            .policy
            .run(&label, OnExhaustion::Recover, move || async move {
                self.blobs
                    .put(folder, filename, content, TEXT_MIME)
                    .await
                    .map_err(crate::HarvestError::from)
            })
            .await;
        if outcome.is_err() {
            tracing::warn!("Blob {}/{} was not uploaded", folder, filename);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ExtractionOutcome, FetchOutcome};
    use crate::storage::traits::{StoreError, StoreResult};
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        appends: Mutex<Vec<(String, u64, Vec<Vec<String>>)>>,
        blobs: Mutex<Vec<(String, String, String)>>,
        fail_blobs: bool,
    }

    #[async_trait]
    impl TabularStore for RecordingStore {
        async fn read_key_column(&self, _table: &str) -> StoreResult<Vec<String>> {
            Ok(vec![])
        }

        async fn append_rows(
            &self,
            table: &str,
            start_row: u64,
            rows: &[Vec<String>],
        ) -> StoreResult<()> {
            self.appends
                .lock()
                .unwrap()
                .push((table.to_string(), start_row, rows.to_vec()));
            Ok(())
        }
    }

    #[async_trait]
    impl BlobStore for RecordingStore {
        async fn put(
            &self,
            folder: &str,
            filename: &str,
            content: &str,
            _mime_type: &str,
        ) -> StoreResult<()> {
            if self.fail_blobs {
                return Err(StoreError::Status {
                    status: 503,
                    url: format!("{folder}/{filename}"),
                });
            }
            self.blobs.lock().unwrap().push((
                folder.to_string(),
                filename.to_string(),
                content.to_string(),
            ));
            Ok(())
        }
    }

    fn store_config() -> StoreConfig {
        StoreConfig {
            base_url: "http://store.test".to_string(),
            api_token_env: None,
            postings_table: "postings".to_string(),
            references_table: "references".to_string(),
            postings_folder: "posting-texts".to_string(),
            references_folder: "reference-pages".to_string(),
        }
    }

    fn extracted_posting(id: &str) -> PostingRecord {
        PostingRecord {
            id: id.to_string(),
            url: format!("https://forum.example.com/t/x/{id}"),
            discovered_at: "2026-08-27 10:00:00".to_string(),
            extraction: ExtractionOutcome::Extracted {
                embedded_urls: BTreeSet::new(),
                body_text: format!("body of {id}"),
            },
            placeholder_id: false,
        }
    }

    #[tokio::test]
    async fn postings_append_at_first_free_row() {
        let store = RecordingStore::default();
        let policy = RetryPolicy::new(1, 0.0, 0.0);
        let cfg = store_config();
        let writer = PersistenceWriter::new(&store, &store, &policy, &cfg);

        let records = vec![extracted_posting("101"), extracted_posting("102")];
        writer.append_postings(7, &records).await.unwrap();

        let appends = store.appends.lock().unwrap();
        assert_eq!(appends.len(), 1);
        let (table, start_row, rows) = &appends[0];
        assert_eq!(table, "postings");
        assert_eq!(*start_row, 8);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "101");
    }

    #[tokio::test]
    async fn empty_batches_write_nothing() {
        let store = RecordingStore::default();
        let policy = RetryPolicy::new(1, 0.0, 0.0);
        let cfg = store_config();
        let writer = PersistenceWriter::new(&store, &store, &policy, &cfg);

        writer.append_postings(3, &[]).await.unwrap();
        writer.append_references(3, &[]).await.unwrap();
        assert!(store.appends.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_postings_get_sentinel_blob() {
        let store = RecordingStore::default();
        let policy = RetryPolicy::new(1, 0.0, 0.0);
        let cfg = store_config();
        let writer = PersistenceWriter::new(&store, &store, &policy, &cfg);

        let mut failed = extracted_posting("103");
        failed.extraction = ExtractionOutcome::Failed;
        let records = vec![extracted_posting("101"), failed];
        writer.upload_posting_blobs(&records).await;

        let blobs = store.blobs.lock().unwrap();
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].1, "101_text.txt");
        assert_eq!(blobs[0].2, "body of 101");
        assert_eq!(blobs[1].1, "103_text.txt");
        assert_eq!(blobs[1].2, crate::state::FAILURE);
    }

    #[tokio::test]
    async fn reference_blobs_use_sequence_id_names() {
        let store = RecordingStore::default();
        let policy = RetryPolicy::new(1, 0.0, 0.0);
        let cfg = store_config();
        let writer = PersistenceWriter::new(&store, &store, &policy, &cfg);

        let record = ReferenceRecord {
            sequence_id: 42,
            posting_id: "101".to_string(),
            posting_url: "https://forum.example.com/t/x/101".to_string(),
            reference_url: "https://example.com/about".to_string(),
            fetched_at: "2026-08-27 10:00:00".to_string(),
            fetch: FetchOutcome::Fetched {
                raw_source: "<html>hi</html>".to_string(),
                derived_text: "hi".to_string(),
            },
        };
        writer.upload_reference_blobs(&[record]).await;

        let blobs = store.blobs.lock().unwrap();
        let names: Vec<&str> = blobs.iter().map(|(_, n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["42_source.txt", "42_text.txt"]);
    }

    #[tokio::test]
    async fn blob_failures_are_swallowed() {
        let store = RecordingStore {
            fail_blobs: true,
            ..Default::default()
        };
        let policy = RetryPolicy::new(2, 0.0, 0.0);
        let cfg = store_config();
        let writer = PersistenceWriter::new(&store, &store, &policy, &cfg);

        // Must return normally despite every put failing.
        writer.upload_posting_blobs(&[extracted_posting("101")]).await;
    }
}
