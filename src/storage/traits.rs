//! Store traits and error types
//!
//! The pipeline talks to two remote collaborators: a tabular store holding
//! the postings and references tables, and a blob store holding text and
//! source payloads. Both are behind traits so tests can substitute
//! recording fakes.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Store returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Malformed store response from {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("Failed to build store client: {0}")]
    Client(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A remote tabular store of append-only tables
///
/// The writer contract is positional: `append_rows` must write starting
/// exactly at `start_row` (1-based) and must never touch earlier rows.
/// Nothing here is transactional: two concurrent runs against the same
/// table can race on the append offset. Sequential single-instance
/// execution is an operating assumption, not something this trait enforces.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Reads the full first-column contents of `table`, in row order
    async fn read_key_column(&self, table: &str) -> StoreResult<Vec<String>>;

    /// Appends `rows` starting exactly at `start_row` (1-based)
    async fn append_rows(
        &self,
        table: &str,
        start_row: u64,
        rows: &[Vec<String>],
    ) -> StoreResult<()>;
}

/// A remote blob store of named folders
///
/// `put` performs no existence check: re-running the same filename produces
/// a duplicate blob, not an overwrite.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        folder: &str,
        filename: &str,
        content: &str,
        mime_type: &str,
    ) -> StoreResult<()>;
}
