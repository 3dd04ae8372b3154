//! Magpie-Ledger: an incremental listing harvester
//!
//! This crate implements a sequential crawl/extract/dedup pipeline that
//! discovers new postings on authenticated listing pages, extracts body text
//! and embedded URLs from each new posting, fetches every embedded URL, and
//! appends the results to remote append-only tabular and blob stores. Items
//! recorded by a previous run are never reprocessed.

pub mod browser;
pub mod config;
pub mod pipeline;
pub mod retry;
pub mod state;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

use browser::DriverError;
use storage::StoreError;

/// Main error type for Magpie-Ledger operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser automation error: {0}")]
    Driver(#[from] DriverError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Credential environment variable {var} is not set")]
    MissingCredential { var: String },

    #[error("Source requires login but no credentials were resolved")]
    LoginCredentialsUnavailable,

    #[error("No element matched selector {selector} at {url}")]
    MissingElement { selector: String, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Magpie-Ledger operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use retry::{OnExhaustion, RetryPolicy};
pub use state::{DedupIndex, PostingRecord, ReferenceRecord, FAILURE};
pub use self::url::{canonical_item_url, derive_item_id, extract_urls};
