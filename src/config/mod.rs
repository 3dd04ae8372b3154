//! Configuration: TOML file format, parsing, and validation
//!
//! A harvest run is configured by a single TOML file naming the listing
//! sources, the retry policy, the CSS selector set, and the store
//! endpoints. Secrets are never written to the file; credentials and API
//! tokens are named indirectly through environment variable names.

mod credentials;
mod parser;
mod types;
mod validation;

pub use credentials::{resolve_credentials, resolve_store_token, Credentials};
pub use parser::load_config;
pub use types::{
    Config, CredentialsConfig, RetryConfig, RunConfig, SelectorsConfig, SourceConfig, StoreConfig,
};
pub use validation::validate_config;
