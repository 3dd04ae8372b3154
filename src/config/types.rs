//! Configuration file structure
//!
//! Field names use kebab-case in the TOML file. Defaults target a
//! Discourse-style forum; any field can be overridden per deployment.

use crate::retry::RetryPolicy;
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub selectors: SelectorsConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    pub store: StoreConfig,
    #[serde(rename = "source")]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// The retry policy every retried call site in the run shares
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.retry)
    }
}

/// Run-wide limits
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Cap on new items extracted per run; `0` means unlimited
    #[serde(rename = "max-items", default)]
    pub max_items: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { max_items: 0 }
    }
}

/// Retry attempt count and jitter range, shared by every retried call
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Lower bound of the uniform inter-request delay, in seconds
    #[serde(rename = "delay-min-secs", default = "default_delay_min")]
    pub delay_min_secs: f64,
    /// Upper bound of the uniform inter-request delay, in seconds
    #[serde(rename = "delay-max-secs", default = "default_delay_max")]
    pub delay_max_secs: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_delay_min() -> f64 {
    2.0
}

fn default_delay_max() -> f64 {
    5.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_min_secs: default_delay_min(),
            delay_max_secs: default_delay_max(),
        }
    }
}

/// CSS selectors for the login flow and the posting body
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectorsConfig {
    /// Element that opens the login form
    #[serde(rename = "login-open", default = "default_login_open")]
    pub login_open: String,
    #[serde(rename = "login-username", default = "default_login_username")]
    pub login_username: String,
    #[serde(rename = "login-password", default = "default_login_password")]
    pub login_password: String,
    #[serde(rename = "login-submit", default = "default_login_submit")]
    pub login_submit: String,
    /// Container holding a posting's rendered body text
    #[serde(rename = "posting-body", default = "default_posting_body")]
    pub posting_body: String,
}

fn default_login_open() -> String {
    ".login-button".to_string()
}

fn default_login_username() -> String {
    "#login-account-name".to_string()
}

fn default_login_password() -> String {
    "#login-account-password".to_string()
}

fn default_login_submit() -> String {
    "#login-button".to_string()
}

fn default_posting_body() -> String {
    ".cooked".to_string()
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            login_open: default_login_open(),
            login_username: default_login_username(),
            login_password: default_login_password(),
            login_submit: default_login_submit(),
            posting_body: default_posting_body(),
        }
    }
}

/// Environment variable names holding the login credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    #[serde(rename = "username-env", default = "default_username_env")]
    pub username_env: String,
    #[serde(rename = "password-env", default = "default_password_env")]
    pub password_env: String,
}

fn default_username_env() -> String {
    "HARVEST_USERNAME".to_string()
}

fn default_password_env() -> String {
    "HARVEST_PASSWORD".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username_env: default_username_env(),
            password_env: default_password_env(),
        }
    }
}

/// Tabular/blob store endpoints and table names
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,
    /// Environment variable holding the store API token, when the store
    /// requires one
    #[serde(rename = "api-token-env", default)]
    pub api_token_env: Option<String>,
    #[serde(rename = "postings-table", default = "default_postings_table")]
    pub postings_table: String,
    #[serde(rename = "references-table", default = "default_references_table")]
    pub references_table: String,
    #[serde(rename = "postings-folder", default = "default_postings_folder")]
    pub postings_folder: String,
    #[serde(rename = "references-folder", default = "default_references_folder")]
    pub references_folder: String,
}

fn default_postings_table() -> String {
    "postings".to_string()
}

fn default_references_table() -> String {
    "references".to_string()
}

fn default_postings_folder() -> String {
    "posting-texts".to_string()
}

fn default_references_folder() -> String {
    "reference-pages".to_string()
}

/// One listing source to walk
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
    /// Whether this source sits behind the login flow
    #[serde(rename = "login-required", default)]
    pub login_required: bool,
    /// Substring an href must contain to count as an item link
    #[serde(rename = "item-pattern")]
    pub item_pattern: String,
    /// Substrings that disqualify an href even when the pattern matches
    #[serde(default)]
    pub exclude: Vec<String>,
}
