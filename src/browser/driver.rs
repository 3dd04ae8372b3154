//! Browser driver capability trait

use thiserror::Error;

/// Errors that can occur during browser automation
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Interaction with `{selector}` failed: {message}")]
    Element { selector: String, message: String },

    #[error("Failed to close browser session: {0}")]
    Close(String),
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// The capability set the pipeline needs from a browser
///
/// Element presence is part of the return value: `click` and `type_into`
/// report `false` for a missing element, `inner_text` reports `None`. An
/// `Err` means the browser itself misbehaved, not that a selector found
/// nothing.
pub trait BrowserDriver: Send {
    /// Navigates to `url` and waits for the load to settle
    fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Clicks the first element matching `selector`; `false` when absent
    fn click(&self, selector: &str) -> DriverResult<bool>;

    /// Types `text` into the first element matching `selector`; `false`
    /// when absent
    fn type_into(&self, selector: &str, text: &str) -> DriverResult<bool>;

    /// Rendered text of the first element matching `selector`
    fn inner_text(&self, selector: &str) -> DriverResult<Option<String>>;

    /// Evaluates a script in the page and returns its JSON value
    ///
    /// Non-primitive results must be serialized in the page (e.g. via
    /// `JSON.stringify`); the wire only carries JSON values.
    fn evaluate(&self, script: &str) -> DriverResult<serde_json::Value>;

    /// Closes the session; must be called at most once
    fn close(&self) -> DriverResult<()>;
}
