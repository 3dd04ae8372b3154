//! Browser session: login, scroll-to-stable, hyperlink collection
//!
//! One session is opened before discovery and closed once crawling of all
//! items completes. Every wait point draws a uniformly random delay from
//! the policy's jitter range. The randomness is there to avoid a
//! deterministic automated-access signature, not merely to wait for
//! rendering.

use crate::browser::driver::{BrowserDriver, DriverError};
use crate::config::{Credentials, SelectorsConfig, SourceConfig};
use crate::retry::{OnExhaustion, RetryPolicy};
use crate::{HarvestError, Result};
use std::cell::Cell;

/// A single shared browser session over a boxed driver
pub struct BrowserSession {
    driver: Box<dyn BrowserDriver>,
    policy: RetryPolicy,
    selectors: SelectorsConfig,
    authenticated: Cell<bool>,
}

impl BrowserSession {
    pub fn new(
        driver: Box<dyn BrowserDriver>,
        policy: RetryPolicy,
        selectors: SelectorsConfig,
    ) -> Self {
        Self {
            driver,
            policy,
            selectors,
            authenticated: Cell::new(false),
        }
    }

    /// Opens a listing source: navigate, then log in when the source
    /// requires it and the session has not yet authenticated.
    ///
    /// Retried as **fatal**: a session that cannot reach its listing source
    /// aborts the run.
    pub async fn open(
        &self,
        source: &SourceConfig,
        credentials: Option<&Credentials>,
    ) -> Result<()> {
        self.policy
            .run("open listing source", OnExhaustion::Fatal, move || {
                self.try_open(source, credentials)
            })
            .await
    }

    async fn try_open(
        &self,
        source: &SourceConfig,
        credentials: Option<&Credentials>,
    ) -> Result<()> {
        self.driver.navigate(&source.url)?;
        self.policy.pause().await;

        if source.login_required && !self.authenticated.get() {
            let credentials = credentials.ok_or(HarvestError::LoginCredentialsUnavailable)?;
            self.login(credentials).await?;
            self.authenticated.set(true);
            tracing::info!("Logged in at {}", source.url);
        }

        Ok(())
    }

    /// The login sequence: open the login form, fill both credential
    /// fields, submit, with a jittered pause at each step.
    async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.require_interaction(
            &self.selectors.login_open,
            self.driver.click(&self.selectors.login_open)?,
        )?;
        self.policy.pause().await;

        self.require_interaction(
            &self.selectors.login_username,
            self.driver
                .type_into(&self.selectors.login_username, &credentials.username)?,
        )?;
        self.require_interaction(
            &self.selectors.login_password,
            self.driver
                .type_into(&self.selectors.login_password, &credentials.password)?,
        )?;

        self.require_interaction(
            &self.selectors.login_submit,
            self.driver.click(&self.selectors.login_submit)?,
        )?;
        self.policy.pause().await;

        Ok(())
    }

    fn require_interaction(&self, selector: &str, found: bool) -> Result<()> {
        if found {
            Ok(())
        } else {
            Err(DriverError::Element {
                selector: selector.to_string(),
                message: "element not found".to_string(),
            }
            .into())
        }
    }

    /// Scrolls until two consecutive content-height readings are equal
    ///
    /// Retried as **recoverable**: if every attempt fails, the session
    /// keeps whatever content loaded so far; a partial listing is an
    /// acceptable degradation.
    pub async fn scroll_to_stable(&self) {
        let outcome = self
            .policy
            .run(
                "scroll listing to stable height",
                OnExhaustion::Recover,
                move || self.try_scroll(),
            )
            .await;
        if outcome.is_err() {
            tracing::warn!("Proceeding with partially loaded listing");
        }
    }

    async fn try_scroll(&self) -> Result<()> {
        let mut last_height = self.content_height()?;
        loop {
            self.driver
                .evaluate("window.scrollTo(0, document.body.scrollHeight);")?;
            self.policy.pause().await;

            let new_height = self.content_height()?;
            if new_height == last_height {
                return Ok(());
            }
            last_height = new_height;
        }
    }

    fn content_height(&self) -> Result<u64> {
        match self.driver.evaluate("document.body.scrollHeight")? {
            serde_json::Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0) as u64),
            other => Err(DriverError::Script(format!(
                "scrollHeight evaluated to a non-number: {other}"
            ))
            .into()),
        }
    }

    /// Navigates to a detail page and pauses (the mandatory detail-page
    /// wait point). Not retried here; extraction call sites wrap their
    /// whole attempt.
    pub async fn visit(&self, url: &str) -> Result<()> {
        self.driver.navigate(url)?;
        self.policy.pause().await;
        Ok(())
    }

    /// Every anchor target on the current page
    pub fn collect_hyperlinks(&self) -> Result<Vec<String>> {
        self.hyperlinks_matching("a")
    }

    /// Every anchor target inside the element matching `scope`
    pub fn collect_hyperlinks_within(&self, scope: &str) -> Result<Vec<String>> {
        self.hyperlinks_matching(&format!("{scope} a"))
    }

    fn hyperlinks_matching(&self, selector: &str) -> Result<Vec<String>> {
        let literal = serde_json::to_string(selector)
            .map_err(|e| DriverError::Script(e.to_string()))?;
        let script = format!(
            "JSON.stringify(Array.from(document.querySelectorAll({literal}))\
             .map((a) => a.href).filter((h) => h))"
        );

        let value = self.driver.evaluate(&script)?;
        let serde_json::Value::String(json) = value else {
            return Err(DriverError::Script(
                "hyperlink collection returned a non-string".to_string(),
            )
            .into());
        };
        let targets: Vec<String> = serde_json::from_str(&json)
            .map_err(|e| DriverError::Script(format!("malformed hyperlink payload: {e}")))?;
        Ok(targets)
    }

    /// Rendered text of the first element matching `selector`
    pub fn element_text(&self, selector: &str) -> Result<Option<String>> {
        Ok(self.driver.inner_text(selector)?)
    }

    /// Posting body selector configured for this site
    pub fn body_selector(&self) -> &str {
        &self.selectors.posting_body
    }

    /// Releases the browser. Failures are logged, not propagated: by this
    /// point the crawl output is already in memory.
    pub fn close(&self) {
        if let Err(e) = self.driver.close() {
            tracing::warn!("Browser close failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::driver::DriverResult;
    use std::sync::{Arc, Mutex};

    /// Driver that scripts a login page and a growing listing
    struct FakeDriver {
        log: Arc<Mutex<Vec<String>>>,
        heights: Mutex<Vec<u64>>,
        links: Vec<String>,
    }

    impl FakeDriver {
        fn new(heights: Vec<u64>, links: Vec<String>) -> Self {
            Self {
                log: Arc::new(Mutex::new(Vec::new())),
                heights: Mutex::new(heights),
                links,
            }
        }

        fn log(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }
    }

    impl BrowserDriver for FakeDriver {
        fn navigate(&self, url: &str) -> DriverResult<()> {
            self.log(format!("navigate {url}"));
            Ok(())
        }

        fn click(&self, selector: &str) -> DriverResult<bool> {
            self.log(format!("click {selector}"));
            Ok(true)
        }

        fn type_into(&self, selector: &str, text: &str) -> DriverResult<bool> {
            self.log(format!("type {selector}={text}"));
            Ok(true)
        }

        fn inner_text(&self, _selector: &str) -> DriverResult<Option<String>> {
            Ok(Some("body".to_string()))
        }

        fn evaluate(&self, script: &str) -> DriverResult<serde_json::Value> {
            if script.contains("scrollTo") {
                self.log("scroll".to_string());
                return Ok(serde_json::Value::Null);
            }
            if script == "document.body.scrollHeight" {
                let mut heights = self.heights.lock().unwrap();
                let height = if heights.len() > 1 {
                    heights.remove(0)
                } else {
                    heights[0]
                };
                return Ok(serde_json::json!(height));
            }
            if script.contains("querySelectorAll") {
                let json = serde_json::to_string(&self.links).unwrap();
                return Ok(serde_json::Value::String(json));
            }
            Ok(serde_json::Value::Null)
        }

        fn close(&self) -> DriverResult<()> {
            self.log("close".to_string());
            Ok(())
        }
    }

    fn test_session(driver: FakeDriver) -> BrowserSession {
        BrowserSession::new(
            Box::new(driver),
            RetryPolicy::new(3, 0.0, 0.0),
            SelectorsConfig::default(),
        )
    }

    fn login_source(url: &str) -> SourceConfig {
        SourceConfig {
            url: url.to_string(),
            login_required: true,
            item_pattern: "/t/".to_string(),
            exclude: vec![],
        }
    }

    #[tokio::test]
    async fn login_runs_the_full_sequence_at_most_once() {
        let driver = FakeDriver::new(vec![100], vec![]);
        let log_handle = driver.log.clone();
        let session = test_session(driver);
        let credentials = Credentials {
            username: "alice".to_string(),
            password: "s3cret".to_string(),
        };

        let first = login_source("https://forum.example.com/c/jobs");
        let second = login_source("https://forum.example.com/tag/jobs");
        session.open(&first, Some(&credentials)).await.unwrap();
        session.open(&second, Some(&credentials)).await.unwrap();

        assert!(session.authenticated.get());
        let log = log_handle.lock().unwrap().clone();
        let clicks: Vec<&String> = log.iter().filter(|e| e.starts_with("click")).collect();
        assert_eq!(clicks.len(), 2); // login-open + submit, once only
        assert!(log.contains(&"type #login-account-name=alice".to_string()));
        assert!(log.contains(&"type #login-account-password=s3cret".to_string()));
        let navigations = log.iter().filter(|e| e.starts_with("navigate")).count();
        assert_eq!(navigations, 2);
    }

    #[tokio::test]
    async fn open_without_credentials_fails_when_login_required() {
        let driver = FakeDriver::new(vec![100], vec![]);
        let session = test_session(driver);

        let result = session
            .open(&login_source("https://forum.example.com/c/jobs"), None)
            .await;
        assert!(matches!(
            result,
            Err(HarvestError::LoginCredentialsUnavailable)
        ));
    }

    #[tokio::test]
    async fn scroll_stops_when_height_stabilizes() {
        // Heights: 100 -> 250 -> 250 (stable)
        let driver = FakeDriver::new(vec![100, 250, 250], vec![]);
        let session = test_session(driver);

        session.scroll_to_stable().await;
        // Termination is the assertion: a non-stabilizing fake would hang
        // the test.
    }

    #[tokio::test]
    async fn hyperlinks_round_trip_through_json() {
        let links = vec![
            "https://forum.example.com/t/a/1".to_string(),
            "https://forum.example.com/t/b/2".to_string(),
        ];
        let driver = FakeDriver::new(vec![100], links.clone());
        let session = test_session(driver);

        assert_eq!(session.collect_hyperlinks().unwrap(), links);
        assert_eq!(
            session.collect_hyperlinks_within(".cooked").unwrap(),
            links
        );
    }
}
