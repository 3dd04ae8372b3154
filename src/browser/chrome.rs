//! Headless Chrome implementation of the driver trait

use crate::browser::driver::{BrowserDriver, DriverError, DriverResult};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;

/// Browser driver backed by a headless Chrome instance with a single tab
///
/// The browser process is released when the driver is dropped; `close` is
/// the explicit path and drop is the backstop.
pub struct ChromeDriver {
    // Kept alive for the lifetime of the tab
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    /// Launches a headless browser and opens its single tab
    pub fn launch() -> DriverResult<Self> {
        let browser = Browser::new(LaunchOptions {
            headless: true,
            ..Default::default()
        })
        .map_err(|e| DriverError::Launch(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl BrowserDriver for ChromeDriver {
    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn click(&self, selector: &str) -> DriverResult<bool> {
        let element = match self.tab.find_element(selector) {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };
        element.click().map_err(|e| DriverError::Element {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;
        Ok(true)
    }

    fn type_into(&self, selector: &str, text: &str) -> DriverResult<bool> {
        let element = match self.tab.find_element(selector) {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };
        // Click to focus, then type into the focused field
        element
            .click()
            .and_then(|_| self.tab.type_str(text))
            .map_err(|e| DriverError::Element {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        Ok(true)
    }

    fn inner_text(&self, selector: &str) -> DriverResult<Option<String>> {
        let literal = serde_json::to_string(selector)
            .map_err(|e| DriverError::Script(e.to_string()))?;
        let script = format!(
            "(() => {{ const el = document.querySelector({literal}); \
             return el ? el.innerText : null; }})()"
        );
        match self.evaluate(&script)? {
            serde_json::Value::String(text) => Ok(Some(text)),
            _ => Ok(None),
        }
    }

    fn evaluate(&self, script: &str) -> DriverResult<serde_json::Value> {
        let object = self
            .tab
            .evaluate(script, false)
            .map_err(|e| DriverError::Script(e.to_string()))?;
        Ok(object.value.unwrap_or(serde_json::Value::Null))
    }

    fn close(&self) -> DriverResult<()> {
        self.tab
            .close(true)
            .map_err(|e| DriverError::Close(e.to_string()))?;
        Ok(())
    }
}
