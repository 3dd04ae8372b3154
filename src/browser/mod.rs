//! Browser automation for listing discovery and detail extraction
//!
//! This module contains:
//! - `BrowserDriver`: the capability trait (navigate, find/click, fill,
//!   script evaluation, close) with element-exists modeled as an explicit
//!   value rather than an exception path
//! - `ChromeDriver`: the production implementation over headless Chrome
//! - `BrowserSession`: login, scroll-to-stable, and hyperlink collection on
//!   top of a driver, with a jittered pause at every wait point

mod chrome;
mod driver;
mod session;

pub use chrome::ChromeDriver;
pub use driver::{BrowserDriver, DriverError, DriverResult};
pub use session::BrowserSession;
