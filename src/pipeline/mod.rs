//! The harvest pipeline
//!
//! A run is three strictly sequential phases:
//!
//! 1. **Discovery**: walk each configured listing source in a shared
//!    browser session and collect canonical item URLs.
//! 2. **Extraction**: visit each not-yet-seen item's detail page and pull
//!    its body text and embedded URLs.
//! 3. **References**: fetch each embedded URL over plain HTTP, then
//!    persist everything in one append pass per table.
//!
//! The browser session is closed between phases 2 and 3; reference
//! fetching never touches the browser.

mod coordinator;
mod discover;
mod extract;
mod references;

pub use coordinator::{run_harvest, Coordinator, RunSummary};
pub use discover::ListingDiscoverer;
pub use extract::ItemExtractor;
pub use references::ReferenceFetcher;
