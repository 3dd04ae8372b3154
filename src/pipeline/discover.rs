//! Listing discovery
//!
//! Walks a listing source in the shared browser session, scrolls it until
//! its height stabilizes, and harvests every hyperlink that looks like an
//! item detail page. The result is a set of canonical item URLs: reply
//! anchors and other per-fragment variants of the same item collapse to
//! one entry before any dedup or fetching happens.

use crate::browser::BrowserSession;
use crate::config::SourceConfig;
use crate::retry::OnExhaustion;
use crate::url::canonical_item_url;
use crate::{Config, Credentials, Result};
use std::collections::BTreeSet;

/// Discovers canonical item URLs across all configured listing sources
pub struct ListingDiscoverer<'a> {
    session: &'a BrowserSession,
    config: &'a Config,
    credentials: Option<&'a Credentials>,
}

impl<'a> ListingDiscoverer<'a> {
    pub fn new(
        session: &'a BrowserSession,
        config: &'a Config,
        credentials: Option<&'a Credentials>,
    ) -> Self {
        Self {
            session,
            config,
            credentials,
        }
    }

    /// Visits every source and returns the union of their item URLs
    pub async fn discover(&self) -> Result<BTreeSet<String>> {
        let mut items = BTreeSet::new();
        for source in &self.config.sources {
            let found = self.discover_source(source).await?;
            tracing::info!("{}: {} item URLs", source.url, found.len());
            items.extend(found);
        }
        tracing::info!("Discovered {} distinct items across all sources", items.len());
        Ok(items)
    }

    async fn discover_source(&self, source: &SourceConfig) -> Result<BTreeSet<String>> {
        self.session.open(source, self.credentials).await?;
        self.session.scroll_to_stable().await;

        let policy = self.config.retry_policy();
        let session = self.session;
        let hyperlinks = policy
            .run("collect listing hyperlinks", OnExhaustion::Fatal, move || async move {
                session.collect_hyperlinks()
            })
            .await?;

        Ok(hyperlinks
            .iter()
            .filter(|href| Self::matches(source, href))
            .map(|href| canonical_item_url(href))
            .collect())
    }

    /// An href is an item link when it contains the source's item pattern
    /// and none of its exclusion substrings.
    fn matches(source: &SourceConfig, href: &str) -> bool {
        href.contains(&source.item_pattern)
            && !source.exclude.iter().any(|frag| href.contains(frag))
    }
}
