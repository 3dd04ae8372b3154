//! URL handling for the harvester
//!
//! This module provides the three URL routines the pipeline shares:
//!
//! - `canonical_item_url`: collapses reply-index URLs onto their canonical
//!   item URL
//! - `derive_item_id`: total id derivation with a random placeholder
//!   fallback for malformed URLs
//! - `extract_urls`: pattern-matches http(s) URLs out of free text

mod extract;
mod normalize;

pub use extract::extract_urls;
pub use normalize::{canonical_item_url, derive_item_id, ItemId};
