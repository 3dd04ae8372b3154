//! Persistence backends and the append-only writer
//!
//! Two storage surfaces back a harvest run:
//!
//! - A tabular store holding one row per posting and one row per embedded
//!   reference, appended at explicit row offsets.
//! - A blob store holding the extracted page texts as plain-text documents.
//!
//! Both are expressed as traits so the pipeline and its tests never touch
//! the HTTP client directly; [`RestStore`] is the production implementation.

mod rest;
mod traits;
mod writer;

pub use rest::RestStore;
pub use traits::{BlobStore, StoreError, StoreResult, TabularStore};
pub use writer::PersistenceWriter;
