//! Run state: produced records and the dedup snapshot
//!
//! # Components
//!
//! - `PostingRecord` / `ReferenceRecord`: the two record shapes a run
//!   produces, with explicit success/failure outcomes instead of
//!   position-indexed fields
//! - `DedupIndex`: the immutable snapshot of previously persisted keys and
//!   row counts, loaded once at startup

mod dedup;
mod records;

pub use dedup::DedupIndex;
pub use records::{
    ExtractionOutcome, FetchOutcome, PostingRecord, ReferenceRecord, FAILURE,
};
