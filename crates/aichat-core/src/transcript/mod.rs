//! Transcript module.
//!
//! - `store`: the ordered, deduplicated message sequence and its windowing
//! - `merger`: reconciliation of bulk loads, send results and poll results

mod merger;
mod store;

pub use merger::{MergeOutcome, SyncEvent, SyncMerger};
pub use store::TranscriptStore;
