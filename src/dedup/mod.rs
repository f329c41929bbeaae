//! Deduplication module.
//!
//! Provides:
//! - The resume ledger of processed posts
//! - Completed-URL tracking shared across download tasks
//! - URL hashing for filenames

pub mod hash;
pub mod ledger;
pub mod tracker;

pub use hash::url_hash;
pub use ledger::{ResumeLedger, LEDGER_FILENAME};
pub use tracker::CompletedUrls;
