//! Content module - the categorized tip corpus
//!
//! Loads tip documents from disk or raw bytes, validates them, and serves
//! category listings, per-category lookups, and the most recent record.
//! Loads replace the whole corpus atomically.

pub mod store;
pub mod types;

pub use store::{ContentStore, Corpus};
pub use types::{Tip, TipDocument, TipEntry};
