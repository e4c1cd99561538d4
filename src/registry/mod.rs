//! Registry module - durable subscription records
//!
//! Tracks which users opted into which notification intents, with the
//! parameters captured at opt-in. Records are persisted as JSON files
//! under `~/.tipcast/subscribers/` before an opt-in is acknowledged.

pub mod store;
pub mod types;

pub use store::SubscriberRegistry;
pub use types::{composite_key, Subscriber, SUBSCRIBER_SCHEMA};
