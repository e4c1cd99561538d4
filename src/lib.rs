//! Tipcast - categorized tip delivery and push subscriptions
//!
//! Tipcast is the content and notification core of a conversational
//! assistant: it serves random tips per category from a replaceable
//! corpus, keeps a durable registry of users who opted into notification
//! intents, and fans notifications out to them concurrently.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Orchestrating layer (CLI)                │
//! │   intent -> operation mapping, user-facing prompt text   │
//! └────────────────────────────┬────────────────────────────┘
//!                              │
//! ┌────────────────────────────▼────────────────────────────┐
//! │                        TipService                        │
//! │  ┌──────────────┐  ┌──────────┐  ┌───────────────────┐  │
//! │  │ ContentStore │  │ Selector │  │ SubscriberRegistry│  │
//! │  │ swap-on-     │  │ seedable │  │ JSON file per     │  │
//! │  │ complete     │  │ random   │  │ record, durable   │  │
//! │  │ corpus       │  │ pick     │  │ before ack        │  │
//! │  └──────────────┘  └──────────┘  └─────────┬─────────┘  │
//! │                                            │            │
//! │  ┌─────────────────────────────────────────▼─────────┐  │
//! │  │                    Dispatcher                      │  │
//! │  │  - Snapshot the subscriber set per round           │  │
//! │  │  - Send to every subscriber concurrently           │  │
//! │  │  - Aggregate outcomes into a DispatchReport        │  │
//! │  └─────────────────────────┬──────────────────────────┘  │
//! └────────────────────────────┼─────────────────────────────┘
//!                              │ PushTransport
//!                   ┌──────────▼──────────┐
//!                   │ HTTP push endpoint  │
//!                   │ (or log transport)  │
//!                   └─────────────────────┘
//! ```
//!
//! ## Key Features
//!
//! ### Categorized Tip Corpus
//! - Corpus loads replace the whole corpus or nothing
//! - Readers keep a consistent snapshot across reloads
//! - Reserved "most recent" label for the newest entry
//!
//! ### Durable Subscriptions
//! - One JSON file per (user, intent, parameters) record
//! - Records reach disk before an opt-in is acknowledged
//! - Idempotent opt-in, no-op opt-out for unknown records
//!
//! ### Notification Fan-Out
//! - Concurrent sends with per-subscriber failure isolation
//! - Partial failure is report data, not an error
//!
//! ## Modules
//!
//! - [`content`]: tip corpus loading, validation, and indexed lookups
//! - [`selection`]: random per-category picks and the "most recent" label
//! - [`registry`]: durable subscriber records and their persistence
//! - [`dispatch`]: notification fan-out and the push transport seam
//! - [`service`]: the facade wiring the components together
//! - [`config`]: configuration management and the prompt catalog

pub mod config;
pub mod content;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod selection;
pub mod service;

pub use config::TipcastConfig;
pub use error::{Error, Result};
pub use service::TipService;
