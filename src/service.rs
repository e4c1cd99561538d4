//! Tip service facade
//!
//! `TipService` wires the content store, selector, subscriber registry, and
//! dispatcher together behind the operation surface the orchestrating layer
//! consumes. It holds no conversation state and formats no user-facing text.

use crate::config::TipcastConfig;
use crate::content::{ContentStore, Tip};
use crate::dispatch::{DispatchReport, Dispatcher, PushTransport};
use crate::error::Result;
use crate::registry::{Subscriber, SubscriberRegistry};
use crate::selection::Selector;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Tip corpus shipped with the binary; used when no source path is configured
pub const BUNDLED_TIPS: &[u8] = include_bytes!("../data/tips.json");

/// The assembled tip and subscription service
pub struct TipService {
    config: TipcastConfig,
    content: Arc<ContentStore>,
    selector: Selector,
    registry: Arc<SubscriberRegistry>,
    dispatcher: Dispatcher,
}

impl TipService {
    /// Assemble the service from config and a push transport.
    ///
    /// Opens (or creates) the subscriber registry and loads the configured
    /// corpus source, so a constructed service is immediately usable.
    pub async fn new(config: TipcastConfig, transport: Arc<dyn PushTransport>) -> Result<Self> {
        let content = Arc::new(ContentStore::new(config.content.load_timeout_ms));
        let selector = match config.selection.seed {
            Some(seed) => Selector::with_seed(content.clone(), seed),
            None => Selector::new(content.clone()),
        };

        let registry_dir = config
            .registry
            .dir
            .clone()
            .unwrap_or_else(SubscriberRegistry::default_dir);
        let registry = Arc::new(SubscriberRegistry::new(registry_dir).await?);
        let dispatcher = Dispatcher::new(registry.clone(), transport);

        let service = Self {
            config,
            content,
            selector,
            registry,
            dispatcher,
        };
        service.reload().await?;
        Ok(service)
    }

    /// Re-load the corpus from the configured source, replacing the current
    /// one wholesale. Safe to call repeatedly.
    pub async fn reload(&self) -> Result<()> {
        match &self.config.content.source_path {
            Some(path) => self.content.load_from_path(path).await,
            None => self.content.load_from_slice(BUNDLED_TIPS).await,
        }
    }

    /// Replace the corpus from an explicit file
    pub async fn load_content(&self, path: impl AsRef<Path>) -> Result<()> {
        self.content.load_from_path(path).await
    }

    /// Replace the corpus from raw document bytes
    pub async fn load_content_slice(&self, bytes: &[u8]) -> Result<()> {
        self.content.load_from_slice(bytes).await
    }

    /// Category labels in first-seen order
    pub async fn list_categories(&self) -> Vec<String> {
        self.content.categories().await
    }

    /// Random tip for a category label ("most recent" included)
    pub async fn pick_content(&self, category: &str) -> Result<Tip> {
        self.selector.pick(category).await
    }

    /// The most recently added tip
    pub async fn most_recent_content(&self) -> Result<Tip> {
        self.content.most_recent().await
    }

    /// Opt a user into a notification intent. Idempotent; durable before
    /// it returns.
    pub async fn subscribe(
        &self,
        user_id: &str,
        intent: &str,
        parameters: BTreeMap<String, String>,
    ) -> Result<()> {
        self.registry.subscribe(user_id, intent, parameters).await
    }

    /// Opt a user out. Unknown subscriptions are a no-op.
    pub async fn unsubscribe(
        &self,
        user_id: &str,
        intent: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<()> {
        self.registry.unsubscribe(user_id, intent, parameters).await
    }

    /// Snapshot of the subscribers registered for an intent
    pub async fn subscribers_for(&self, intent: &str) -> Result<Vec<Subscriber>> {
        self.registry.subscribers_for(intent).await
    }

    /// Notify every subscriber of an intent; per-subscriber failures end up
    /// in the report, never as an error
    pub async fn dispatch_notifications(
        &self,
        intent: &str,
        title_template: &str,
    ) -> Result<DispatchReport> {
        self.dispatcher.dispatch(intent, title_template).await
    }

    /// Service configuration
    pub fn config(&self) -> &TipcastConfig {
        &self.config
    }
}
