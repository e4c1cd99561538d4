//! Subscriber registry with file-based JSON persistence
//!
//! Directory layout:
//! ```text
//! ~/.tipcast/subscribers/
//! ├── <composite-key>.json
//! └── ...
//! ```
//!
//! A new record reaches disk before `subscribe` returns: serialize, write a
//! temp file, rename into place. A failed write leaves the directory and
//! the in-memory set unchanged, so a success means the opt-in survives a
//! restart.

use crate::error::{Error, Result};
use crate::registry::types::Subscriber;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory subscriber registry backed by JSON files
pub struct SubscriberRegistry {
    dir: PathBuf,
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl SubscriberRegistry {
    /// Open (or create) a registry at the given directory
    pub async fn new(dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Persistence(format!("create {}: {}", dir.display(), e)))?;

        let registry = Self {
            dir,
            subscribers: Arc::new(RwLock::new(Vec::new())),
        };

        registry.load_from_disk().await;
        Ok(registry)
    }

    /// Default registry directory (~/.tipcast/subscribers/)
    pub fn default_dir() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tipcast")
            .join("subscribers")
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register (user, intent, parameters).
    ///
    /// Idempotent: an existing identical subscription is a no-op. A new
    /// record is persisted before this returns `Ok`.
    pub async fn subscribe(
        &self,
        user_id: &str,
        intent: &str,
        parameters: BTreeMap<String, String>,
    ) -> Result<()> {
        let mut subscribers = self.subscribers.write().await;
        if subscribers
            .iter()
            .any(|s| s.matches(user_id, intent, &parameters))
        {
            tracing::debug!(user_id, intent, "subscription already present");
            return Ok(());
        }

        let record = Subscriber::new(user_id.to_string(), intent.to_string(), parameters);
        self.persist(&record).await?;
        subscribers.push(record);
        tracing::info!(user_id, intent, "subscribed");
        Ok(())
    }

    /// Remove the matching subscription and its file.
    ///
    /// Removing an unknown subscription is a no-op.
    pub async fn unsubscribe(
        &self,
        user_id: &str,
        intent: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<()> {
        let mut subscribers = self.subscribers.write().await;
        let Some(index) = subscribers
            .iter()
            .position(|s| s.matches(user_id, intent, parameters))
        else {
            tracing::debug!(user_id, intent, "no matching subscription");
            return Ok(());
        };

        let path = self.record_path(&subscribers[index].key());
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Persistence(format!(
                    "remove {}: {}",
                    path.display(),
                    e
                )))
            }
        }
        subscribers.remove(index);
        tracing::info!(user_id, intent, "unsubscribed");
        Ok(())
    }

    /// Subscribers registered for an intent, in opt-in order.
    ///
    /// The returned Vec is a point-in-time snapshot; concurrent mutations
    /// never alter it.
    pub async fn subscribers_for(&self, intent: &str) -> Result<Vec<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers
            .iter()
            .filter(|s| s.intent == intent)
            .cloned()
            .collect())
    }

    /// All subscriptions, in opt-in order
    pub async fn all(&self) -> Vec<Subscriber> {
        self.subscribers.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Load all records from disk, ordered by opt-in time
    async fn load_from_disk(&self) {
        let mut records = Self::load_json_files(&self.dir);
        records.sort_by_key(|s: &Subscriber| s.created_at);

        let count = records.len();
        *self.subscribers.write().await = records;
        if count > 0 {
            tracing::info!(count, "loaded subscriber registry");
        }
    }

    /// Load all JSON files from a directory into a Vec, skipping files that
    /// fail to read or parse
    fn load_json_files<T: serde::de::DeserializeOwned>(dir: &Path) -> Vec<T> {
        let mut items = Vec::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
                }
                return items;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                }
            }
        }

        items
    }

    /// Write a record to `<key>.json` via a temp file and rename, so the
    /// file is either fully present or absent
    async fn persist(&self, record: &Subscriber) -> Result<()> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| Error::Persistence(format!("serialize {}: {}", record.key(), e)))?;

        let path = self.record_path(&record.key());
        let tmp = self.dir.join(format!("{}.json.tmp", record.key()));
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| Error::Persistence(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::Persistence(format!("rename {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}
