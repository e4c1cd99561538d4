//! Content store holding the tip corpus
//!
//! The corpus is immutable once published: a load builds and validates a
//! complete corpus off to the side, then swaps it in behind an `Arc`.
//! Readers holding a previous snapshot keep serving a consistent view;
//! nobody ever observes a partially loaded corpus.

use crate::content::types::{Tip, TipDocument, TipEntry};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// An immutable, fully indexed set of tips
#[derive(Debug, Default)]
pub struct Corpus {
    tips: Vec<Tip>,
    by_category: HashMap<String, Vec<usize>>,
    categories: Vec<String>,
}

impl Corpus {
    /// Validate document entries and build the category index.
    ///
    /// Fails on the first malformed entry; the caller keeps its current
    /// corpus in that case.
    fn build(entries: Vec<TipEntry>) -> Result<Self> {
        let mut tips = Vec::with_capacity(entries.len());
        let mut by_category: HashMap<String, Vec<usize>> = HashMap::new();
        let mut categories = Vec::new();

        for (position, entry) in entries.into_iter().enumerate() {
            if entry.category.trim().is_empty() {
                return Err(Error::MalformedContent(format!(
                    "entry {}: empty category",
                    position
                )));
            }
            if entry.body.trim().is_empty() {
                return Err(Error::MalformedContent(format!(
                    "entry {}: empty body",
                    position
                )));
            }
            url::Url::parse(&entry.reference_url).map_err(|e| {
                Error::MalformedContent(format!("entry {}: invalid referenceUrl: {}", position, e))
            })?;

            let tip = Tip::from_entry(entry, position as u64);
            if !by_category.contains_key(&tip.category) {
                categories.push(tip.category.clone());
            }
            by_category
                .entry(tip.category.clone())
                .or_default()
                .push(tips.len());
            tips.push(tip);
        }

        Ok(Self {
            tips,
            by_category,
            categories,
        })
    }

    /// All tips in corpus order
    pub fn tips(&self) -> &[Tip] {
        &self.tips
    }

    /// Distinct category labels in first-seen order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The record with the highest position, if any
    pub fn most_recent(&self) -> Option<&Tip> {
        self.tips.last()
    }

    /// All records for a category, in corpus order. Empty if unknown.
    pub fn by_category(&self, category: &str) -> Vec<&Tip> {
        self.by_category
            .get(category)
            .map(|indices| indices.iter().map(|&i| &self.tips[i]).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }
}

/// Content store with swap-on-complete corpus publication
pub struct ContentStore {
    corpus: RwLock<Arc<Corpus>>,
    load_timeout: Duration,
}

impl ContentStore {
    /// Create an empty store; `load_timeout_ms` bounds source reads
    pub fn new(load_timeout_ms: u64) -> Self {
        Self {
            corpus: RwLock::new(Arc::new(Corpus::default())),
            load_timeout: Duration::from_millis(load_timeout_ms),
        }
    }

    /// Load the corpus from a file, replacing the current one on success
    pub async fn load_from_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = tokio::time::timeout(self.load_timeout, tokio::fs::read(path))
            .await
            .map_err(|_| {
                Error::SourceUnavailable(format!("timed out reading {}", path.display()))
            })?
            .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
        self.load_from_slice(&bytes).await
    }

    /// Parse, validate, and publish a corpus from raw document bytes.
    ///
    /// On any parse or validation failure the current corpus stays in place.
    pub async fn load_from_slice(&self, bytes: &[u8]) -> Result<()> {
        let doc: TipDocument = serde_json::from_slice(bytes)
            .map_err(|e| Error::MalformedContent(format!("invalid tip document: {}", e)))?;
        let corpus = Corpus::build(doc.into_entries())?;

        let tips = corpus.len();
        let categories = corpus.categories().len();
        *self.corpus.write().await = Arc::new(corpus);
        tracing::info!(tips, categories, "loaded tip corpus");
        Ok(())
    }

    /// Current corpus snapshot; unaffected by later loads
    pub async fn snapshot(&self) -> Arc<Corpus> {
        self.corpus.read().await.clone()
    }

    /// Distinct category labels in first-seen order
    pub async fn categories(&self) -> Vec<String> {
        self.corpus.read().await.categories().to_vec()
    }

    /// The most recently added record
    pub async fn most_recent(&self) -> Result<Tip> {
        self.corpus
            .read()
            .await
            .most_recent()
            .cloned()
            .ok_or(Error::EmptyCorpus)
    }

    /// All records for a category, in corpus order. Empty if unknown.
    pub async fn by_category(&self, category: &str) -> Vec<Tip> {
        self.corpus
            .read()
            .await
            .by_category(category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.corpus.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.corpus.read().await.is_empty()
    }
}
