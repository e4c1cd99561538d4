//! Selection engine - random pick per category
//!
//! Resolves the reserved "most recent" label to the newest record; every
//! other label is a uniform random pick over that category's records.

use crate::content::{ContentStore, Tip};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Reserved virtual category resolving to the most recently added record.
///
/// Never present in the corpus index; callers offer it to users alongside
/// the real category labels.
pub const MOST_RECENT_CATEGORY: &str = "most recent";

/// Random tip selector over a content store
pub struct Selector {
    store: Arc<ContentStore>,
    rng: Mutex<StdRng>,
}

impl Selector {
    /// Create a selector seeded from OS entropy
    pub fn new(store: Arc<ContentStore>) -> Self {
        Self {
            store,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a deterministic selector from a fixed seed
    pub fn with_seed(store: Arc<ContentStore>, seed: u64) -> Self {
        Self {
            store,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Pick a record for the given category label.
    ///
    /// The "most recent" label resolves through the store's recency
    /// accessor; any other label is a uniform random pick over the
    /// category's records. Repeated calls are independent.
    pub async fn pick(&self, category: &str) -> Result<Tip> {
        if category == MOST_RECENT_CATEGORY {
            return self.store.most_recent().await;
        }

        let mut matches = self.store.by_category(category).await;
        if matches.is_empty() {
            return Err(Error::UnknownCategory(category.to_string()));
        }

        let index = self.rng.lock().await.gen_range(0..matches.len());
        Ok(matches.swap_remove(index))
    }
}
