//! Tip content types
//!
//! Wire types for the tip corpus document. All types use camelCase JSON
//! serialization, matching the corpus file format.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A single tip record, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    /// Stable content-derived identifier
    pub id: String,
    /// Category label the tip belongs to
    pub category: String,
    /// Tip text
    pub body: String,
    /// Where to read more
    pub reference_url: String,
    /// Insertion index in the corpus; the highest position is "most recent"
    pub position: u64,
}

impl Tip {
    /// Build a tip from a document entry at the given corpus position.
    ///
    /// Ids are derived from the entry content, so reloading an identical
    /// source yields identical ids.
    pub fn from_entry(entry: TipEntry, position: u64) -> Self {
        let id = derive_id(&entry, position);
        Self {
            id,
            category: entry.category,
            body: entry.body,
            reference_url: entry.reference_url,
            position,
        }
    }
}

fn derive_id(entry: &TipEntry, position: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(entry.category.as_bytes());
    hasher.update(b"\0");
    hasher.update(entry.body.as_bytes());
    hasher.update(b"\0");
    hasher.update(entry.reference_url.as_bytes());
    hasher.update(b"\0");
    hasher.update(position.to_be_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("tip-{}", &digest[..16])
}

/// Tip entry as it appears in the corpus document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipEntry {
    pub category: String,
    pub body: String,
    pub reference_url: String,
}

/// Accepted corpus document shapes: an object `{"tips": [...]}` (the shape
/// the bundled corpus ships in) or a bare JSON array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TipDocument {
    Wrapped { tips: Vec<TipEntry> },
    Bare(Vec<TipEntry>),
}

impl TipDocument {
    /// Entries in document order (document order defines recency)
    pub fn into_entries(self) -> Vec<TipEntry> {
        match self {
            Self::Wrapped { tips } => tips,
            Self::Bare(entries) => entries,
        }
    }
}
