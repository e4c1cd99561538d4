//! Subscriber registry types
//!
//! Wire types for persisted subscriber records. camelCase JSON serialization
//! like the other persisted documents.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Persisted subscriber document schema version
pub const SUBSCRIBER_SCHEMA: u32 = 1;

/// One user opted into one notification intent with a fixed parameter set.
///
/// A user may hold several of these, one per distinct intent+parameters
/// combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    /// Opaque platform user identifier
    pub user_id: String,

    /// Intent to trigger on delivery
    pub intent: String,

    /// Intent arguments captured at opt-in (e.g. a chosen category)
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    /// Opt-in time, unix millis
    pub created_at: i64,

    /// Document schema version
    pub schema: u32,
}

impl Subscriber {
    /// Build a new record stamped with the current time
    pub fn new(user_id: String, intent: String, parameters: BTreeMap<String, String>) -> Self {
        Self {
            user_id,
            intent,
            parameters,
            created_at: chrono::Utc::now().timestamp_millis(),
            schema: SUBSCRIBER_SCHEMA,
        }
    }

    /// Composite identity key; used as the persisted file name
    pub fn key(&self) -> String {
        composite_key(&self.user_id, &self.intent, &self.parameters)
    }

    /// Whether this record carries the given composite identity
    pub fn matches(
        &self,
        user_id: &str,
        intent: &str,
        parameters: &BTreeMap<String, String>,
    ) -> bool {
        self.user_id == user_id && self.intent == intent && &self.parameters == parameters
    }
}

/// Hash the composite subscription identity (user, intent, parameters).
///
/// `BTreeMap` iteration gives a canonical parameter order, so logically
/// equal parameter sets always hash the same.
pub fn composite_key(user_id: &str, intent: &str, parameters: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(intent.as_bytes());
    for (k, v) in parameters {
        hasher.update(b"\0");
        hasher.update(k.as_bytes());
        hasher.update(b"\0");
        hasher.update(v.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_subscriber_serialization() {
        let sub = Subscriber::new(
            "user-abc".to_string(),
            "tell_tip".to_string(),
            params(&[("category", "tools")]),
        );

        let json = serde_json::to_string(&sub).unwrap();
        assert!(json.contains("\"userId\":\"user-abc\""));
        assert!(json.contains("\"intent\":\"tell_tip\""));
        assert!(json.contains("\"createdAt\":"));
        assert!(json.contains("\"schema\":1"));

        let parsed: Subscriber = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sub);
    }

    #[test]
    fn test_subscriber_no_parameters_field() {
        let json = r#"{"userId": "u1", "intent": "tell_most_recent_tip", "createdAt": 1, "schema": 1}"#;
        let parsed: Subscriber = serde_json::from_str(json).unwrap();
        assert!(parsed.parameters.is_empty());
    }

    #[test]
    fn test_composite_key_stable() {
        let a = composite_key("u1", "tell_tip", &params(&[("category", "tools")]));
        let b = composite_key("u1", "tell_tip", &params(&[("category", "tools")]));
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_composite_key_distinguishes_identity() {
        let base = composite_key("u1", "tell_tip", &params(&[("category", "tools")]));
        assert_ne!(
            base,
            composite_key("u2", "tell_tip", &params(&[("category", "tools")]))
        );
        assert_ne!(
            base,
            composite_key("u1", "tell_most_recent_tip", &params(&[("category", "tools")]))
        );
        assert_ne!(
            base,
            composite_key("u1", "tell_tip", &params(&[("category", "basics")]))
        );
        assert_ne!(base, composite_key("u1", "tell_tip", &params(&[])));
    }

    #[test]
    fn test_composite_key_parameter_order_irrelevant() {
        let a = composite_key("u1", "tell_tip", &params(&[("a", "1"), ("b", "2")]));
        let b = composite_key("u1", "tell_tip", &params(&[("b", "2"), ("a", "1")]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_matches() {
        let sub = Subscriber::new(
            "u1".to_string(),
            "tell_tip".to_string(),
            params(&[("category", "tools")]),
        );
        assert!(sub.matches("u1", "tell_tip", &params(&[("category", "tools")])));
        assert!(!sub.matches("u1", "tell_tip", &params(&[])));
        assert!(!sub.matches("u1", "other", &params(&[("category", "tools")])));
    }
}
