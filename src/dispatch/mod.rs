//! Dispatch module - notification fan-out
//!
//! Fans one notification intent out to every matching subscriber and
//! aggregates the per-subscriber outcomes into a report. One failed
//! delivery never stops the others and never fails the round; the report
//! is the observability surface for partial failure.

pub mod transport;

pub use transport::{HttpPushTransport, LogTransport, PushNotification, PushTransport};

use crate::error::Result;
use crate::registry::{Subscriber, SubscriberRegistry};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one dispatch round
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    /// Intent the round targeted
    pub intent: String,
    /// Number of subscribers in the snapshot
    pub attempted: usize,
    /// Deliveries the transport accepted
    pub successes: usize,
    /// Deliveries that failed, with causes
    pub failures: Vec<DeliveryFailure>,
}

/// A single failed delivery. Data in the report, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFailure {
    pub user_id: String,
    pub cause: String,
}

/// Fans notifications out to subscribers through a push transport
pub struct Dispatcher {
    registry: Arc<SubscriberRegistry>,
    transport: Arc<dyn PushTransport>,
}

impl Dispatcher {
    pub fn new(registry: Arc<SubscriberRegistry>, transport: Arc<dyn PushTransport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Notify every subscriber of `intent`.
    ///
    /// The subscriber set is a snapshot taken at call time; opt-ins and
    /// opt-outs during the round do not change it. `{key}` placeholders in
    /// `title_template` are filled from each subscriber's parameters. All
    /// sends run concurrently and the round completes only when every
    /// outcome is in.
    ///
    /// Fails as a whole only when the subscriber snapshot cannot be
    /// obtained; transport failures are per-subscriber data in the report.
    pub async fn dispatch(&self, intent: &str, title_template: &str) -> Result<DispatchReport> {
        let subscribers = self.registry.subscribers_for(intent).await?;
        let attempted = subscribers.len();
        tracing::info!(intent, attempted, transport = self.transport.name(), "dispatching");

        let sends = subscribers.iter().map(|sub| {
            let note = PushNotification {
                user_id: sub.user_id.clone(),
                title: render_title(title_template, sub),
                intent: sub.intent.clone(),
                parameters: sub.parameters.clone(),
            };
            async move {
                match self.transport.send(&note).await {
                    Ok(message_id) => {
                        tracing::debug!("Delivered to {} ({})", note.user_id, message_id);
                        Ok(())
                    }
                    Err(e) => Err(DeliveryFailure {
                        user_id: note.user_id,
                        cause: e.to_string(),
                    }),
                }
            }
        });

        let mut successes = 0;
        let mut failures = Vec::new();
        for outcome in join_all(sends).await {
            match outcome {
                Ok(()) => successes += 1,
                Err(failure) => {
                    tracing::warn!("Delivery to {} failed: {}", failure.user_id, failure.cause);
                    failures.push(failure);
                }
            }
        }

        Ok(DispatchReport {
            intent: intent.to_string(),
            attempted,
            successes,
            failures,
        })
    }
}

/// Fill `{key}` placeholders from subscriber parameters
fn render_title(template: &str, subscriber: &Subscriber) -> String {
    let mut title = template.to_string();
    for (key, value) in &subscriber.parameters {
        title = title.replace(&format!("{{{}}}", key), value);
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashSet};
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    /// Test transport that records every send and fails chosen users
    struct RecordingTransport {
        fail_users: HashSet<String>,
        sent: Mutex<Vec<PushNotification>>,
    }

    impl RecordingTransport {
        fn new(fail_users: &[&str]) -> Self {
            Self {
                fail_users: fail_users.iter().map(|u| u.to_string()).collect(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PushTransport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, note: &PushNotification) -> crate::error::Result<String> {
            self.sent.lock().await.push(note.clone());
            if self.fail_users.contains(&note.user_id) {
                return Err(Error::Transport("simulated outage".to_string()));
            }
            Ok(format!("rec-{}", note.user_id))
        }
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn make_registry(users: &[&str]) -> (Arc<SubscriberRegistry>, TempDir) {
        let dir = TempDir::new().unwrap();
        let registry = SubscriberRegistry::new(dir.path().to_path_buf())
            .await
            .unwrap();
        for user in users {
            registry
                .subscribe(user, "tell_most_recent_tip", params(&[]))
                .await
                .unwrap();
        }
        (Arc::new(registry), dir)
    }

    #[tokio::test]
    async fn test_dispatch_all_success() {
        let (registry, _dir) = make_registry(&["u1", "u2", "u3"]).await;
        let transport = Arc::new(RecordingTransport::new(&[]));
        let dispatcher = Dispatcher::new(registry, transport.clone());

        let report = dispatcher
            .dispatch("tell_most_recent_tip", "Tip update")
            .await
            .unwrap();

        assert_eq!(report.intent, "tell_most_recent_tip");
        assert_eq!(report.attempted, 3);
        assert_eq!(report.successes, 3);
        assert!(report.failures.is_empty());
        assert_eq!(transport.sent.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_partial_failure() {
        let (registry, _dir) = make_registry(&["u1", "u2", "u3", "u4"]).await;
        let transport = Arc::new(RecordingTransport::new(&["u2", "u4"]));
        let dispatcher = Dispatcher::new(registry, transport.clone());

        let report = dispatcher
            .dispatch("tell_most_recent_tip", "Tip update")
            .await
            .unwrap();

        assert_eq!(report.attempted, 4);
        assert_eq!(report.successes, 2);
        assert_eq!(report.failures.len(), 2);

        let failed: Vec<&str> = report.failures.iter().map(|f| f.user_id.as_str()).collect();
        assert_eq!(failed, vec!["u2", "u4"]);
        assert!(report.failures[0].cause.contains("simulated outage"));

        // Failure isolation: every subscriber was still attempted
        assert_eq!(transport.sent.lock().await.len(), 4);
    }

    #[tokio::test]
    async fn test_dispatch_zero_subscribers() {
        let (registry, _dir) = make_registry(&[]).await;
        let dispatcher = Dispatcher::new(registry, Arc::new(RecordingTransport::new(&[])));

        let report = dispatcher
            .dispatch("tell_most_recent_tip", "Tip update")
            .await
            .unwrap();

        assert_eq!(report.attempted, 0);
        assert_eq!(report.successes, 0);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_only_matching_intent() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(
            SubscriberRegistry::new(dir.path().to_path_buf())
                .await
                .unwrap(),
        );
        registry
            .subscribe("u1", "tell_most_recent_tip", params(&[]))
            .await
            .unwrap();
        registry
            .subscribe("u2", "tell_tip", params(&[("category", "tools")]))
            .await
            .unwrap();

        let transport = Arc::new(RecordingTransport::new(&[]));
        let dispatcher = Dispatcher::new(registry, transport.clone());

        let report = dispatcher
            .dispatch("tell_tip", "New {category} tip")
            .await
            .unwrap();

        assert_eq!(report.attempted, 1);
        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user_id, "u2");
    }

    #[tokio::test]
    async fn test_title_placeholders_rendered() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(
            SubscriberRegistry::new(dir.path().to_path_buf())
                .await
                .unwrap(),
        );
        registry
            .subscribe("u1", "tell_tip", params(&[("category", "tools")]))
            .await
            .unwrap();

        let transport = Arc::new(RecordingTransport::new(&[]));
        let dispatcher = Dispatcher::new(registry, transport.clone());
        dispatcher
            .dispatch("tell_tip", "New {category} tip")
            .await
            .unwrap();

        let sent = transport.sent.lock().await;
        assert_eq!(sent[0].title, "New tools tip");
        // Unknown placeholders pass through untouched
        drop(sent);
        dispatcher
            .dispatch("tell_tip", "Hello {nope}")
            .await
            .unwrap();
        let sent = transport.sent.lock().await;
        assert_eq!(sent[1].title, "Hello {nope}");
    }

    #[tokio::test]
    async fn test_report_serialization() {
        let report = DispatchReport {
            intent: "tell_most_recent_tip".to_string(),
            attempted: 2,
            successes: 1,
            failures: vec![DeliveryFailure {
                user_id: "u2".to_string(),
                cause: "Transport error: boom".to_string(),
            }],
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"attempted\":2"));
        assert!(json.contains("\"successes\":1"));
        assert!(json.contains("\"userId\":\"u2\""));
    }
}
