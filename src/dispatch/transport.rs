//! Push transports
//!
//! `PushTransport` is the seam between the dispatcher and whatever carries
//! notifications to user devices. `HttpPushTransport` posts to a push
//! endpoint; `LogTransport` records sends in the log instead and backs
//! dry runs.

use crate::config::{resolve_push_token_from_env, TransportConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// One notification addressed to one subscriber
#[derive(Debug, Clone)]
pub struct PushNotification {
    /// Target user
    pub user_id: String,

    /// Display title shown on the device
    pub title: String,

    /// Intent triggered when the user opens the notification
    pub intent: String,

    /// Intent arguments captured at opt-in
    pub parameters: BTreeMap<String, String>,
}

/// Transport carrying notifications to user devices
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &str;

    /// Deliver one notification, returning a transport message id
    async fn send(&self, note: &PushNotification) -> Result<String>;
}

/// HTTP transport posting notification payloads to a push endpoint
pub struct HttpPushTransport {
    endpoint: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl HttpPushTransport {
    /// Build a transport from config.
    ///
    /// The bearer token is resolved from the environment variable named by
    /// `transport.auth_token_ref`; without one, requests go out
    /// unauthenticated.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| Error::Config("transport.endpoint is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.send_timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            auth_token: resolve_push_token_from_env(config),
            client,
        })
    }

    fn payload(note: &PushNotification) -> serde_json::Value {
        let arguments: Vec<serde_json::Value> = note
            .parameters
            .iter()
            .map(|(name, value)| serde_json::json!({"name": name, "textValue": value}))
            .collect();

        serde_json::json!({
            "customPushMessage": {
                "userNotification": {
                    "title": note.title,
                },
                "target": {
                    "userId": note.user_id,
                    "intent": note.intent,
                    "arguments": arguments,
                },
            }
        })
    }
}

#[async_trait]
impl PushTransport for HttpPushTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, note: &PushNotification) -> Result<String> {
        tracing::debug!(
            "Sending push to user {} (intent {})",
            note.user_id,
            note.intent
        );

        let mut request = self.client.post(&self.endpoint).json(&Self::payload(note));
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Failed to send push: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!(
                "Push endpoint returned {}",
                status
            )));
        }

        Ok(format!("push-{}", uuid::Uuid::new_v4()))
    }
}

/// Logging transport; records sends instead of delivering them
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl PushTransport for LogTransport {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, note: &PushNotification) -> Result<String> {
        tracing::info!(
            user_id = %note.user_id,
            intent = %note.intent,
            title = %note.title,
            "dry-run notification"
        );
        Ok(format!("log-{}", uuid::Uuid::new_v4()))
    }
}
