//! Tipcast configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main tipcast configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TipcastConfig {
    /// Content store configuration
    pub content: ContentConfig,

    /// Subscriber registry configuration
    pub registry: RegistryConfig,

    /// Selection engine configuration
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Push transport configuration
    pub transport: TransportConfig,

    /// User-facing prompt strings (consumed by the orchestrating layer only)
    #[serde(default)]
    pub prompts: Prompts,
}

/// Content store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Path to the tip corpus document (None = bundled corpus)
    pub source_path: Option<PathBuf>,

    /// Timeout for reading the corpus source, in milliseconds
    pub load_timeout_ms: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            source_path: None,
            load_timeout_ms: 5000,
        }
    }
}

/// Subscriber registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory for subscriber records (None = ~/.tipcast/subscribers)
    pub dir: Option<PathBuf>,
}

/// Selection engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Fixed RNG seed for reproducible picks (None = OS entropy)
    pub seed: Option<u64>,
}

/// Push transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Push endpoint URL (None = log-only transport)
    pub endpoint: Option<String>,

    /// Auth token reference (environment variable name)
    pub auth_token_ref: String,

    /// Timeout for a single push send, in milliseconds
    pub send_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            auth_token_ref: "tipcast_push_token".to_string(),
            send_timeout_ms: 10000,
        }
    }
}

/// User-facing prompt strings.
///
/// The core modules never format user-facing text; these strings belong to
/// whatever layer talks to the user (here, the CLI).  Keeping them in one
/// config object makes every message overridable from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompts {
    /// Greeting shown when the service starts an interaction
    pub welcome: String,

    /// Title for the "read more" link attached to a tip
    pub button_title: String,

    /// Suggestion nudging the user towards daily updates
    pub daily_updates_suggestion: String,

    /// Suggestion nudging the user towards push notifications
    pub notifications_suggestion: String,

    /// Confirmation after a successful notification opt-in
    pub notification_setup_success: String,

    /// Message after a declined or failed notification opt-in
    pub notification_setup_fail: String,

    /// Confirmation after a successful daily-update opt-in
    pub daily_update_setup_success: String,

    /// Message after a declined or failed daily-update opt-in
    pub daily_update_setup_fail: String,

    /// Display title for outgoing push notifications
    pub notification_title: String,

    /// Message after a dispatch round with no failures
    pub notification_send_success: String,

    /// Message after a dispatch round with at least one failure
    pub notification_send_fail: String,

    /// Confirmation after reloading the tip corpus
    pub restore_tips: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            welcome: "Welcome to tip updates! You can hear the most recently added tip, \
                      or pick a category."
                .to_string(),
            button_title: "Learn more".to_string(),
            daily_updates_suggestion: "Send daily".to_string(),
            notifications_suggestion: "Alert me of new tips".to_string(),
            notification_setup_success: "Ok, I'll start alerting you.".to_string(),
            notification_setup_fail: "Ok, I won't alert you.".to_string(),
            daily_update_setup_success: "Ok, I'll start giving you daily updates.".to_string(),
            daily_update_setup_fail: "Ok, I won't give you daily updates.".to_string(),
            notification_title: "Tip update".to_string(),
            notification_send_success: "Notification sent!".to_string(),
            notification_send_fail: "Unable to send notification.".to_string(),
            restore_tips: "The tips have been restored.".to_string(),
        }
    }
}

/// Resolve the push auth token from the environment.
///
/// The `auth_token_ref` field names an environment variable
/// (e.g. `"tipcast_push_token"` → reads `$TIPCAST_PUSH_TOKEN`).  We try both
/// the original casing and the UPPER_CASE form.
pub fn resolve_push_token_from_env(transport: &TransportConfig) -> Option<String> {
    std::env::var(&transport.auth_token_ref)
        .or_else(|_| std::env::var(transport.auth_token_ref.to_uppercase()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TipcastConfig::default();
        assert!(config.content.source_path.is_none());
        assert_eq!(config.content.load_timeout_ms, 5000);
        assert!(config.registry.dir.is_none());
        assert!(config.selection.seed.is_none());
        assert!(config.transport.endpoint.is_none());
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = TipcastConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: TipcastConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.transport.send_timeout_ms, 10000);
        assert_eq!(parsed.transport.auth_token_ref, "tipcast_push_token");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [content]
            load_timeout_ms = 250

            [registry]

            [transport]
            endpoint = "https://push.example.com/v1/send"
            auth_token_ref = "push_token"
            send_timeout_ms = 2000
        "#;
        let config: TipcastConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.content.load_timeout_ms, 250);
        assert!(config.selection.seed.is_none());
        assert_eq!(
            config.transport.endpoint.as_deref(),
            Some("https://push.example.com/v1/send")
        );
    }

    #[test]
    fn test_prompts_catalog_complete() {
        let prompts = Prompts::default();
        assert!(!prompts.welcome.is_empty());
        assert!(!prompts.button_title.is_empty());
        assert!(!prompts.notification_title.is_empty());
        assert!(!prompts.notification_send_fail.is_empty());
        assert!(!prompts.restore_tips.is_empty());
    }

    #[test]
    fn test_prompts_overridable_from_toml() {
        let toml = r#"
            [content]
            load_timeout_ms = 5000

            [registry]

            [transport]
            auth_token_ref = "tipcast_push_token"
            send_timeout_ms = 10000

            [prompts]
            welcome = "Hi there."
            button_title = "Read more"
            daily_updates_suggestion = "Send daily"
            notifications_suggestion = "Alert me"
            notification_setup_success = "Done."
            notification_setup_fail = "Not set up."
            daily_update_setup_success = "Done."
            daily_update_setup_fail = "Not set up."
            notification_title = "Fresh tip"
            notification_send_success = "Sent."
            notification_send_fail = "Send failed."
            restore_tips = "Restored."
        "#;
        let config: TipcastConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.prompts.welcome, "Hi there.");
        assert_eq!(config.prompts.notification_title, "Fresh tip");
    }

    #[test]
    fn test_resolve_push_token_from_env() {
        let transport = TransportConfig {
            auth_token_ref: "tipcast_test_token_ref".to_string(),
            ..Default::default()
        };
        assert!(resolve_push_token_from_env(&transport).is_none());

        std::env::set_var("TIPCAST_TEST_TOKEN_REF", "tok-123");
        assert_eq!(
            resolve_push_token_from_env(&transport).as_deref(),
            Some("tok-123")
        );
        std::env::remove_var("TIPCAST_TEST_TOKEN_REF");
    }
}
