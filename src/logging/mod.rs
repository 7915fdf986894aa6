//! Logging setup
//!
//! Human readable `tracing-subscriber` output filtered by `RUST_LOG`, plus an
//! optional layer that mirrors warnings and errors into a Discord channel through
//! a webhook.

/// Discord webhook log forwarding
pub mod webhook;

use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use webhook::{DiscordWebhookLayer, WebhookForwarder};

/// Environment variable holding the Discord webhook URL for log forwarding.
pub const LOGGING_WEBHOOK_VAR: &str = "LOGGING_WEBHOOK";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset
    pub default_directive: String,
    /// Webhook receiving forwarded events, if any
    pub webhook_url: Option<String>,
    /// Least severe level that is forwarded to the webhook
    pub webhook_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            webhook_url: None,
            webhook_level: Level::WARN,
        }
    }
}

impl LogConfig {
    /// Reads the webhook URL from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var(LOGGING_WEBHOOK_VAR)
                .ok()
                .filter(|url| !url.trim().is_empty()),
            ..Self::default()
        }
    }
}

/// Keeps the webhook forwarder reachable so queued messages can be flushed.
#[derive(Debug, Default)]
#[must_use = "flush the guard before exiting or queued webhook messages are lost"]
pub struct LogGuard {
    forwarder: Option<WebhookForwarder>,
}

impl LogGuard {
    /// Delivers whatever is still queued for the webhook, waiting at most
    /// `timeout`. A no-op without a webhook.
    pub async fn flush(self, timeout: Duration) {
        let Some(forwarder) = self.forwarder else {
            return;
        };
        if !forwarder.flush(timeout).await {
            tracing::warn!("Timed out delivering queued log messages to the webhook");
        }
    }
}

/// Installs the global subscriber.
///
/// Must run inside a Tokio runtime when a webhook is configured, since the
/// forwarding task is spawned here.
pub fn init(config: &LogConfig) -> LogGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let (webhook_layer, forwarder) = match &config.webhook_url {
        Some(url) => {
            let (layer, receiver) = DiscordWebhookLayer::new(config.webhook_level);
            let forwarder = WebhookForwarder::spawn(url.clone(), receiver);
            (Some(layer), Some(forwarder))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(webhook_layer)
        .init();

    if forwarder.is_some() {
        tracing::info!("Forwarding warnings and errors to the logging webhook");
    }
    LogGuard { forwarder }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    #[tokio::test]
    async fn test_guard_flush_delivers_pending_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let (layer, receiver) = DiscordWebhookLayer::new(Level::WARN);
        let guard = LogGuard {
            forwarder: Some(WebhookForwarder::spawn(server.uri(), receiver)),
        };
        let dispatch = tracing::Dispatch::new(tracing_subscriber::registry().with(layer));
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!("DISCORD_TOKEN not found: environment variable not found");
        });

        guard.flush(Duration::from_secs(5)).await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(
            body["content"]
                .as_str()
                .unwrap()
                .ends_with("DISCORD_TOKEN not found: environment variable not found")
        );
    }

    #[tokio::test]
    async fn test_flush_without_webhook_is_noop() {
        LogGuard::default().flush(Duration::ZERO).await;
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.default_directive, "info");
        assert_eq!(config.webhook_level, Level::WARN);
        assert!(config.webhook_url.is_none());
    }
}
