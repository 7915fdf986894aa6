//! Forwards log events to a Discord channel webhook.
//!
//! [`DiscordWebhookLayer`] renders qualifying events into chat messages and hands
//! them to a [`WebhookForwarder`] task over a bounded channel, so logging never
//! waits on the network. When the queue is full new messages are dropped. Events
//! from the HTTP stack are skipped, since delivering them would produce more of
//! them.

use reqwest::Client;
use serde_json::json;
use std::{
    fmt::{self, Write as _},
    time::Duration,
};
use tokio::{
    sync::{
        mpsc::{self, Receiver, Sender},
        oneshot,
    },
    task::JoinHandle,
};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context};

/// Discord rejects message content longer than this.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
/// Messages waiting for delivery before new ones are dropped.
pub const QUEUE_CAPACITY: usize = 256;
/// Upper bound on a single webhook request.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

const IGNORED_TARGETS: [&str; 4] = ["reqwest", "hyper", "h2", "rustls"];

/// Layer sending events at or above a level to a webhook forwarder.
#[derive(Debug)]
pub struct DiscordWebhookLayer {
    sender: Sender<String>,
    min_level: Level,
}

impl DiscordWebhookLayer {
    /// Creates the layer and the receiving end for [`WebhookForwarder::spawn`].
    #[must_use]
    pub fn new(min_level: Level) -> (Self, Receiver<String>) {
        Self::with_capacity(min_level, QUEUE_CAPACITY)
    }

    /// Like [`Self::new`] with an explicit queue length.
    #[must_use]
    pub fn with_capacity(min_level: Level, capacity: usize) -> (Self, Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender, min_level }, receiver)
    }
}

impl<S: Subscriber> Layer<S> for DiscordWebhookLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // More verbose levels compare greater.
        if *metadata.level() > self.min_level {
            return;
        }
        if IGNORED_TARGETS
            .iter()
            .any(|ignored| metadata.target().starts_with(ignored))
        {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        // Full queue or stopped forwarder: the message is dropped.
        let _ = self.sender.try_send(format_record(
            *metadata.level(),
            metadata.target(),
            &visitor.into_text(),
        ));
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn into_text(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

/// Renders one event as a Discord message, truncated to the length limit.
#[must_use]
pub fn format_record(level: Level, target: &str, text: &str) -> String {
    truncate_message(&format!("**{level}** `{target}`: {text}"))
}

/// Cuts `text` to [`DISCORD_MESSAGE_LIMIT`] characters, marking the cut.
#[must_use]
pub fn truncate_message(text: &str) -> String {
    if text.chars().count() <= DISCORD_MESSAGE_LIMIT {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(DISCORD_MESSAGE_LIMIT - 1).collect();
    truncated.push('…');
    truncated
}

/// Background task posting queued messages to a webhook.
#[derive(Debug)]
pub struct WebhookForwarder {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl WebhookForwarder {
    /// Starts delivering messages from `receiver` to `webhook_url`.
    ///
    /// The task runs until [`Self::flush`] is called or every sender is dropped.
    #[must_use]
    pub fn spawn(webhook_url: String, mut receiver: Receiver<String>) -> Self {
        let (shutdown, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let client = match Client::builder().timeout(DELIVERY_TIMEOUT).build() {
                Ok(client) => client,
                Err(e) => {
                    tracing::debug!("Failed to build webhook client: {e}");
                    return;
                }
            };

            loop {
                tokio::select! {
                    message = receiver.recv() => match message {
                        Some(content) => deliver(&client, &webhook_url, content).await,
                        None => return,
                    },
                    _ = &mut shutdown_rx => break,
                }
            }

            receiver.close();
            while let Ok(content) = receiver.try_recv() {
                deliver(&client, &webhook_url, content).await;
            }
        });

        Self { shutdown, handle }
    }

    /// Stops accepting messages and waits up to `timeout` for the queue to drain.
    ///
    /// Returns `false` when the deadline passed before everything was delivered.
    pub async fn flush(self, timeout: Duration) -> bool {
        // Err means the task already finished.
        let _ = self.shutdown.send(());
        tokio::time::timeout(timeout, self.handle).await.is_ok()
    }
}

async fn deliver(client: &Client, webhook_url: &str, content: String) {
    let result = client
        .post(webhook_url)
        .json(&json!({ "content": content }))
        .send()
        .await
        .and_then(reqwest::Response::error_for_status);
    if let Err(e) = result {
        // Below the forwarding threshold, so this never loops back here.
        tracing::debug!("Failed to deliver log message to webhook: {e}");
    }
}
