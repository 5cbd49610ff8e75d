//! # Webhook Payload Builder
//!
//! Each webhook flavour expects its own JSON structure. The builders in this
//! module turn an alert title and body into that structure.
//!
//! - **`WebhookPayloadBuilder` Trait**: a common interface with a single
//!   method, `build_payload`, returning a `serde_json::Value`.
//! - **Implementations**: `SlackPayloadBuilder` for Slack incoming webhooks
//!   and `GenericWebhookPayloadBuilder` for anything that accepts plain JSON.

use serde_json::json;

use crate::config::{NotifierConfig, NotifierKind};

/// A trait for building channel-specific webhook payloads.
pub trait WebhookPayloadBuilder: Send + Sync {
    /// Builds a webhook payload from a title and a pre-rendered body.
    fn build_payload(&self, title: &str, body: &str) -> serde_json::Value;
}

/// A payload builder for Slack incoming webhooks.
///
/// Produces a legacy webhook message with `channel`, `username`,
/// `icon_emoji` and markdown `text`.
pub struct SlackPayloadBuilder {
    /// The channel to post to.
    pub channel: String,
    /// The display name of the sender.
    pub username: String,
    /// The icon shown next to the message.
    pub icon_emoji: String,
}

impl WebhookPayloadBuilder for SlackPayloadBuilder {
    fn build_payload(&self, title: &str, body: &str) -> serde_json::Value {
        let full_message = format!("🚨 *{title}* 🚨\n{body}");
        json!({
            "channel": self.channel,
            "username": self.username,
            "icon_emoji": self.icon_emoji,
            "text": full_message
        })
    }
}

/// A payload builder for generic webhooks.
///
/// This builder creates a simple, unopinionated JSON payload with a `title` and `body`.
pub struct GenericWebhookPayloadBuilder;

impl WebhookPayloadBuilder for GenericWebhookPayloadBuilder {
    fn build_payload(&self, title: &str, body: &str) -> serde_json::Value {
        json!({
            "title": title,
            "body": body
        })
    }
}

/// Picks the builder matching the configured notifier kind.
pub fn builder_for(config: &NotifierConfig) -> Box<dyn WebhookPayloadBuilder> {
    match config.kind {
        NotifierKind::Slack => Box::new(SlackPayloadBuilder {
            channel: config.effective_channel().to_string(),
            username: config.username.clone(),
            icon_emoji: config.icon_emoji.clone(),
        }),
        NotifierKind::Generic => Box::new(GenericWebhookPayloadBuilder),
    }
}
