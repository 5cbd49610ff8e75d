use serde::{Deserialize, Serialize};
use url::Url;

fn default_channel() -> String {
    "solana".to_string()
}

fn default_username() -> String {
    "Solana Block QA Tracker".to_string()
}

fn default_icon_emoji() -> String {
    ":warning:".to_string()
}

/// Payload flavour sent to the webhook.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Slack incoming webhook message (`channel`, `username`, `text`, ...).
    #[default]
    Slack,
    /// A plain `{"title", "body"}` JSON document.
    Generic,
}

/// Where and how divergence alerts are delivered.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NotifierConfig {
    /// Webhook URL. Alerts are disabled when unset.
    #[serde(default)]
    pub webhook_url: Option<Url>,

    /// Payload flavour.
    #[serde(default)]
    pub kind: NotifierKind,

    /// Channel label. An empty value falls back to `#general`.
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Display name of the alert sender.
    #[serde(default = "default_username")]
    pub username: String,

    /// Icon shown next to the alert.
    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            kind: NotifierKind::default(),
            channel: default_channel(),
            username: default_username(),
            icon_emoji: default_icon_emoji(),
        }
    }
}

impl NotifierConfig {
    /// The channel the alert is posted to.
    pub fn effective_channel(&self) -> &str {
        if self.channel.is_empty() { "#general" } else { &self.channel }
    }
}
