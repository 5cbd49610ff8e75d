//! # Notification Service
//!
//! Delivers divergence alerts to a human-facing channel.
//!
//! ## Core Components
//!
//! - **`Notifier` Trait**: the capability the comparator depends on. One
//!   call per divergent sequence, at most one delivery attempt.
//! - **`WebhookNotifier`**: posts the alert to an incoming webhook, using a
//!   `WebhookPayloadBuilder` picked from the configured notifier kind.
//! - **`DisabledNotifier`**: installed when no webhook is configured; logs
//!   the alert and reports success.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{config::NotifierConfig, models::DivergenceAlert};

pub mod error;
pub mod payload_builder;
mod webhook;

use error::NotificationError;
pub use webhook::WebhookNotifier;

/// Timestamp layout used in alert bodies.
const ALERT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Delivers a divergence alert.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempts to deliver `alert` once.
    async fn notify(&self, alert: &DivergenceAlert) -> Result<(), NotificationError>;
}

/// A notifier that only logs. Used when alert delivery is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, alert: &DivergenceAlert) -> Result<(), NotificationError> {
        tracing::info!(
            sequence = alert.sequence,
            "No webhook configured, skipping divergence notification."
        );
        Ok(())
    }
}

/// Builds the notifier described by `config`.
///
/// A missing webhook URL is not an error: a warning is logged and a
/// [`DisabledNotifier`] is returned.
pub fn create_notifier(config: &NotifierConfig, client: reqwest::Client) -> Box<dyn Notifier> {
    match &config.webhook_url {
        Some(url) => {
            tracing::info!(
                kind = ?config.kind,
                channel = config.effective_channel(),
                "Divergence notifications enabled."
            );
            Box::new(WebhookNotifier::new(
                url.clone(),
                client,
                payload_builder::builder_for(config),
            ))
        }
        None => {
            tracing::warn!("No webhook URL configured; divergence alerts will only be logged.");
            Box::new(DisabledNotifier)
        }
    }
}

/// The headline of every divergence alert.
pub fn alert_title() -> &'static str {
    "Solana Block QA Alert"
}

/// Renders the human-readable body of `alert`.
pub fn alert_body(alert: &DivergenceAlert) -> String {
    format!(
        "Block differences detected at slot {}\n\
         • Firehose checksum: `{}`\n\
         • RPC Fetcher checksum: `{}`\n\
         • Firehose JSON file: `{}`\n\
         • RPC Fetcher JSON file: `{}`\n\
         • Time: {} UTC",
        alert.sequence,
        alert.streaming_fingerprint,
        alert.point_fingerprint,
        alert.streaming_path.display(),
        alert.point_path.display(),
        alert.detected_at.format(ALERT_TIME_FORMAT),
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use url::Url;

    use super::*;
    use crate::test_helpers::divergence_alert;

    #[test]
    fn test_alert_body_contains_all_fields() {
        let mut alert = divergence_alert(42);
        alert.detected_at = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();

        let body = alert_body(&alert);

        assert!(body.starts_with("Block differences detected at slot 42\n"));
        assert!(body.contains(&alert.streaming_fingerprint.to_hex()));
        assert!(body.contains(&alert.point_fingerprint.to_hex()));
        assert!(body.contains("firehose_block_42.json"));
        assert!(body.contains("rpc_fetcher_block_42.json"));
        assert!(body.ends_with("• Time: 2024-03-01 12:30:05 UTC"));
    }

    #[tokio::test]
    async fn test_disabled_notifier_is_noop() {
        let result = DisabledNotifier.notify(&divergence_alert(1)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_notifier_without_url_is_disabled() {
        let notifier = create_notifier(&NotifierConfig::default(), reqwest::Client::new());
        // No server is listening; only the disabled notifier can succeed.
        assert!(notifier.notify(&divergence_alert(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_notifier_with_url_posts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/hook").with_status(200).expect(1).create_async().await;

        let config = NotifierConfig {
            webhook_url: Some(Url::parse(&format!("{}/hook", server.url())).unwrap()),
            ..Default::default()
        };
        let notifier = create_notifier(&config, reqwest::Client::new());

        notifier.notify(&divergence_alert(9)).await.unwrap();
        mock.assert_async().await;
    }
}
