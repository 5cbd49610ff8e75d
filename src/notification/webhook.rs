//! Webhook notification implementation.
//!
//! Posts a JSON payload built by a [`WebhookPayloadBuilder`] to an incoming
//! webhook URL.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use url::Url;

use super::{
    Notifier, alert_body, alert_title, error::NotificationError,
    payload_builder::WebhookPayloadBuilder,
};
use crate::models::DivergenceAlert;

/// Implementation of divergence notifications via webhooks
pub struct WebhookNotifier {
    /// Webhook URL for message delivery
    url: Url,
    /// Shared HTTP client
    client: reqwest::Client,
    /// Builder producing the provider-specific JSON body
    builder: Box<dyn WebhookPayloadBuilder>,
}

impl WebhookNotifier {
    /// Creates a new Webhook notifier instance
    pub fn new(
        url: Url,
        client: reqwest::Client,
        builder: Box<dyn WebhookPayloadBuilder>,
    ) -> Self {
        Self { url, client, builder }
    }

    /// Sends a JSON payload to the webhook
    pub async fn notify_json(&self, payload: &serde_json::Value) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(payload)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            return Err(NotificationError::NotifyFailed(format!(
                "Webhook request failed with status: {status}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[tracing::instrument(skip(self, alert), fields(sequence = alert.sequence))]
    async fn notify(&self, alert: &DivergenceAlert) -> Result<(), NotificationError> {
        let payload = self.builder.build_payload(alert_title(), &alert_body(alert));
        self.notify_json(&payload).await?;
        tracing::info!(host = self.url.host_str().unwrap_or_default(), "Divergence notification sent.");
        Ok(())
    }
}
