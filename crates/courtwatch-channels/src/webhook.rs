//! Webhook channel: POSTs notifications as JSON to an arbitrary URL.
//!
//! Useful for integrating with external systems (ntfy, n8n, custom APIs).

use async_trait::async_trait;
use courtwatch_core::config::WebhookConfig;
use courtwatch_core::error::{CourtWatchError, Result};
use courtwatch_core::traits::Channel;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct WebhookChannel {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(config: WebhookConfig) -> Self {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Like `new`, with `timeout` bounding each POST.
    pub fn with_timeout(config: WebhookConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    fn name(&self) -> &str { "webhook" }

    async fn send(&self, text: &str) -> Result<()> {
        let body = serde_json::json!({ "content": text });

        let response = self.client.post(&self.config.outbound_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CourtWatchError::channel(format!("Webhook send failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CourtWatchError::channel(format!("Webhook returned {}", response.status())));
        }
        Ok(())
    }
}
