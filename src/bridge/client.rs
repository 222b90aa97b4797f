use super::types::BridgeMessage;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Sink for everything the node publishes externally.
///
/// Delivery is best effort: implementations log failures instead of returning them,
/// since no ring operation may stall or fail because the outside world is down.
#[async_trait]
pub trait EventBridge: Send + Sync {
    async fn send(&self, message: BridgeMessage);
}

/// Publishes messages as JSON `POST`s to a fixed URL.
pub struct HttpBridge {
    url: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpBridge {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: reqwest::Client::new(),
            timeout: Duration::from_millis(500),
        }
    }

    async fn post(&self, message: &BridgeMessage) -> Result<()> {
        let response = self
            .http_client
            .post(&self.url)
            .json(message)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Bridge rejected message: {}", response.status()));
        }

        Ok(())
    }
}

#[async_trait]
impl EventBridge for HttpBridge {
    async fn send(&self, message: BridgeMessage) {
        if let Err(e) = self.post(&message).await {
            tracing::warn!("Failed to publish to bridge {}: {}", self.url, e);
        }
    }
}

/// Used when no bridge endpoint is configured.
pub struct LogBridge;

#[async_trait]
impl EventBridge for LogBridge {
    async fn send(&self, message: BridgeMessage) {
        match serde_json::to_string(&message) {
            Ok(json) => tracing::info!("Bridge: {}", json),
            Err(e) => tracing::error!("Failed to serialize bridge message: {}", e),
        }
    }
}
