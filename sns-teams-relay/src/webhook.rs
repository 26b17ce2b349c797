//! Delivery of rendered cards to Teams incoming webhooks.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{card::MessageCard, error::Result};

/// Outcome of one webhook POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub status: u16,
    pub body: String,
}

impl DeliveryReport {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a card to a webhook URL.
#[async_trait]
pub trait Deliver: Send + Sync {
    async fn deliver(&self, url: &str, card: &MessageCard) -> Result<DeliveryReport>;
}

/// Teams incoming-webhook client.
#[derive(Debug, Clone)]
pub struct TeamsWebhook {
    client: reqwest::Client,
}

impl TeamsWebhook {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Deliver for TeamsWebhook {
    async fn deliver(&self, url: &str, card: &MessageCard) -> Result<DeliveryReport> {
        debug!(payload = %serde_json::to_string(card)?, "sending message");

        let response = self.client.post(url).json(card).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let report = DeliveryReport { status, body };

        if report.is_success() {
            info!(status_code = report.status, response = %report.body, "webhook accepted message");
        } else {
            warn!(status_code = report.status, response = %report.body, "webhook rejected message");
        }

        Ok(report)
    }
}
