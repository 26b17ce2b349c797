use std::time::Duration;

use aws_lambda_events::event::sns::SnsEvent;
use chrono::{NaiveDateTime, TimeZone, Utc};
use lambda_runtime::LambdaEvent;
use tracing::{debug, info};

use crate::{
    builder::{self, Request},
    card::Notification,
    classify::classify,
    envelope::Envelope,
    error::{RelayError, Result},
    route::{Destination, TopicOverrides},
    settings::Settings,
    webhook::{Deliver, DeliveryReport, TeamsWebhook},
};

/// Read-only routing configuration, built once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub webhook_url_normal: String,
    pub webhook_url_alert: String,
    pub time_format: String,
    pub alarm_overrides: TopicOverrides,
    pub generic_overrides: TopicOverrides,
}

impl RelayConfig {
    pub fn url(&self, destination: Destination) -> &str {
        match destination {
            Destination::Normal => &self.webhook_url_normal,
            Destination::Alert => &self.webhook_url_alert,
        }
    }
}

impl TryFrom<&Settings> for RelayConfig {
    type Error = RelayError;

    fn try_from(settings: &Settings) -> Result<Self> {
        check_url("webhook_url_normal", &settings.webhook_url_normal)?;
        check_url("webhook_url_alert", &settings.webhook_url_alert)?;
        let epoch = Utc.from_utc_datetime(&NaiveDateTime::default());
        builder::render_time(&epoch, &settings.time_format)?;

        Ok(Self {
            webhook_url_normal: settings.webhook_url_normal.clone(),
            webhook_url_alert: settings.webhook_url_alert.clone(),
            time_format: settings.time_format.clone(),
            alarm_overrides: TopicOverrides::new(
                settings.alarm_alert_topics.topics(),
                settings.alarm_normal_topics.topics(),
            ),
            generic_overrides: TopicOverrides::new(
                settings.generic_alert_topics.topics(),
                settings.generic_normal_topics.topics(),
            ),
        })
    }
}

fn check_url(key: &'static str, url: &str) -> Result<()> {
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| RelayError::InvalidUrl {
            key,
            reason: e.to_string(),
        })
}

#[derive(Debug)]
pub struct Relay<D = TeamsWebhook> {
    config: RelayConfig,
    deliver: D,
}

impl Relay<TeamsWebhook> {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config = RelayConfig::try_from(settings)?;
        let webhook = TeamsWebhook::new(Duration::from_secs(settings.webhook_timeout_secs))?;
        Ok(Self::new(config, webhook))
    }
}

impl<D: Deliver> Relay<D> {
    pub fn new(config: RelayConfig, deliver: D) -> Self {
        Self { config, deliver }
    }

    /// Classifies and renders an envelope without sending anything.
    pub fn prepare(&self, envelope: &Envelope, function_arn: &str) -> Result<Notification> {
        let classified = classify(envelope);
        let request = Request {
            envelope,
            function_arn,
            config: &self.config,
        };
        let notification = builder::build(&classified, &request)?;

        info!(
            family = %classified.family,
            destination = notification.destination.as_str(),
            topic = %envelope.topic_arn,
            "classified message"
        );
        Ok(notification)
    }

    pub async fn relay(&self, envelope: &Envelope, function_arn: &str) -> Result<DeliveryReport> {
        let notification = self.prepare(envelope, function_arn)?;
        self.deliver
            .deliver(&notification.url, &notification.card)
            .await
    }

    /// Lambda entry point: relays every record of the SNS event in order.
    pub async fn handle(&self, event: LambdaEvent<SnsEvent>) -> Result<Vec<DeliveryReport>> {
        let LambdaEvent { payload, context } = event;
        debug!(event = ?payload, "received event");

        if payload.records.is_empty() {
            return Err(RelayError::NoRecords);
        }

        let mut reports = Vec::with_capacity(payload.records.len());
        for record in payload.records {
            let envelope = Envelope::from(record.sns);
            reports.push(self.relay(&envelope, &context.invoked_function_arn).await?);
        }
        Ok(reports)
    }
}
