use aws_lambda_events::event::sns::SnsMessage;
use serde_json::{Map, Value};

use crate::error::{RelayError, Result};

/// One SNS notification as delivered to the relay, before its body is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub topic_arn: String,
    pub subject: Option<String>,
    pub message: String,
}

impl Envelope {
    pub fn new(
        topic_arn: impl Into<String>,
        subject: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            subject,
            message: message.into(),
        }
    }

    /// Decodes the message body. Anything that is not a JSON object decodes to `{}`.
    pub fn detail(&self) -> Value {
        match serde_json::from_str::<Value>(&self.message) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => Value::Object(Map::new()),
            Err(e) => {
                tracing::debug!(error = %e, "message body is not JSON");
                Value::Object(Map::new())
            }
        }
    }

    /// Account id taken from the topic ARN (`arn:aws:sns:<region>:<account>:<name>`).
    pub fn account(&self) -> Result<&str> {
        self.topic_arn
            .split(':')
            .nth(4)
            .filter(|account| !account.is_empty())
            .ok_or_else(|| RelayError::missing("TopicArn[4]"))
    }
}

impl From<SnsMessage> for Envelope {
    fn from(sns: SnsMessage) -> Self {
        Self {
            topic_arn: sns.topic_arn,
            subject: sns.subject,
            message: sns.message,
        }
    }
}
