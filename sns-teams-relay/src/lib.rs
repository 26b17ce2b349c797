//! Relays SNS notifications (CloudWatch alarms, CodeBuild and CodePipeline
//! events, manual approvals and anything else) to Microsoft Teams incoming
//! webhooks as message cards.

pub mod builder;
pub mod card;
pub mod classify;
pub mod cli;
pub mod envelope;
pub mod error;
pub mod relay;
pub mod route;
pub mod settings;
pub mod webhook;

pub use card::{MessageCard, Notification};
pub use classify::{classify, Classified, Family};
pub use envelope::Envelope;
pub use error::{RelayError, Result};
pub use relay::{Relay, RelayConfig};
pub use route::{Destination, Theme, TopicOverrides};
pub use settings::Settings;
pub use webhook::{Deliver, DeliveryReport, TeamsWebhook};

/// Environment variable naming an optional TOML settings file.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";
