use crate::{
    envelope::Envelope,
    error::{RelayError, Result},
    relay::Relay,
    settings::Settings,
};
use aws_lambda_events::event::sns::SnsEvent;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Replay a saved SNS event through the relay.
#[derive(Debug, clap::Args)]
pub struct Cmd {
    /// Path to an SNS Lambda event (`{"Records": [...]}`) in JSON
    event: PathBuf,
    /// Print the rendered cards instead of posting them
    #[clap(long)]
    dry_run: bool,
    /// Function ARN shown in cards for unclassified messages
    #[clap(long, default_value = "local")]
    function_arn: String,
}

impl Cmd {
    pub async fn run(&self, settings: &Settings) -> anyhow::Result<()> {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(&settings.log))
            .with(tracing_subscriber::fmt::layer())
            .init();

        let raw = std::fs::read_to_string(&self.event)?;
        let event: SnsEvent = serde_json::from_str(&raw)?;
        if event.records.is_empty() {
            return Err(RelayError::NoRecords.into());
        }

        let relay = Relay::from_settings(settings)?;
        for record in event.records {
            let envelope = Envelope::from(record.sns);
            if self.dry_run {
                print_notification(&relay, &envelope, &self.function_arn)?;
            } else {
                let report = relay.relay(&envelope, &self.function_arn).await?;
                println!("{} {}", report.status, report.body);
            }
        }

        Ok(())
    }
}

fn print_notification(relay: &Relay, envelope: &Envelope, function_arn: &str) -> Result<()> {
    let notification = relay.prepare(envelope, function_arn)?;
    println!(
        "POST {} ({})\n{}",
        notification.url,
        notification.destination.as_str(),
        serde_json::to_string_pretty(&notification.card)?
    );
    Ok(())
}
