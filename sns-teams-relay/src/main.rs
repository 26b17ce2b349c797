use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use sns_teams_relay::{Relay, Settings, CONFIG_PATH_ENV};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let settings = Settings::new(std::env::var_os(CONFIG_PATH_ENV))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&settings.log))
        .with(
            tracing_subscriber::fmt::layer()
                // disable printing the name of the module in every log line.
                .with_target(false)
                // disabling time is handy because CloudWatch will add the ingestion time.
                .without_time(),
        )
        .init();

    let relay = Arc::new(Relay::from_settings(&settings)?);

    run(service_fn(move |event: LambdaEvent<SnsEvent>| {
        let relay = Arc::clone(&relay);
        async move {
            relay.handle(event).await?;
            Ok::<(), Error>(())
        }
    }))
    .await
}
