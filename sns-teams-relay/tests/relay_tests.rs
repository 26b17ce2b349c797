use anyhow::Result;
use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{Context, LambdaEvent};
use serde_json::{json, Value};
use sns_teams_relay::{
    Envelope, Relay, RelayConfig, RelayError, Settings, TeamsWebhook, Theme, TopicOverrides,
};
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:ci-events";
const FUNCTION_ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:sns-teams-relay";

fn config(server: &MockServer) -> RelayConfig {
    RelayConfig {
        webhook_url_normal: format!("{}/normal", server.uri()),
        webhook_url_alert: format!("{}/alert", server.uri()),
        time_format: "%Y-%m-%d %H:%M UTC".to_string(),
        alarm_overrides: TopicOverrides::default(),
        generic_overrides: TopicOverrides::default(),
    }
}

fn relay(config: RelayConfig) -> Relay {
    let webhook = TeamsWebhook::new(Duration::from_secs(5)).expect("client");
    Relay::new(config, webhook)
}

fn codebuild_event(status: &str) -> Value {
    json!({
        "detailType": "CodeBuild Build State Change",
        "region": "us-east-1",
        "account": "123456789012",
        "detail": {"project-name": "demo", "build-status": status},
    })
}

fn sns_event(subject: &str, message: &str) -> SnsEvent {
    serde_json::from_value(json!({
        "Records": [{
            "EventVersion": "1.0",
            "EventSubscriptionArn": format!("{TOPIC}:2bcfbf39-05c3-41de-beaa-fcfcc21c8f55"),
            "EventSource": "aws:sns",
            "Sns": {
                "SignatureVersion": "1",
                "Timestamp": "2023-05-01T12:34:56.789Z",
                "Signature": "EXAMPLE",
                "SigningCertUrl": "EXAMPLE",
                "MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e",
                "Message": message,
                "MessageAttributes": {},
                "Type": "Notification",
                "UnsubscribeUrl": "EXAMPLE",
                "TopicArn": TOPIC,
                "Subject": subject,
            },
        }],
    }))
    .expect("valid SNS event")
}

/// Test: a failed build is posted to the alert webhook as a MessageCard
#[tokio::test]
async fn test_failed_build_goes_to_alert_webhook() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .and(body_partial_json(json!({
            "@type": "MessageCard",
            "@context": "http://schema.org/extensions",
            "themeColor": Theme::Failure.hex(),
            "summary": "AWS CodeBuild Notification | us-east-1 | 123456789012",
            "title": "AWS CodeBuild Notification | us-east-1 | 123456789012",
            "potentialAction": [],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = Envelope::new(TOPIC, None, codebuild_event("FAILED").to_string());
    let report = relay(config(&server)).relay(&envelope, FUNCTION_ARN).await?;

    assert_eq!(report.status, 200);
    assert_eq!(report.body, "1");
    assert!(report.is_success());
    Ok(())
}

/// Test: malformed JSON bodies are relayed verbatim to the normal webhook
#[tokio::test]
async fn test_malformed_message_is_relayed_as_unknown() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/normal"))
        .and(body_partial_json(json!({
            "summary": "AWS SNS Teams Relay: Disk space low",
            "themeColor": Theme::Info.hex(),
            "text": format!("Message: [{{oops]<br />Relayed by {FUNCTION_ARN}"),
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = Envelope::new(TOPIC, Some("Disk space low".to_string()), "{oops");
    relay(config(&server)).relay(&envelope, FUNCTION_ARN).await?;
    Ok(())
}

/// Test: generic override sends unclassified messages to the alert webhook
#[tokio::test]
async fn test_generic_override_routes_to_alert() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.generic_overrides = TopicOverrides::new([TOPIC.to_string()], [TOPIC.to_string()]);

    let envelope = Envelope::new(TOPIC, Some("page me".to_string()), "plain text");
    relay(config).relay(&envelope, FUNCTION_ARN).await?;
    Ok(())
}

/// Test: a rejected post is reported once and never retried
#[tokio::test]
async fn test_webhook_error_is_reported_not_retried() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/normal"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad payload"))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = Envelope::new(TOPIC, None, codebuild_event("SUCCEEDED").to_string());
    let report = relay(config(&server)).relay(&envelope, FUNCTION_ARN).await?;

    assert_eq!(report.status, 400);
    assert_eq!(report.body, "Bad payload");
    assert!(!report.is_success());
    Ok(())
}

/// Test: an unmapped state fails before anything is sent
#[tokio::test]
async fn test_unmapped_state_sends_nothing() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let envelope = Envelope::new(TOPIC, None, codebuild_event("EXPLODED").to_string());
    let err = relay(config(&server))
        .relay(&envelope, FUNCTION_ARN)
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::UnmappedState { .. }));
    Ok(())
}

/// Test: transport failures propagate as invocation errors
#[tokio::test]
async fn test_unreachable_webhook_fails() -> Result<()> {
    let server = MockServer::start().await;
    let config = config(&server);
    drop(server);

    let envelope = Envelope::new(TOPIC, None, "hello");
    let err = relay(config).relay(&envelope, FUNCTION_ARN).await.unwrap_err();

    assert!(matches!(err, RelayError::Http(_)));
    Ok(())
}

/// Test: the Lambda handler relays the SNS record with the invoking function ARN
#[tokio::test]
async fn test_handle_lambda_event() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/normal"))
        .and(body_partial_json(json!({
            "summary": "Please Approve",
            "themeColor": Theme::Warning.hex(),
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let approval = json!({
        "region": "us-east-1",
        "consoleLink": "https://console.aws.amazon.com/codepipeline",
        "approval": {
            "pipelineName": "deploy",
            "stageName": "Prod",
            "actionName": "ManualApproval",
            "approvalReviewLink": "https://console.aws.amazon.com/codepipeline/review",
        },
    });
    let mut context = Context::default();
    context.invoked_function_arn = FUNCTION_ARN.to_string();
    let event = LambdaEvent::new(sns_event("Please Approve", &approval.to_string()), context);

    let reports = relay(config(&server)).handle(event).await?;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, 200);
    Ok(())
}

/// Test: an invocation without records is an error
#[tokio::test]
async fn test_handle_without_records() -> Result<()> {
    let server = MockServer::start().await;
    let mut event = sns_event("x", "y");
    event.records.clear();

    let err = relay(config(&server))
        .handle(LambdaEvent::new(event, Context::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::NoRecords));
    Ok(())
}

fn settings(normal: &str, time_format: &str) -> Settings {
    serde_json::from_value(json!({
        "webhook_url_normal": normal,
        "webhook_url_alert": "https://example.webhook.office.com/alert",
        "time_format": time_format,
        "alarm_alert_topics": "arn:aws:sns:us-east-1:1:pager, arn:aws:sns:us-east-1:1:oncall",
        "generic_normal_topics": ["arn:aws:sns:us-east-1:1:chatter"],
    }))
    .expect("settings")
}

/// Test: settings become an immutable relay configuration
#[test]
fn test_relay_config_from_settings() {
    let config = RelayConfig::try_from(&settings(
        "https://example.webhook.office.com/normal",
        "%H:%M",
    ))
    .expect("valid config");

    assert_eq!(config.time_format, "%H:%M");
    assert_eq!(config.alarm_overrides.alert.len(), 2);
    assert!(config
        .alarm_overrides
        .alert
        .contains("arn:aws:sns:us-east-1:1:oncall"));
    assert!(config
        .generic_overrides
        .normal
        .contains("arn:aws:sns:us-east-1:1:chatter"));
    assert!(config.generic_overrides.alert.is_empty());
}

/// Test: bad URLs and time formats are rejected at start-up
#[test]
fn test_relay_config_rejects_invalid_settings() {
    let err = RelayConfig::try_from(&settings("not a url", "%H:%M")).unwrap_err();
    assert!(matches!(
        err,
        RelayError::InvalidUrl {
            key: "webhook_url_normal",
            ..
        }
    ));

    let err = RelayConfig::try_from(&settings(
        "https://example.webhook.office.com/normal",
        "%Q",
    ))
    .unwrap_err();
    assert!(matches!(err, RelayError::InvalidTimeFormat(_)));
}

/// Test: zone specifiers are accepted and render alarm times without panicking
#[tokio::test]
async fn test_zone_specifier_time_format() -> Result<()> {
    let config = RelayConfig::try_from(&settings(
        "https://example.webhook.office.com/normal",
        "%Y-%m-%d %H:%M %Z",
    ))?;

    let alarm = json!({
        "AlarmName": "api-5xx",
        "AlarmDescription": null,
        "AWSAccountId": "123456789012",
        "NewStateValue": "ALARM",
        "NewStateReason": "Threshold Crossed",
        "StateChangeTime": "2023-05-01T12:34:56.789+0000",
        "OldStateValue": "OK",
        "AlarmArn": "arn:aws:cloudwatch:us-east-1:123456789012:alarm:api-5xx",
    });
    let envelope = Envelope::new(TOPIC, None, alarm.to_string());
    let notification = relay(config).prepare(&envelope, FUNCTION_ARN)?;

    assert!(notification.card.text().contains("2023-05-01 12:34 UTC"));
    Ok(())
}
