//! Renders a classified event into a Teams card and picks its destination.

use std::fmt::Write;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::{
    card::{MessageCard, Notification},
    classify::{Classified, Family},
    envelope::Envelope,
    error::{RelayError, Result},
    relay::RelayConfig,
    route::{
        Destination, StateTable, Theme, ALARM_STATES, CODEBUILD_BUILD_STATES,
        CODEBUILD_PHASE_STATUSES, PIPELINE_ACTION_STATES, PIPELINE_EXECUTION_STATES,
    },
};

pub const SUBJECT_MISSING: &str = "SUBJECT_IS_MISSING";
pub const LOGS_PLACEHOLDER: &str = "#";

/// Everything a builder may look at besides the decoded detail.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub envelope: &'a Envelope,
    pub function_arn: &'a str,
    pub config: &'a RelayConfig,
}

type Builder = fn(&Value, &Request<'_>) -> Result<(MessageCard, Destination)>;

fn builder_for(family: Family) -> Builder {
    match family {
        Family::Alarm => alarm,
        Family::Approval => approval,
        Family::CodeBuildState => codebuild_state,
        Family::CodeBuildPhase => codebuild_phase,
        Family::PipelineExecution => pipeline_execution,
        Family::PipelineAction => pipeline_action,
        Family::Unknown => unknown,
    }
}

pub fn build(classified: &Classified, request: &Request<'_>) -> Result<Notification> {
    let (card, destination) = builder_for(classified.family)(&classified.detail, request)?;
    Ok(Notification {
        card,
        destination,
        url: request.config.url(destination).to_string(),
    })
}

/// Walks `path` and returns the string found there.
pub fn required_str<'a>(value: &'a Value, path: &[&str]) -> Result<&'a str> {
    let mut current = value;
    for (i, key) in path.iter().enumerate() {
        current = match current.get(key) {
            Some(next) if !next.is_null() => next,
            _ => return Err(RelayError::missing(path[..=i].join("."))),
        };
    }
    current
        .as_str()
        .ok_or_else(|| RelayError::missing(path.join(".")))
}

/// `detail.additional-information.logs.deep-link`, or `#` when any part is absent.
pub fn logs_deep_link(detail: &Value) -> &str {
    detail
        .get("additional-information")
        .and_then(|info| info.get("logs"))
        .and_then(|logs| logs.get("deep-link"))
        .and_then(Value::as_str)
        .unwrap_or(LOGS_PLACEHOLDER)
}

/// Parses an ISO-8601 time. Fractional seconds are dropped; a missing offset means UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let invalid = |source: chrono::ParseError| RelayError::InvalidTimestamp {
        value: raw.to_string(),
        source,
    };

    let time_at = raw.find('T').map_or(raw.len(), |t| t + 1);
    let split = raw[time_at..]
        .find(|c: char| matches!(c, '+' | '-' | 'Z'))
        .map_or(raw.len(), |i| time_at + i);
    let (local, offset) = raw.split_at(split);
    let local = local.split('.').next().unwrap_or(local);

    let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S").map_err(invalid)?;
    match offset {
        "" | "Z" => Ok(Utc.from_utc_datetime(&naive)),
        offset => {
            let with_offset = format!("{local}{}", offset.replace(':', ""));
            DateTime::parse_from_str(&with_offset, "%Y-%m-%dT%H:%M:%S%z")
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(invalid)
        }
    }
}

/// Renders `ts` with a strftime pattern, reporting patterns chrono cannot honour.
pub fn render_time(ts: &DateTime<Utc>, format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", ts.format(format))
        .map_err(|_| RelayError::InvalidTimeFormat(format.to_string()))?;
    Ok(out)
}

pub fn format_timestamp(raw: &str, format: &str) -> Result<String> {
    render_time(&parse_timestamp(raw)?, format)
}

pub fn alarm_console_link(region: &str, alarm_name: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/cloudwatch/home?region={region}#alarmsV2:alarm/{}",
        urlencoding::encode(alarm_name)
    )
}

fn arn_segment<'a>(arn: &'a str, index: usize, field: &str) -> Result<&'a str> {
    arn.split(':')
        .nth(index)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| RelayError::missing(format!("{field}[{index}]")))
}

fn lookup(table: &StateTable, state: &str) -> Result<(Theme, Destination)> {
    let route = table.lookup(state)?;
    Ok((route.theme, route.destination))
}

fn alarm(detail: &Value, request: &Request<'_>) -> Result<(MessageCard, Destination)> {
    let account = required_str(detail, &["AWSAccountId"])?;
    let name = required_str(detail, &["AlarmName"])?;
    let arn = required_str(detail, &["AlarmArn"])?;
    let new_state = required_str(detail, &["NewStateValue"])?;
    let old_state = required_str(detail, &["OldStateValue"])?;
    let reason = required_str(detail, &["NewStateReason"])?;
    // Alarms created without a description carry `null` here.
    let description = detail
        .get("AlarmDescription")
        .ok_or_else(|| RelayError::missing("AlarmDescription"))?
        .as_str()
        .unwrap_or_default();
    let changed = required_str(detail, &["StateChangeTime"])?;

    let region = arn_segment(arn, 3, "AlarmArn")?;
    let changed = format_timestamp(changed, &request.config.time_format)?;
    let (theme, default) = lookup(&ALARM_STATES, new_state)?;
    let destination = request
        .config
        .alarm_overrides
        .resolve(&request.envelope.topic_arn, default);

    let summary = format!("AWS CloudWatch Alarm | {region} | {account}");
    let text = format!(
        "Alarm <b><a href=\"{link}\">{name}</a></b><br />\
         Description <b>{description}</b><br />\
         State <b>{old_state}</b> &rarr; <b>{new_state}</b><br />\
         Reason {reason}<br />\
         Changed at <b>{changed}</b>",
        link = alarm_console_link(region, name),
    );
    Ok((MessageCard::new(summary, theme, text), destination))
}

fn approval(detail: &Value, request: &Request<'_>) -> Result<(MessageCard, Destination)> {
    let pipeline = required_str(detail, &["approval", "pipelineName"])?;
    let stage = required_str(detail, &["approval", "stageName"])?;
    let action = required_str(detail, &["approval", "actionName"])?;
    let review_link = required_str(detail, &["approval", "approvalReviewLink"])?;
    let region = required_str(detail, &["region"])?;
    let console_link = required_str(detail, &["consoleLink"])?;
    let account = request.envelope.account()?;

    let summary = request
        .envelope
        .subject
        .as_deref()
        .unwrap_or(SUBJECT_MISSING);
    let text = format!(
        "AWS CodePipeline Approval | {region} | {account}<br />\
         Pipeline <b><a href=\"{console_link}\">{pipeline}</a></b><br />\
         Stage name <b>{stage}</b><br />\
         Action name <b>{action}</b><br />\
         <b><a href=\"{review_link}\">Approve or Reject</a></b>"
    );
    Ok((
        MessageCard::new(summary, Theme::Warning, text),
        Destination::Normal,
    ))
}

fn codebuild_state(detail: &Value, _: &Request<'_>) -> Result<(MessageCard, Destination)> {
    let region = required_str(detail, &["region"])?;
    let account = required_str(detail, &["account"])?;
    let project = required_str(detail, &["detail", "project-name"])?;
    let status = required_str(detail, &["detail", "build-status"])?;
    let logs = detail.get("detail").map_or(LOGS_PLACEHOLDER, logs_deep_link);

    let (theme, destination) = lookup(&CODEBUILD_BUILD_STATES, status)?;
    let summary = format!("AWS CodeBuild Notification | {region} | {account}");
    let text = format!(
        "Project <b>{project}</b> (<a href=\"{logs}\">logs</a>)<br />\
         CodeBuild build state <b>{status}</b><br />"
    );
    Ok((MessageCard::new(summary, theme, text), destination))
}

fn codebuild_phase(detail: &Value, _: &Request<'_>) -> Result<(MessageCard, Destination)> {
    let region = required_str(detail, &["region"])?;
    let account = required_str(detail, &["account"])?;
    let project = required_str(detail, &["detail", "project-name"])?;
    let phase = required_str(detail, &["detail", "completed-phase"])?;
    let status = required_str(detail, &["detail", "completed-phase-status"])?;
    let logs = detail.get("detail").map_or(LOGS_PLACEHOLDER, logs_deep_link);

    let (theme, destination) = lookup(&CODEBUILD_PHASE_STATUSES, status)?;
    let summary = format!("AWS CodeBuild Notification | {region} | {account}");
    let text = format!(
        "Project <b>{project}</b> (<a href=\"{logs}\">logs</a>)<br />\
         CodeBuild phase <b>{phase}</b><br />\
         Codebuild status <b>{status}</b>"
    );
    Ok((MessageCard::new(summary, theme, text), destination))
}

fn pipeline_execution(detail: &Value, _: &Request<'_>) -> Result<(MessageCard, Destination)> {
    let region = required_str(detail, &["region"])?;
    let account = required_str(detail, &["account"])?;
    let pipeline = required_str(detail, &["detail", "pipeline"])?;
    let state = required_str(detail, &["detail", "state"])?;

    let (theme, destination) = lookup(&PIPELINE_EXECUTION_STATES, state)?;
    let summary = format!("AWS CodePipeline Notification | {region} | {account}");
    let text = format!(
        "Pipeline <b>{pipeline}</b><br />\
         CodePipeline state <b>{state}</b><br />"
    );
    Ok((MessageCard::new(summary, theme, text), destination))
}

fn pipeline_action(detail: &Value, _: &Request<'_>) -> Result<(MessageCard, Destination)> {
    let region = required_str(detail, &["region"])?;
    let account = required_str(detail, &["account"])?;
    let pipeline = required_str(detail, &["detail", "pipeline"])?;
    let stage = required_str(detail, &["detail", "stage"])?;
    let state = required_str(detail, &["detail", "state"])?;

    let (theme, destination) = lookup(&PIPELINE_ACTION_STATES, state)?;
    let summary = format!("AWS CodePipeline Notification | {region} | {account}");
    let text = format!(
        "Pipeline <b>{pipeline}</b><br />\
         CodePipeline stage <b>{stage}</b><br />\
         CodePipeline state <b>{state}</b>"
    );
    Ok((MessageCard::new(summary, theme, text), destination))
}

fn unknown(_: &Value, request: &Request<'_>) -> Result<(MessageCard, Destination)> {
    let envelope = request.envelope;
    let subject = envelope.subject.as_deref().unwrap_or(SUBJECT_MISSING);
    let destination = request
        .config
        .generic_overrides
        .resolve(&envelope.topic_arn, Destination::Normal);

    let summary = format!("AWS SNS Teams Relay: {subject}");
    let text = format!(
        "Message: [{}]<br />Relayed by {}",
        envelope.message, request.function_arn
    );
    Ok((MessageCard::new(summary, Theme::DEFAULT, text), destination))
}
