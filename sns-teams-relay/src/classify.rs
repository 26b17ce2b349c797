//! Decides which event family an SNS message belongs to.
//!
//! Families can overlap in shape (an alarm payload may carry a `detailType`,
//! an approval may carry both), so the rules are evaluated in a fixed order
//! and the first match wins.

use std::fmt;

use serde_json::Value;

use crate::envelope::Envelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Alarm,
    Approval,
    CodeBuildState,
    CodeBuildPhase,
    PipelineExecution,
    PipelineAction,
    Unknown,
}

impl Family {
    /// Maps an EventBridge `detailType` label to its family.
    pub fn from_detail_type(label: &str) -> Option<Self> {
        match label {
            "CodeBuild Build State Change" => Some(Self::CodeBuildState),
            "CodeBuild Build Phase Change" => Some(Self::CodeBuildPhase),
            "CodePipeline Pipeline Execution State Change" => Some(Self::PipelineExecution),
            "CodePipeline Action Execution State Change" => Some(Self::PipelineAction),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alarm => "alarm",
            Self::Approval => "approval",
            Self::CodeBuildState => "codebuild-state",
            Self::CodeBuildPhase => "codebuild-phase",
            Self::PipelineExecution => "pipeline-execution",
            Self::PipelineAction => "pipeline-action",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded message body together with the family it was matched to.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub family: Family,
    pub detail: Value,
}

type Rule = fn(&Value) -> Option<Family>;

// Order is significant.
const RULES: &[Rule] = &[is_alarm, is_approval, by_detail_type];

fn is_alarm(detail: &Value) -> Option<Family> {
    match detail.get("AlarmName") {
        Some(Value::Null) | None => None,
        Some(_) => Some(Family::Alarm),
    }
}

fn is_approval(detail: &Value) -> Option<Family> {
    detail.get("approval").map(|_| Family::Approval)
}

fn by_detail_type(detail: &Value) -> Option<Family> {
    detail
        .get("detailType")
        .and_then(Value::as_str)
        .and_then(Family::from_detail_type)
}

pub fn classify(envelope: &Envelope) -> Classified {
    let detail = envelope.detail();
    let family = RULES
        .iter()
        .find_map(|rule| rule(&detail))
        .unwrap_or(Family::Unknown);

    Classified { family, detail }
}
