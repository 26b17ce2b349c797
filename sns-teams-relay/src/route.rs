use std::collections::HashSet;

use crate::{
    classify::Family,
    error::{RelayError, Result},
};

/// Card accent colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Info,
    Failure,
    Success,
    Warning,
}

impl Theme {
    pub const DEFAULT: Theme = Theme::Info;

    pub fn hex(&self) -> &'static str {
        match self {
            Theme::Info => "1919ff",
            Theme::Failure => "b20000",
            Theme::Success => "007300",
            Theme::Warning => "ffcc00",
        }
    }
}

/// Which of the two configured webhooks receives a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Normal,
    Alert,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Normal => "normal",
            Destination::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub theme: Theme,
    pub destination: Destination,
}

const fn route(theme: Theme, destination: Destination) -> Route {
    Route { theme, destination }
}

use Destination::{Alert, Normal};
use Theme::{Failure, Info, Success, Warning};

/// Static state → route mapping for one event family.
#[derive(Debug)]
pub struct StateTable {
    pub family: Family,
    pub entries: &'static [(&'static str, Route)],
}

impl StateTable {
    /// Looks up `state`. A state without an entry is an error, never a default.
    pub fn lookup(&self, state: &str) -> Result<Route> {
        self.entries
            .iter()
            .find(|(key, _)| *key == state)
            .map(|(_, route)| *route)
            .ok_or_else(|| RelayError::UnmappedState {
                family: self.family,
                state: state.to_string(),
            })
    }
}

pub static ALARM_STATES: StateTable = StateTable {
    family: Family::Alarm,
    entries: &[
        ("OK", route(Success, Normal)),
        ("ALARM", route(Failure, Alert)),
        ("INSUFFICIENT_DATA", route(Warning, Normal)),
    ],
};

pub static CODEBUILD_BUILD_STATES: StateTable = StateTable {
    family: Family::CodeBuildState,
    entries: &[
        ("IN_PROGRESS", route(Info, Normal)),
        ("SUCCEEDED", route(Success, Normal)),
        ("FAILED", route(Failure, Alert)),
        ("STOPPED", route(Warning, Normal)),
    ],
};

pub static CODEBUILD_PHASE_STATUSES: StateTable = StateTable {
    family: Family::CodeBuildPhase,
    entries: &[
        ("TIMED_OUT", route(Failure, Alert)),
        ("STOPPED", route(Warning, Normal)),
        ("FAILED", route(Failure, Alert)),
        ("SUCCEEDED", route(Success, Normal)),
        ("FAULT", route(Failure, Alert)),
        ("CLIENT_ERROR", route(Failure, Alert)),
    ],
};

pub static PIPELINE_EXECUTION_STATES: StateTable = StateTable {
    family: Family::PipelineExecution,
    entries: &[
        ("CANCELED", route(Warning, Normal)),
        ("FAILED", route(Failure, Alert)),
        ("RESUMED", route(Info, Normal)),
        ("STARTED", route(Info, Normal)),
        ("STOPPED", route(Warning, Normal)),
        ("STOPPING", route(Warning, Normal)),
        ("SUCCEEDED", route(Success, Normal)),
        ("SUPERSEDED", route(Warning, Normal)),
    ],
};

pub static PIPELINE_ACTION_STATES: StateTable = StateTable {
    family: Family::PipelineAction,
    entries: &[
        ("ABANDONED", route(Warning, Normal)),
        ("CANCELED", route(Warning, Normal)),
        ("FAILED", route(Failure, Alert)),
        ("STARTED", route(Info, Normal)),
        ("SUCCEEDED", route(Success, Normal)),
    ],
};

/// Topics whose messages are always sent to a fixed destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicOverrides {
    pub alert: HashSet<String>,
    pub normal: HashSet<String>,
}

impl TopicOverrides {
    pub fn new<A, N>(alert: A, normal: N) -> Self
    where
        A: IntoIterator<Item = String>,
        N: IntoIterator<Item = String>,
    {
        Self {
            alert: alert.into_iter().collect(),
            normal: normal.into_iter().collect(),
        }
    }

    /// Alert list first, then normal list, then `default`.
    pub fn resolve(&self, topic: &str, default: Destination) -> Destination {
        if self.alert.contains(topic) {
            Destination::Alert
        } else if self.normal.contains(topic) {
            Destination::Normal
        } else {
            default
        }
    }
}
