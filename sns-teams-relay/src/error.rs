//! Error types for the relay.

use thiserror::Error;

use crate::classify::Family;

pub type Result<T, E = RelayError> = std::result::Result<T, E>;

/// Errors that fail a relay invocation.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required field is absent from the event (or is not a string)
    #[error("missing required field `{path}`")]
    MissingField { path: String },

    /// The event carries a state that has no entry in its family's table
    #[error("no route for {family} state `{state}`")]
    UnmappedState { family: Family, state: String },

    /// The alarm state change time could not be parsed
    #[error("invalid timestamp `{value}`: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The Lambda invocation carried no SNS records
    #[error("event contains no SNS records")]
    NoRecords,

    /// A configured webhook URL could not be parsed
    #[error("invalid url for `{key}`: {reason}")]
    InvalidUrl { key: &'static str, reason: String },

    /// The configured time format is not a valid strftime pattern
    #[error("invalid time format `{0}`")]
    InvalidTimeFormat(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelayError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }
}
