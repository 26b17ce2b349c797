use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_log")]
    pub log: String,
    pub webhook_url_normal: String,
    pub webhook_url_alert: String,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,
    #[serde(default)]
    pub alarm_alert_topics: TopicList,
    #[serde(default)]
    pub alarm_normal_topics: TopicList,
    #[serde(default)]
    pub generic_alert_topics: TopicList,
    #[serde(default)]
    pub generic_normal_topics: TopicList,
}

pub fn default_log() -> String {
    "sns_teams_relay=debug".to_string()
}

pub fn default_time_format() -> String {
    "%Y-%m-%d %H:%M UTC".to_string()
}

pub fn default_webhook_timeout_secs() -> u64 {
    10
}

/// Topic ARNs given either as a comma separated string (environment) or a list (file).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TopicList {
    Csv(String),
    List(Vec<String>),
}

impl Default for TopicList {
    fn default() -> Self {
        TopicList::List(Vec::new())
    }
}

impl TopicList {
    pub fn topics(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            TopicList::Csv(s) => s.split(',').collect(),
            TopicList::List(v) => v.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Settings {
    pub fn new<P: AsRef<Path>>(path: Option<P>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        if let Some(file) = path {
            builder = builder
                .add_source(File::with_name(&file.as_ref().to_string_lossy()).required(false));
        }
        // No prefix: WEBHOOK_URL_NORMAL, ALARM_ALERT_TOPICS, ...
        builder
            .add_source(Environment::default())
            .build()
            .and_then(|config| config.try_deserialize())
    }
}
