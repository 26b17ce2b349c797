//! Teams "MessageCard" payload.

use serde::Serialize;
use serde_json::Value;

use crate::route::{Destination, Theme};

const CARD_TYPE: &str = "MessageCard";
const CARD_CONTEXT: &str = "http://schema.org/extensions";

/// Legacy actionable message card accepted by Teams incoming webhooks.
///
/// The title always mirrors the summary, and no actions are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCard {
    #[serde(rename = "@type")]
    card_type: &'static str,
    #[serde(rename = "@context")]
    context: &'static str,
    summary: String,
    #[serde(rename = "themeColor")]
    theme_color: &'static str,
    text: String,
    title: String,
    #[serde(rename = "potentialAction")]
    potential_action: Vec<Value>,
}

impl MessageCard {
    pub fn new(summary: impl Into<String>, theme: Theme, text: impl Into<String>) -> Self {
        let summary = summary.into();
        Self {
            card_type: CARD_TYPE,
            context: CARD_CONTEXT,
            title: summary.clone(),
            summary,
            theme_color: theme.hex(),
            text: text.into(),
            potential_action: Vec::new(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn theme_color(&self) -> &str {
        self.theme_color
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A rendered card and where it is going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub card: MessageCard,
    pub destination: Destination,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_wire_format() {
        let card = MessageCard::new("hello", Theme::Warning, "<b>body</b>");
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(
            value,
            json!({
                "@type": "MessageCard",
                "@context": "http://schema.org/extensions",
                "summary": "hello",
                "themeColor": "ffcc00",
                "text": "<b>body</b>",
                "title": "hello",
                "potentialAction": [],
            })
        );
    }
}
