//! Completion candidates offered at an input position

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    Plain { text: String },
    Tooltip { text: String, tooltip: String },
}

impl Suggestion {
    pub fn plain(text: impl Into<String>) -> Self {
        Suggestion::Plain { text: text.into() }
    }

    pub fn tooltip(text: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Suggestion::Tooltip {
            text: text.into(),
            tooltip: tooltip.into(),
        }
    }

    /// The text that would be inserted
    pub fn text(&self) -> &str {
        match self {
            Suggestion::Plain { text } | Suggestion::Tooltip { text, .. } => text,
        }
    }

    pub fn tooltip_text(&self) -> Option<&str> {
        match self {
            Suggestion::Plain { .. } => None,
            Suggestion::Tooltip { tooltip, .. } => Some(tooltip),
        }
    }
}

impl From<&str> for Suggestion {
    fn from(text: &str) -> Self {
        Suggestion::plain(text)
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Plain { text } => write!(f, "{}", text),
            Suggestion::Tooltip { text, tooltip } => write!(f, "{} ({})", text, tooltip),
        }
    }
}
