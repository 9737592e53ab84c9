//! Tool-result types.

use serde::{Deserialize, Serialize};

/// A typed segment of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ToolContent {
    Text(String),
    /// Non-text content, identified by its kind (`image`, `audio`, ...).
    Other(String),
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Other(_) => None,
        }
    }
}

/// Join the text segments of a tool result with newlines.
pub fn join_text(content: &[ToolContent]) -> String {
    content
        .iter()
        .filter_map(ToolContent::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}
