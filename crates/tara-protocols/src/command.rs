//! Server-issued page commands and their outcomes.

use serde::{Deserialize, Serialize};

use crate::message::ExecutionStatus;

/// Kind of visual/interactive effect requested by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Click,
    /// Replace the value of an input with `text`.
    TypeText,
    ScrollTo,
    /// Scroll the viewport; `text` containing "up" reverses the direction.
    Scroll,
    Highlight,
    Spotlight,
    Clear,
    /// Do nothing for a while and let the page catch up.
    Wait,
    /// A kind this client does not implement. Answered with an error.
    #[serde(other)]
    Unsupported,
}

impl CommandKind {
    /// Whether the command needs a resolvable target element.
    pub fn needs_target(&self) -> bool {
        matches!(
            self,
            CommandKind::Click
                | CommandKind::TypeText
                | CommandKind::ScrollTo
                | CommandKind::Highlight
                | CommandKind::Spotlight
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Click => "click",
            CommandKind::TypeText => "type_text",
            CommandKind::ScrollTo => "scroll_to",
            CommandKind::Scroll => "scroll",
            CommandKind::Highlight => "highlight",
            CommandKind::Spotlight => "spotlight",
            CommandKind::Clear => "clear",
            CommandKind::Wait => "wait",
            CommandKind::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single page instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    /// Descriptor id from the latest snapshot; empty for `clear`.
    #[serde(default, alias = "id")]
    pub target_id: String,
    /// Caption for highlight/spotlight, fallback match text for click/scroll_to,
    /// the value for type_text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Command {
    pub fn new(kind: CommandKind, target_id: impl Into<String>) -> Self {
        Self {
            kind,
            target_id: target_id.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn clear() -> Self {
        Self::new(CommandKind::Clear, "")
    }
}

/// Outcome of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub reason: Option<String>,
}

impl ExecutionResult {
    pub fn success() -> Self {
        Self {
            status: ExecutionStatus::Success,
            reason: None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Error,
            reason: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
