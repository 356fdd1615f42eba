//! Session lifecycle states and host callbacks.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::CopilotError;
use crate::message::ExecutionStatus;

/// Co-pilot session state.
///
/// ```text
/// idle ─► starting ─► listening ◄──► thinking
///                        ▲  │           │
///                        │  ▼           ▼
///                        executing ◄────┘
/// (any) ─► stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopilotState {
    /// No session.
    #[default]
    Idle,
    /// Config sent, waiting for the backend's acknowledgement.
    Starting,
    /// Streaming DOM, waiting for a command.
    Listening,
    /// A server round trip is pending.
    Thinking,
    /// A command is being applied.
    Executing,
    /// Terminal; the channel is closing or closed.
    Stopped,
}

impl CopilotState {
    /// A session exists and has not stopped.
    pub fn is_active(&self) -> bool {
        !matches!(self, CopilotState::Idle | CopilotState::Stopped)
    }

    /// The backend has acknowledged the session.
    pub fn is_ready(&self) -> bool {
        matches!(self, CopilotState::Listening | CopilotState::Thinking)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CopilotState::Idle => "idle",
            CopilotState::Starting => "starting",
            CopilotState::Listening => "listening",
            CopilotState::Thinking => "thinking",
            CopilotState::Executing => "executing",
            CopilotState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for CopilotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle callbacks surfaced to the hosting application.
///
/// Called from the session's event loop; implementations must return quickly.
/// `on_state_change` is delivered exactly once per state transition.
pub trait SessionObserver: Send + Sync {
    fn on_state_change(&self, _state: CopilotState) {}

    fn on_error(&self, _error: &CopilotError) {}

    fn on_command(&self, _command: &Command) {}

    fn on_execute(&self, _status: ExecutionStatus) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_activity() {
        assert!(!CopilotState::Idle.is_active());
        assert!(CopilotState::Starting.is_active());
        assert!(CopilotState::Executing.is_active());
        assert!(!CopilotState::Stopped.is_active());
    }

    #[test]
    fn test_state_readiness() {
        assert!(!CopilotState::Starting.is_ready());
        assert!(CopilotState::Listening.is_ready());
        assert!(CopilotState::Thinking.is_ready());
        assert!(!CopilotState::Executing.is_ready());
    }

    #[test]
    fn test_state_serialize() {
        let json = serde_json::to_string(&CopilotState::Listening).unwrap();
        assert_eq!(json, "\"listening\"");
        assert_eq!(CopilotState::Stopped.to_string(), "stopped");
    }
}
