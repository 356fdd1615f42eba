//! Client and server message envelopes.
//!
//! Both directions are closed tagged unions keyed by `type`. A frame whose tag
//! is not listed here fails to decode and is dropped by the channel instead of
//! being passed through.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::element::DomElement;
use crate::error::ChannelError;

/// Session mode negotiated in `session_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    #[default]
    VisualCopilot,
    Voice,
}

/// Result status reported in `execution_complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "success"),
            ExecutionStatus::Error => write!(f, "error"),
        }
    }
}

/// What a command did to the page, reported with `execution_complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// The snapshot hash differs from the one taken before the command.
    pub dom_changed: bool,
    pub url_changed: bool,
    /// Descriptors whose id was not in the previous snapshot.
    pub new_elements_count: usize,
    pub current_url: String,
    pub has_modal: bool,
    /// Time from dispatch to the end of the settle wait.
    pub settle_time_ms: u64,
    pub dom_hash: u32,
    pub scroll_y: i64,
}

/// Outbound message (client -> backend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SessionConfig {
        mode: SessionMode,
        /// Epoch milliseconds.
        timestamp: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current_url: Option<String>,
    },
    DomUpdate {
        elements: Vec<DomElement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    ExecutionComplete {
        status: ExecutionStatus,
        timestamp: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<ExecutionOutcome>,
    },
    /// Keepalive reply to [`ServerMessage::Ping`].
    Pong,
}

impl ClientMessage {
    pub fn session_config(
        mode: SessionMode,
        agent_id: Option<String>,
        current_url: Option<String>,
    ) -> Self {
        ClientMessage::SessionConfig {
            mode,
            timestamp: now_millis(),
            agent_id,
            current_url,
        }
    }

    pub fn dom_update(elements: Vec<DomElement>, url: Option<String>) -> Self {
        ClientMessage::DomUpdate { elements, url }
    }

    pub fn execution_complete(status: ExecutionStatus) -> Self {
        ClientMessage::ExecutionComplete {
            status,
            timestamp: now_millis(),
            outcome: None,
        }
    }

    pub fn execution_outcome(status: ExecutionStatus, outcome: ExecutionOutcome) -> Self {
        ClientMessage::ExecutionComplete {
            status,
            timestamp: now_millis(),
            outcome: Some(outcome),
        }
    }

    /// Wire tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::SessionConfig { .. } => "session_config",
            ClientMessage::DomUpdate { .. } => "dom_update",
            ClientMessage::ExecutionComplete { .. } => "execution_complete",
            ClientMessage::Pong => "pong",
        }
    }

    pub fn encode(&self) -> Result<String, ChannelError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inbound message (backend -> client).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Command { payload: Command },
    StateUpdate { state: String },
    SessionCreated { session_id: String },
    /// Move the page to another route.
    Navigate { url: String },
    Ping,
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self, ChannelError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Command { .. } => "command",
            ServerMessage::StateUpdate { .. } => "state_update",
            ServerMessage::SessionCreated { .. } => "session_created",
            ServerMessage::Navigate { .. } => "navigate",
            ServerMessage::Ping => "ping",
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
