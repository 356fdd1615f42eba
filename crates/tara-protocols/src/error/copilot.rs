//! Session-level errors delivered to the host through `on_error`.

use thiserror::Error;

use super::{ChannelError, CommandResolutionError};

/// The widget script (or native widget factory) could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to load TARA widget script: {reason}")]
pub struct ScriptLoadError {
    pub reason: String,
}

impl ScriptLoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopilotError {
    #[error(transparent)]
    ScriptLoad(#[from] ScriptLoadError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Command failed: {0}")]
    CommandResolution(#[from] CommandResolutionError),
}

impl CopilotError {
    /// Terminal errors end the session; local ones only fail a single command.
    pub fn is_terminal(&self) -> bool {
        match self {
            CopilotError::ScriptLoad(_) => true,
            CopilotError::Channel(e) => e.is_terminal(),
            CopilotError::CommandResolution(_) => false,
        }
    }
}
