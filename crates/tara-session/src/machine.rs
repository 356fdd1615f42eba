//! Session state machine.

use std::sync::Arc;

use parking_lot::RwLock;
use tara_protocols::{
    Command, CopilotError, CopilotState, ExecutionStatus, SessionMode, SessionObserver,
};
use tracing::{debug, error, info, warn};

/// Read-only view of a session's state, shared with the widget.
pub type StateCell = Arc<RwLock<CopilotState>>;

/// State, transition rules and observer delivery for one session.
///
/// Not thread-safe by design of use: it lives on the runner task.
pub struct SessionMachine {
    state: StateCell,
    mode: SessionMode,
    session_id: String,
    observer: Arc<dyn SessionObserver>,
    error_reported: bool,
}

impl SessionMachine {
    /// A fresh session in `idle` with a locally assigned id.
    pub fn new(mode: SessionMode, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CopilotState::Idle)),
            mode,
            session_id: uuid::Uuid::new_v4().to_string(),
            observer,
            error_reported: false,
        }
    }

    pub fn state(&self) -> CopilotState {
        *self.state.read()
    }

    pub fn state_cell(&self) -> StateCell {
        self.state.clone()
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Adopt the backend's id for this session.
    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.session_id = session_id.into();
        info!(session_id = %self.session_id, "Session created by backend");
    }

    /// Whether `from -> to` is an edge of the lifecycle graph.
    pub fn is_allowed(from: CopilotState, to: CopilotState) -> bool {
        use CopilotState::*;
        matches!(
            (from, to),
            (Idle, Starting)
                | (Starting, Listening)
                | (Listening, Thinking)
                | (Thinking, Listening)
                | (Listening | Thinking, Executing)
                | (Executing, Listening)
                | (Starting | Listening | Thinking | Executing, Stopped)
        )
    }

    /// Move to `next`, notifying the observer exactly once.
    ///
    /// Self-transitions and edges outside the lifecycle graph are ignored.
    pub fn transition(&mut self, next: CopilotState) -> bool {
        let current = self.state();
        if current == next {
            return false;
        }
        if !Self::is_allowed(current, next) {
            warn!(from = %current, to = %next, "Ignoring illegal session transition");
            return false;
        }

        *self.state.write() = next;
        debug!(session_id = %self.session_id, from = %current, to = %next, "Session state changed");
        self.observer.on_state_change(next);
        true
    }

    /// Apply a backend `state_update`.
    pub fn apply_server_state(&mut self, state: &str) -> bool {
        match (self.state(), state) {
            // Any update acknowledges the session.
            (CopilotState::Starting, _) => self.transition(CopilotState::Listening),
            (CopilotState::Listening, "thinking") => self.transition(CopilotState::Thinking),
            (CopilotState::Thinking, "listening") => self.transition(CopilotState::Listening),
            (current, other) => {
                debug!(state = %current, update = other, "State update acknowledged");
                false
            }
        }
    }

    /// Report a terminal error and stop.
    ///
    /// The observer hears about at most one error per session.
    pub fn fail(&mut self, err: CopilotError) {
        if !self.error_reported && self.state() != CopilotState::Stopped {
            self.error_reported = true;
            error!(session_id = %self.session_id, error = %err, "Session failed");
            self.observer.on_error(&err);
        }
        self.transition(CopilotState::Stopped);
    }

    pub fn notify_command(&self, command: &Command) {
        self.observer.on_command(command);
    }

    pub fn notify_execute(&self, status: ExecutionStatus) {
        self.observer.on_execute(status);
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
