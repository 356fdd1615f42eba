//! The task that owns a live session.
//!
//! One runner per session. It is the only place the machine, the executor
//! and the latest snapshot are touched, so commands, state updates and
//! rescans are applied strictly one after another.

use std::sync::Arc;
use std::time::Duration;

use tara_dom::{CommandExecutor, DomScanner, DomSnapshot};
use tara_protocols::{
    ChannelError, ChannelEvent, ChannelEvents, ClientMessage, Command, CopilotError, CopilotState,
    ExecutionOutcome, ExecutionStatus, Page, ServerMessage, Transport,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::machine::SessionMachine;

/// Requests from outside the runner task.
#[derive(Debug)]
pub enum Control {
    /// Scan the page and stream the snapshot even if it is unchanged.
    Rescan,
    /// End the session; `ack` fires once the runner has stopped.
    Stop { ack: oneshot::Sender<()> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Drives one session from handshake to `stopped`.
pub struct SessionRunner {
    machine: SessionMachine,
    transport: Box<dyn Transport>,
    events: ChannelEvents,
    control: mpsc::UnboundedReceiver<Control>,
    page: Arc<dyn Page>,
    scanner: DomScanner,
    executor: CommandExecutor,
    snapshot: DomSnapshot,
    last_sent: Option<u32>,
}

impl SessionRunner {
    pub fn new(
        machine: SessionMachine,
        transport: Box<dyn Transport>,
        events: ChannelEvents,
        control: mpsc::UnboundedReceiver<Control>,
        page: Arc<dyn Page>,
        scanner: DomScanner,
        executor: CommandExecutor,
    ) -> Self {
        let snapshot = DomSnapshot::empty(page.url());
        Self {
            machine,
            transport,
            events,
            control,
            page,
            scanner,
            executor,
            snapshot,
            last_sent: None,
        }
    }

    pub fn state(&self) -> CopilotState {
        self.machine.state()
    }

    /// The snapshot commands are resolved against.
    pub fn snapshot(&self) -> &DomSnapshot {
        &self.snapshot
    }

    /// Send `session_config` followed by the first full `dom_update`.
    ///
    /// On failure the session is already stopped and the error reported.
    pub fn handshake(&mut self, agent_id: Option<String>) -> Result<(), CopilotError> {
        let config =
            ClientMessage::session_config(self.machine.mode(), agent_id, Some(self.page.url()));
        self.try_send(&config)?;
        self.rescan(true)?;
        Ok(())
    }

    /// Process control requests, channel events and marker expiry until
    /// the session stops.
    pub async fn run(mut self) {
        info!(session_id = %self.machine.session_id(), "Session runner started");

        loop {
            let deadline = self.executor.marker_deadline();
            let flow = tokio::select! {
                control = self.control.recv() => self.on_control(control),
                event = self.events.recv() => self.on_event(event).await,
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.executor.expire(self.page.as_ref(), Instant::now());
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                break;
            }
        }

        debug!(session_id = %self.machine.session_id(), "Session runner exited");
    }

    fn on_control(&mut self, control: Option<Control>) -> Flow {
        match control {
            Some(Control::Rescan) => self.flow(|runner| runner.rescan(true)),
            Some(Control::Stop { ack }) => {
                self.shutdown();
                let _ = ack.send(());
                Flow::Exit
            }
            // The widget is gone.
            None => {
                self.shutdown();
                Flow::Exit
            }
        }
    }

    async fn on_event(&mut self, event: Option<ChannelEvent>) -> Flow {
        match event {
            Some(ChannelEvent::Message(message)) => self.on_message(message).await,
            Some(ChannelEvent::Closed { reason }) => {
                info!(reason = reason.as_deref().unwrap_or(""), "Backend closed the session");
                self.fail(ChannelError::Disconnected);
                Flow::Exit
            }
            Some(ChannelEvent::Error(e)) if !e.is_terminal() => {
                debug!(error = %e, "Ignoring channel error");
                Flow::Continue
            }
            Some(ChannelEvent::Error(e)) => {
                self.fail(e);
                Flow::Exit
            }
            None => {
                self.fail(ChannelError::Disconnected);
                Flow::Exit
            }
        }
    }

    async fn on_message(&mut self, message: ServerMessage) -> Flow {
        debug!(kind = message.kind(), state = %self.machine.state(), "Backend message");
        match message {
            ServerMessage::Ping => self.flow(|runner| runner.try_send(&ClientMessage::Pong)),
            ServerMessage::SessionCreated { session_id } => {
                self.machine.set_session_id(session_id);
                if self.machine.state() == CopilotState::Starting {
                    self.machine.transition(CopilotState::Listening);
                }
                Flow::Continue
            }
            ServerMessage::StateUpdate { state } => {
                self.machine.apply_server_state(&state);
                Flow::Continue
            }
            ServerMessage::Command { payload } => self.run_command(payload).await,
            ServerMessage::Navigate { url } => self.run_navigation(url).await,
        }
    }

    async fn run_command(&mut self, command: Command) -> Flow {
        self.machine.notify_command(&command);

        let state = self.machine.state();
        if !state.is_ready() {
            warn!(state = %state, command = %command.kind, "Rejecting command before the session is ready");
            let flow = self.flow(|runner| {
                runner.try_send(&ClientMessage::execution_complete(ExecutionStatus::Error))
            });
            if flow == Flow::Continue {
                self.machine.notify_execute(ExecutionStatus::Error);
            }
            return flow;
        }

        self.machine.transition(CopilotState::Executing);
        let started = Instant::now();
        let url_before = self.page.url();
        let result = self
            .executor
            .execute(self.page.as_ref(), &command, &self.snapshot);
        info!(
            command = %command.kind,
            target_id = %command.target_id,
            status = %result.status,
            "Command executed"
        );

        // Let the page react before reporting. Channel traffic waits, so the
        // next command is only read after this one completes.
        let rescan_requested = match self.settle(self.executor.settle_for(command.kind)).await {
            Ok(requested) => requested,
            Err(flow) => return flow,
        };

        let fresh = self.scanner.scan(self.page.as_ref());
        let current_url = self.page.url();
        let outcome = ExecutionOutcome {
            dom_changed: fresh.hash != self.snapshot.hash,
            url_changed: current_url != url_before,
            new_elements_count: fresh.new_elements_since(&self.snapshot),
            current_url,
            has_modal: fresh.has_modal,
            settle_time_ms: started.elapsed().as_millis() as u64,
            dom_hash: fresh.hash,
            scroll_y: self.page.viewport().scroll_y.round() as i64,
        };
        let complete = ClientMessage::execution_outcome(result.status, outcome);
        if let Err(e) = self.try_send(&complete) {
            debug!(error = %e, "Execution result not delivered");
            return Flow::Exit;
        }
        self.machine.notify_execute(result.status);
        self.machine.transition(CopilotState::Listening);

        // The command may have changed the page.
        self.flow(|runner| runner.publish(fresh, rescan_requested))
    }

    /// Follow a server-requested route change, then stream the new page.
    ///
    /// Ignored until the session is ready. No `execution_complete` is sent.
    async fn run_navigation(&mut self, url: String) -> Flow {
        let state = self.machine.state();
        if !state.is_ready() {
            warn!(state = %state, url = %url, "Ignoring navigation before the session is ready");
            return Flow::Continue;
        }

        self.machine.transition(CopilotState::Executing);
        self.executor.clear(self.page.as_ref());
        match self.page.navigate(&url) {
            Ok(()) => info!(url = %url, "Navigated"),
            Err(e) => warn!(url = %url, error = %e, "Navigation failed"),
        }

        if let Err(flow) = self.settle(self.executor.navigation_settle()).await {
            return flow;
        }
        self.machine.transition(CopilotState::Listening);
        self.flow(|runner| runner.rescan(true))
    }

    /// Wait `duration`, honouring only control requests.
    ///
    /// Returns whether a rescan was requested meanwhile, or the flow to
    /// return when the session ended during the wait.
    async fn settle(&mut self, duration: Duration) -> Result<bool, Flow> {
        let mut rescan_requested = false;
        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => return Ok(rescan_requested),
                control = self.control.recv() => match control {
                    Some(Control::Rescan) => rescan_requested = true,
                    other => return Err(self.on_control(other)),
                },
            }
        }
    }

    /// Scan the page and stream the snapshot if it changed (or if forced).
    fn rescan(&mut self, force: bool) -> Result<(), ChannelError> {
        let snapshot = self.scanner.scan(self.page.as_ref());
        self.publish(snapshot, force)
    }

    /// Adopt `snapshot` and stream it if it changed (or if forced).
    ///
    /// A changed snapshot while listening means a server round trip is due.
    fn publish(&mut self, snapshot: DomSnapshot, force: bool) -> Result<(), ChannelError> {
        let changed = self.last_sent != Some(snapshot.hash);
        if !changed && !force {
            self.snapshot = snapshot;
            return Ok(());
        }

        let update =
            ClientMessage::dom_update(snapshot.elements.clone(), Some(snapshot.url.clone()));
        debug!(elements = snapshot.len(), hash = snapshot.hash, forced = force, "Streaming snapshot");
        self.last_sent = Some(snapshot.hash);
        self.snapshot = snapshot;
        self.try_send(&update)?;

        if changed && self.machine.state() == CopilotState::Listening {
            self.machine.transition(CopilotState::Thinking);
        }
        Ok(())
    }

    /// Send, failing the session on error.
    fn try_send(&mut self, message: &ClientMessage) -> Result<(), ChannelError> {
        match self.transport.send(message) {
            Ok(()) => Ok(()),
            Err(e) => {
                let cause = self.pending_termination().unwrap_or(e);
                warn!(kind = message.kind(), error = %cause, "Send failed");
                self.fail(cause.clone());
                Err(cause)
            }
        }
    }

    /// The terminal event already queued behind a failed send, if any.
    fn pending_termination(&mut self) -> Option<ChannelError> {
        while let Ok(event) = self.events.try_recv() {
            match event {
                ChannelEvent::Closed { .. } => return Some(ChannelError::Disconnected),
                ChannelEvent::Error(e) if e.is_terminal() => return Some(e),
                _ => {}
            }
        }
        None
    }

    fn flow(&mut self, op: impl FnOnce(&mut Self) -> Result<(), ChannelError>) -> Flow {
        match op(self) {
            Ok(()) => Flow::Continue,
            Err(_) => Flow::Exit,
        }
    }

    fn shutdown(&mut self) {
        self.executor.clear(self.page.as_ref());
        self.transport.close();
        self.machine.transition(CopilotState::Stopped);
        info!(session_id = %self.machine.session_id(), "Session stopped");
    }

    fn fail(&mut self, error: ChannelError) {
        self.executor.clear(self.page.as_ref());
        self.transport.close();
        self.machine.fail(error.into());
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
