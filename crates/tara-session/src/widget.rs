//! The co-pilot widget the host drives.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tara_config::{Config, ExecutorConfig, ScannerConfig};
use tara_dom::{CommandExecutor, DomScanner};
use tara_protocols::{
    Connector, CopilotError, CopilotState, Page, ScriptLoadError, SessionMode, SessionObserver,
    Widget, WidgetLoader, WidgetSettings,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::machine::{SessionMachine, StateCell};
use crate::runner::{Control, SessionRunner};

/// Everything a session needs besides its connector and page.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Backend endpoint.
    pub ws_url: String,
    pub agent_id: Option<String>,
    pub mode: SessionMode,
    pub scanner: ScannerConfig,
    pub executor: ExecutorConfig,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ws_url: config.channel.ws_url.clone(),
            agent_id: config.host.agent_id.clone(),
            mode: SessionMode::VisualCopilot,
            scanner: config.scanner.clone(),
            executor: config.executor.clone(),
        }
    }

    /// Apply the host's settings on top.
    pub fn with_settings(mut self, settings: &WidgetSettings) -> Self {
        if let Some(url) = &settings.ws_url {
            self.ws_url = url.clone();
        }
        if settings.agent_id.is_some() {
            self.agent_id = settings.agent_id.clone();
        }
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

struct SessionHandle {
    state: StateCell,
    control: mpsc::UnboundedSender<Control>,
}

impl SessionHandle {
    fn state(&self) -> CopilotState {
        *self.state.read()
    }
}

/// Runs at most one session at a time against one page.
///
/// Start and stop are serialized; a stop issued while a start is connecting
/// takes effect once the start has settled.
pub struct CopilotWidget {
    options: SessionOptions,
    connector: Arc<dyn Connector>,
    page: Arc<dyn Page>,
    observer: Arc<dyn SessionObserver>,
    generation: AtomicU64,
    lifecycle: tokio::sync::Mutex<()>,
    session: Mutex<Option<SessionHandle>>,
}

impl CopilotWidget {
    pub fn new(
        options: SessionOptions,
        connector: Arc<dyn Connector>,
        page: Arc<dyn Page>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            options,
            connector,
            page,
            observer,
            generation: AtomicU64::new(0),
            lifecycle: tokio::sync::Mutex::new(()),
            session: Mutex::new(None),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn active_control(&self) -> Option<mpsc::UnboundedSender<Control>> {
        self.session
            .lock()
            .as_ref()
            .filter(|s| s.state().is_active())
            .map(|s| s.control.clone())
    }
}

#[async_trait]
impl Widget for CopilotWidget {
    async fn start_visual_copilot(&self) -> Result<(), CopilotError> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_active() {
            debug!("Session already active");
            return Ok(());
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut machine = SessionMachine::new(self.options.mode, self.observer.clone());
        let (control, control_rx) = mpsc::unbounded_channel();
        *self.session.lock() = Some(SessionHandle {
            state: machine.state_cell(),
            control,
        });
        machine.transition(CopilotState::Starting);
        info!(generation, url = %self.options.ws_url, "Starting visual co-pilot");

        let (transport, events) = match self.connector.connect(&self.options.ws_url).await {
            Ok(connection) => connection,
            Err(e) => {
                machine.fail(e.clone().into());
                return Err(e.into());
            }
        };

        let mut runner = SessionRunner::new(
            machine,
            transport,
            events,
            control_rx,
            self.page.clone(),
            DomScanner::new(self.options.scanner.clone()),
            CommandExecutor::new(self.options.executor.clone(), self.options.scanner.generate_ids),
        );
        runner.handshake(self.options.agent_id.clone())?;
        tokio::spawn(runner.run());
        Ok(())
    }

    async fn stop_visual_copilot(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        let Some(control) = self.active_control() else {
            debug!("No active session to stop");
            return;
        };

        let (ack, stopped) = oneshot::channel();
        if control.send(Control::Stop { ack }).is_err() {
            return;
        }
        // The runner may have exited on its own in the meantime.
        let _ = stopped.await;
        info!(generation = self.generation(), "Visual co-pilot stopped");
    }

    fn is_active(&self) -> bool {
        self.state().is_active()
    }

    fn state(&self) -> CopilotState {
        self.session
            .lock()
            .as_ref()
            .map(SessionHandle::state)
            .unwrap_or_default()
    }

    async fn force_scan(&self) {
        match self.active_control() {
            Some(control) => {
                let _ = control.send(Control::Rescan);
            }
            None => debug!("Rescan skipped, no active session"),
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Builds [`CopilotWidget`]s in-process.
pub struct NativeWidgetLoader {
    connector: Arc<dyn Connector>,
    page: Arc<dyn Page>,
    options: SessionOptions,
}

impl NativeWidgetLoader {
    pub fn new(connector: Arc<dyn Connector>, page: Arc<dyn Page>, options: SessionOptions) -> Self {
        Self {
            connector,
            page,
            options,
        }
    }
}

#[async_trait]
impl WidgetLoader for NativeWidgetLoader {
    async fn load(
        &self,
        settings: WidgetSettings,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Arc<dyn Widget>, ScriptLoadError> {
        let options = self.options.clone().with_settings(&settings);
        let endpoint = url::Url::parse(&options.ws_url)
            .map_err(|e| ScriptLoadError::new(format!("invalid endpoint '{}': {}", options.ws_url, e)))?;
        info!(endpoint = %endpoint, agent_id = ?options.agent_id, "Widget loaded");

        Ok(Arc::new(CopilotWidget::new(
            options,
            self.connector.clone(),
            self.page.clone(),
            observer,
        )))
    }
}

#[cfg(test)]
#[path = "widget_tests.rs"]
mod tests;
