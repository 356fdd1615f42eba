//! `tara run`: a live session against a page fixture.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tara_channel_ws::WsConnector;
use tara_config::Config;
use tara_protocols::{Command, CopilotError, CopilotState, ExecutionStatus, SessionObserver};
use tara_session::{HostAdapter, NativeWidgetLoader, SessionOptions};
use tracing::{error, info, warn};

use crate::cmd_scan::load_page;

/// Logs session callbacks.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_state_change(&self, state: CopilotState) {
        info!(state = %state, "Co-pilot state");
    }

    fn on_error(&self, error: &CopilotError) {
        error!(error = %error, "Co-pilot error");
    }

    fn on_command(&self, command: &Command) {
        info!(command = %command.kind, target_id = %command.target_id, "Command received");
    }

    fn on_execute(&self, status: ExecutionStatus) {
        info!(status = %status, "Command finished");
    }
}

pub(crate) async fn handle_run(
    config: &Config,
    page: &Path,
    ws_url: Option<String>,
    agent_id: Option<String>,
) -> anyhow::Result<()> {
    let page = Arc::new(load_page(page)?);
    let connector = Arc::new(WsConnector::new(config.channel.connect_timeout()));
    let loader = NativeWidgetLoader::new(connector, page, SessionOptions::from_config(config));

    let mut host_config = config.host.clone();
    if ws_url.is_some() {
        host_config.ws_url = ws_url;
    }
    if agent_id.is_some() {
        host_config.agent_id = agent_id;
    }

    let host = HostAdapter::new(Arc::new(loader), host_config, Arc::new(ConsoleObserver));
    host.start().await?;
    info!("Session running, press Ctrl-C to stop");

    let mut poll = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = poll.tick() => {
                if !host.is_active() {
                    warn!("Session ended");
                    break;
                }
            }
        }
    }

    host.destroy().await;
    Ok(())
}
