use super::*;

use tara_channel_ws::memory::{MemoryBackend, MemoryConnector};
use tara_dom::memory::FixtureNode;
use tara_dom::{MemoryPage, PageFixture};
use tara_protocols::{ChannelError, ClientMessage};

#[derive(Default)]
struct Recorder {
    states: Mutex<Vec<CopilotState>>,
    errors: Mutex<Vec<CopilotError>>,
}

impl SessionObserver for Recorder {
    fn on_state_change(&self, state: CopilotState) {
        self.states.lock().push(state);
    }

    fn on_error(&self, error: &CopilotError) {
        self.errors.lock().push(error.clone());
    }
}

fn page() -> Arc<MemoryPage> {
    Arc::new(MemoryPage::new(PageFixture {
        url: "https://app.example/".to_string(),
        body: vec![FixtureNode::new("button")
            .id("go")
            .text("Go")
            .rect(0.0, 0.0, 50.0, 20.0)],
        ..Default::default()
    }))
}

fn widget() -> (CopilotWidget, MemoryConnector, MemoryBackend, Arc<Recorder>) {
    let (connector, backend) = MemoryConnector::pair();
    let recorder = Arc::new(Recorder::default());
    let options = SessionOptions {
        ws_url: "memory://backend".to_string(),
        ..Default::default()
    };
    let widget = CopilotWidget::new(
        options,
        Arc::new(connector.clone()),
        page(),
        recorder.clone(),
    );
    (widget, connector, backend, recorder)
}

#[test]
fn test_options_from_config() {
    let mut config = Config::default();
    config.host.agent_id = Some("agent-1".to_string());
    let options = SessionOptions::from_config(&config);
    assert_eq!(options.ws_url, tara_config::DEFAULT_WS_URL);
    assert_eq!(options.agent_id.as_deref(), Some("agent-1"));
    assert_eq!(options.mode, SessionMode::VisualCopilot);
}

#[test]
fn test_settings_override_options() {
    let options = SessionOptions::default().with_settings(&WidgetSettings {
        ws_url: Some("wss://other/ws".to_string()),
        agent_id: None,
    });
    assert_eq!(options.ws_url, "wss://other/ws");
    assert!(options.agent_id.is_none());
}

#[tokio::test]
async fn test_new_widget_is_idle() {
    let (widget, _, _, _) = widget();
    assert_eq!(widget.state(), CopilotState::Idle);
    assert!(!widget.is_active());
    assert_eq!(widget.generation(), 0);
}

#[tokio::test]
async fn test_start_opens_session() {
    let (widget, _, mut backend, recorder) = widget();
    widget.start_visual_copilot().await.unwrap();

    assert_eq!(widget.state(), CopilotState::Starting);
    assert_eq!(widget.generation(), 1);

    let mut conn = backend.accept().await.unwrap();
    assert_eq!(conn.url, "memory://backend");
    assert!(matches!(
        conn.recv().await.unwrap(),
        ClientMessage::SessionConfig { .. }
    ));
    assert!(matches!(
        conn.recv().await.unwrap(),
        ClientMessage::DomUpdate { .. }
    ));
    assert_eq!(*recorder.states.lock(), vec![CopilotState::Starting]);
}

#[tokio::test]
async fn test_start_while_active_is_noop() {
    let (widget, _, mut backend, recorder) = widget();
    widget.start_visual_copilot().await.unwrap();
    widget.start_visual_copilot().await.unwrap();

    assert!(backend.try_accept().is_some());
    assert!(backend.try_accept().is_none());
    assert_eq!(widget.generation(), 1);
    assert_eq!(recorder.states.lock().len(), 1);
}

#[tokio::test]
async fn test_refused_connection_reports_error() {
    let (widget, connector, _backend, recorder) = widget();
    connector.refuse_next(ChannelError::ConnectionFailed("refused".to_string()));

    let err = widget.start_visual_copilot().await.unwrap_err();
    assert!(matches!(err, CopilotError::Channel(ChannelError::ConnectionFailed(_))));
    assert_eq!(widget.state(), CopilotState::Stopped);
    assert!(!widget.is_active());
    assert_eq!(recorder.errors.lock().len(), 1);
    assert_eq!(
        *recorder.states.lock(),
        vec![CopilotState::Starting, CopilotState::Stopped]
    );
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let (widget, _, mut backend, recorder) = widget();
    widget.start_visual_copilot().await.unwrap();
    let conn = backend.accept().await.unwrap();

    widget.stop_visual_copilot().await;
    widget.stop_visual_copilot().await;

    assert_eq!(widget.state(), CopilotState::Stopped);
    assert!(!conn.is_open());
    let stops = recorder
        .states
        .lock()
        .iter()
        .filter(|s| **s == CopilotState::Stopped)
        .count();
    assert_eq!(stops, 1);
    assert!(recorder.errors.lock().is_empty());
}

#[tokio::test]
async fn test_stop_while_idle_is_noop() {
    let (widget, _, _, recorder) = widget();
    widget.stop_visual_copilot().await;
    assert_eq!(widget.state(), CopilotState::Idle);
    assert!(recorder.states.lock().is_empty());
}

#[tokio::test]
async fn test_restart_opens_new_session() {
    let (widget, _, mut backend, _) = widget();
    widget.start_visual_copilot().await.unwrap();
    widget.stop_visual_copilot().await;
    widget.start_visual_copilot().await.unwrap();

    assert_eq!(widget.generation(), 2);
    assert_eq!(widget.state(), CopilotState::Starting);
    assert!(backend.try_accept().is_some());
    assert!(backend.try_accept().is_some());
}

#[tokio::test]
async fn test_force_scan_streams_snapshot() {
    let (widget, _, mut backend, _) = widget();
    widget.start_visual_copilot().await.unwrap();
    let mut conn = backend.accept().await.unwrap();
    conn.recv().await.unwrap();
    conn.recv().await.unwrap();

    widget.force_scan().await;
    assert!(matches!(
        conn.recv().await.unwrap(),
        ClientMessage::DomUpdate { .. }
    ));
}

#[tokio::test]
async fn test_loader_applies_settings() {
    let (connector, mut backend) = MemoryConnector::pair();
    let loader = NativeWidgetLoader::new(Arc::new(connector), page(), SessionOptions::default());

    let widget = loader
        .load(
            WidgetSettings {
                ws_url: Some("memory://tenant".to_string()),
                agent_id: Some("agent-9".to_string()),
            },
            Arc::new(Recorder::default()),
        )
        .await
        .unwrap();
    widget.start_visual_copilot().await.unwrap();

    let mut conn = backend.accept().await.unwrap();
    assert_eq!(conn.url, "memory://tenant");
    let config = conn.recv_json().await.unwrap();
    assert_eq!(config["agent_id"], "agent-9");
}

#[tokio::test]
async fn test_loader_rejects_bad_endpoint() {
    let (connector, _backend) = MemoryConnector::pair();
    let loader = NativeWidgetLoader::new(Arc::new(connector), page(), SessionOptions::default());

    let err = loader
        .load(
            WidgetSettings {
                ws_url: Some("not a url".to_string()),
                agent_id: None,
            },
            Arc::new(Recorder::default()),
        )
        .await
        .err()
        .unwrap();
    assert!(err.reason.contains("invalid endpoint"));
}
