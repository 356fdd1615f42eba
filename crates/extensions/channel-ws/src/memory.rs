//! In-process loopback transport.
//!
//! [`MemoryConnector`] hands every new connection to a [`MemoryBackend`],
//! which plays the server: it reads the client's frames and pushes server
//! messages, raw text, or a close. Frames cross as JSON text so encoding
//! behaves exactly as on the wire.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tara_protocols::{
    ChannelError, ChannelEvent, ChannelEvents, ClientMessage, Connector, ServerMessage, Transport,
};
use tokio::sync::mpsc;
use tracing::debug;

/// Client half of a loopback connection.
pub struct MemoryTransport {
    open: Arc<AtomicBool>,
    frames: mpsc::UnboundedSender<String>,
}

impl Transport for MemoryTransport {
    fn send(&self, message: &ClientMessage) -> Result<(), ChannelError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(ChannelError::NotConnected);
        }
        let frame = message.encode()?;
        self.frames.send(frame).map_err(|_| {
            self.open.store(false, Ordering::SeqCst);
            ChannelError::NotConnected
        })
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Server half of a loopback connection.
pub struct BackendConnection {
    pub url: String,
    open: Arc<AtomicBool>,
    frames: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ChannelEvent>,
}

impl BackendConnection {
    /// Next frame from the client as raw JSON. `None` once the client is gone
    /// and every queued frame has been read.
    pub async fn recv_json(&mut self) -> Option<serde_json::Value> {
        let frame = self.frames.recv().await?;
        serde_json::from_str(&frame).ok()
    }

    /// Next frame from the client.
    pub async fn recv(&mut self) -> Option<ClientMessage> {
        let frame = self.frames.recv().await?;
        serde_json::from_str(&frame).ok()
    }

    /// A frame already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<ClientMessage> {
        let frame = self.frames.try_recv().ok()?;
        serde_json::from_str(&frame).ok()
    }

    /// Push a server message.
    pub fn send(&self, message: ServerMessage) {
        let _ = self.events.send(ChannelEvent::Message(message));
    }

    /// Push a raw text frame. Frames that do not decode are dropped, as the
    /// WebSocket channel does.
    pub fn send_text(&self, text: &str) {
        match ServerMessage::decode(text) {
            Ok(message) => self.send(message),
            Err(e) => debug!(error = %e, "Loopback dropping undecodable frame"),
        }
    }

    /// Close from the server side.
    pub fn close(&self, reason: Option<&str>) {
        self.open.store(false, Ordering::SeqCst);
        let _ = self.events.send(ChannelEvent::Closed {
            reason: reason.map(str::to_string),
        });
    }

    /// Fail the connection.
    pub fn fail(&self, error: ChannelError) {
        self.open.store(false, Ordering::SeqCst);
        let _ = self.events.send(ChannelEvent::Error(error));
    }

    /// Whether the client still considers the connection open.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Receives connections opened through a [`MemoryConnector`].
pub struct MemoryBackend {
    incoming: mpsc::UnboundedReceiver<BackendConnection>,
}

impl MemoryBackend {
    /// Wait for the next client connection.
    pub async fn accept(&mut self) -> Option<BackendConnection> {
        self.incoming.recv().await
    }

    pub fn try_accept(&mut self) -> Option<BackendConnection> {
        self.incoming.try_recv().ok()
    }
}

/// Opens loopback connections.
#[derive(Clone)]
pub struct MemoryConnector {
    incoming: mpsc::UnboundedSender<BackendConnection>,
    refuse: Arc<Mutex<Option<ChannelError>>>,
}

impl MemoryConnector {
    pub fn pair() -> (Self, MemoryBackend) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                incoming: tx,
                refuse: Arc::new(Mutex::new(None)),
            },
            MemoryBackend { incoming: rx },
        )
    }

    /// Fail the next connection attempt with `error`.
    pub fn refuse_next(&self, error: ChannelError) {
        *self.refuse.lock() = Some(error);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn Transport>, ChannelEvents), ChannelError> {
        if let Some(error) = self.refuse.lock().take() {
            return Err(error);
        }

        let open = Arc::new(AtomicBool::new(true));
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        self.incoming
            .send(BackendConnection {
                url: url.to_string(),
                open: open.clone(),
                frames: frames_rx,
                events: events_tx,
            })
            .map_err(|_| ChannelError::ConnectionFailed("loopback backend gone".to_string()))?;

        debug!(url = %url, "Loopback connection open");
        Ok((
            Box::new(MemoryTransport {
                open,
                frames: frames_tx,
            }),
            events_rx,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tara_protocols::{ExecutionStatus, SessionMode};

    #[tokio::test]
    async fn test_loopback_roundtrip() {
        let (connector, mut backend) = MemoryConnector::pair();
        let (transport, mut events) = connector.connect("memory://test").await.unwrap();
        let mut conn = backend.accept().await.unwrap();
        assert_eq!(conn.url, "memory://test");

        transport
            .send(&ClientMessage::session_config(SessionMode::VisualCopilot, None, None))
            .unwrap();
        transport
            .send(&ClientMessage::execution_complete(ExecutionStatus::Success))
            .unwrap();

        let first = conn.recv_json().await.unwrap();
        assert_eq!(first["type"], "session_config");
        let second = conn.recv().await.unwrap();
        assert_eq!(second.kind(), "execution_complete");

        conn.send(ServerMessage::Ping);
        assert_eq!(
            events.recv().await.unwrap(),
            ChannelEvent::Message(ServerMessage::Ping)
        );
    }

    #[tokio::test]
    async fn test_undecodable_text_dropped() {
        let (connector, mut backend) = MemoryConnector::pair();
        let (_transport, mut events) = connector.connect("memory://test").await.unwrap();
        let conn = backend.accept().await.unwrap();

        conn.send_text("{not json");
        conn.send_text(r#"{"type":"audio_chunk"}"#);
        conn.send_text(r#"{"type":"state_update","state":"listening"}"#);

        let event = events.recv().await.unwrap();
        assert!(matches!(
            event,
            ChannelEvent::Message(ServerMessage::StateUpdate { .. })
        ));
    }

    #[tokio::test]
    async fn test_send_after_close_fails_fast() {
        let (connector, mut backend) = MemoryConnector::pair();
        let (transport, mut events) = connector.connect("memory://test").await.unwrap();
        let conn = backend.accept().await.unwrap();

        conn.close(Some("bye"));
        assert!(!transport.is_open());
        assert_eq!(
            transport.send(&ClientMessage::Pong),
            Err(ChannelError::NotConnected)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            ChannelEvent::Closed {
                reason: Some("bye".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_local_close() {
        let (connector, mut backend) = MemoryConnector::pair();
        let (transport, _events) = connector.connect("memory://test").await.unwrap();
        let conn = backend.accept().await.unwrap();

        transport.close();
        transport.close();
        assert!(!conn.is_open());
        assert_eq!(
            transport.send(&ClientMessage::Pong),
            Err(ChannelError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_refuse_next() {
        let (connector, _backend) = MemoryConnector::pair();
        connector.refuse_next(ChannelError::Timeout(10_000));
        let result = connector.connect("memory://test").await;
        assert!(matches!(result, Err(ChannelError::Timeout(10_000))));
        assert!(connector.connect("memory://test").await.is_ok());
    }
}
