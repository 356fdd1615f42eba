//! WebSocket session channel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tara_protocols::{
    ChannelError, ChannelEvent, ChannelEvents, ClientMessage, Connector, ServerMessage, Transport,
};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Work for the writer side of the connection task.
enum Outbound {
    Frame(String),
    Close,
}

/// A single WebSocket connection to the backend.
///
/// One-shot: once closed (locally or remotely) it stays closed.
pub struct SessionChannel {
    url: String,
    connect_timeout: Duration,
    state: Arc<Mutex<ConnState>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<Outbound>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            state: Arc::new(Mutex::new(ConnState::Idle)),
            outbound: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the connection.
    ///
    /// Resolves once the handshake has completed; the returned stream yields
    /// every inbound event until the connection ends.
    pub async fn connect(&self) -> Result<ChannelEvents, ChannelError> {
        {
            let mut state = self.state.lock();
            if *state != ConnState::Idle {
                return Err(ChannelError::ConnectionFailed(
                    "channel already used".to_string(),
                ));
            }
            *state = ConnState::Connecting;
        }

        debug!(url = %self.url, "Connecting session channel");
        let connecting = tokio_tungstenite::connect_async(self.url.as_str());
        let ws_stream = match tokio::time::timeout(self.connect_timeout, connecting).await {
            Ok(Ok((ws_stream, _))) => ws_stream,
            Ok(Err(e)) => {
                *self.state.lock() = ConnState::Closed;
                warn!(url = %self.url, error = %e, "Session channel connect failed");
                return Err(ChannelError::ConnectionFailed(e.to_string()));
            }
            Err(_) => {
                *self.state.lock() = ConnState::Closed;
                let ms = self.connect_timeout.as_millis() as u64;
                warn!(url = %self.url, timeout_ms = ms, "Session channel connect timed out");
                return Err(ChannelError::Timeout(ms));
            }
        };

        let (ws_sink, ws_source) = ws_stream.split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        {
            let mut state = self.state.lock();
            if *state != ConnState::Connecting {
                // Closed while the handshake was in flight.
                return Err(ChannelError::NotConnected);
            }
            *state = ConnState::Open;
        }
        *self.outbound.lock() = Some(outbound_tx);

        let task = tokio::spawn(run_connection(
            ws_sink,
            ws_source,
            outbound_rx,
            events_tx,
            self.state.clone(),
        ));
        *self.task.lock() = Some(task);

        info!(url = %self.url, "Session channel open");
        Ok(events_rx)
    }
}

impl Transport for SessionChannel {
    fn send(&self, message: &ClientMessage) -> Result<(), ChannelError> {
        if *self.state.lock() != ConnState::Open {
            return Err(ChannelError::NotConnected);
        }
        let frame = message.encode()?;
        trace!(kind = message.kind(), "Channel send: {}", frame);

        let outbound = self.outbound.lock();
        let tx = outbound.as_ref().ok_or(ChannelError::NotConnected)?;
        tx.send(Outbound::Frame(frame))
            .map_err(|_| ChannelError::NotConnected)
    }

    fn close(&self) {
        {
            let mut state = self.state.lock();
            if *state == ConnState::Closed {
                return;
            }
            *state = ConnState::Closed;
        }
        if let Some(tx) = self.outbound.lock().take() {
            let _ = tx.send(Outbound::Close);
        }
        debug!(url = %self.url, "Session channel closed locally");
    }

    fn is_open(&self) -> bool {
        *self.state.lock() == ConnState::Open
    }
}

impl Drop for SessionChannel {
    fn drop(&mut self) {
        // The detached task still flushes the close frame.
        self.close();
    }
}

/// Single task owning both halves of the socket.
///
/// Outbound frames are written in queue order; inbound frames are decoded and
/// forwarded in receipt order.
async fn run_connection(
    mut ws_sink: WsSink,
    mut ws_source: WsSource,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    events_tx: mpsc::UnboundedSender<ChannelEvent>,
    state: Arc<Mutex<ConnState>>,
) {
    let final_event = loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(Outbound::Frame(frame)) => {
                        if let Err(e) = ws_sink.send(Message::Text(frame.into())).await {
                            error!("Session channel write failed: {}", e);
                            break ChannelEvent::Error(ChannelError::SendFailed(e.to_string()));
                        }
                    }
                    Some(Outbound::Close) | None => {
                        let _ = ws_sink.send(Message::Close(None)).await;
                        let _ = ws_sink.close().await;
                        break ChannelEvent::Closed { reason: None };
                    }
                }
            }

            inbound = ws_source.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match ServerMessage::decode(text.as_str()) {
                            Ok(message) => {
                                debug!(kind = message.kind(), "Channel recv");
                                if events_tx.send(ChannelEvent::Message(message)).is_err() {
                                    // Nobody is listening any more.
                                    let _ = ws_sink.send(Message::Close(None)).await;
                                    break ChannelEvent::Closed { reason: None };
                                }
                            }
                            Err(e) => {
                                debug!(error = %e, "Dropping undecodable frame");
                            }
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        trace!(bytes = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| f.reason.as_str().to_string())
                            .filter(|r| !r.is_empty());
                        info!(reason = ?reason, "Session channel closed by backend");
                        break ChannelEvent::Closed { reason };
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("Session channel read failed: {}", e);
                        break ChannelEvent::Error(ChannelError::Disconnected);
                    }
                    None => {
                        info!("Session channel stream ended");
                        break ChannelEvent::Closed { reason: None };
                    }
                }
            }
        }
    };

    *state.lock() = ConnState::Closed;
    let _ = events_tx.send(final_event);
}

/// Opens [`SessionChannel`]s.
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        url: &str,
    ) -> Result<(Box<dyn Transport>, ChannelEvents), ChannelError> {
        let channel = SessionChannel::new(url).with_connect_timeout(self.connect_timeout);
        let events = channel.connect().await?;
        Ok((Box::new(channel), events))
    }
}
