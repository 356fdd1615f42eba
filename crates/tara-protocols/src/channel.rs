//! Channel protocol definitions.
//!
//! A channel is the bidirectional transport between the overlay and the
//! backend agent. Sends are synchronous and fire-and-forget: the transport
//! either accepts a message into its ordered outbound queue or fails fast.
//! Inbound traffic arrives as a lazy stream of [`ChannelEvent`]s for the
//! lifetime of the connection.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ChannelError;
use crate::message::{ClientMessage, ServerMessage};

/// Something that happened on an open channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A decoded backend message, in receipt order.
    Message(ServerMessage),
    /// The connection closed (remote close frame, EOF, or local close).
    Closed { reason: Option<String> },
    /// The connection failed. Always followed by nothing.
    Error(ChannelError),
}

impl ChannelEvent {
    /// Whether the connection is gone after this event.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChannelEvent::Message(_))
    }
}

/// Inbound event stream of one connection.
pub type ChannelEvents = mpsc::UnboundedReceiver<ChannelEvent>;

/// Sending half of an open connection.
pub trait Transport: Send + Sync {
    /// Queue a message for delivery.
    ///
    /// Accepted messages are delivered at most once and in call order.
    /// Returns [`ChannelError::NotConnected`] when the connection is not open.
    fn send(&self, message: &ClientMessage) -> Result<(), ChannelError>;

    /// Close the connection. Idempotent.
    fn close(&self);

    fn is_open(&self) -> bool;
}

/// Opens connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `url`. Resolves once the connection is usable.
    async fn connect(&self, url: &str) -> Result<(Box<dyn Transport>, ChannelEvents), ChannelError>;
}
