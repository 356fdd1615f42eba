//! Session channel for the TARA Visual Co-Pilot.
//!
//! ## Transports
//!
//! - [`SessionChannel`] / [`WsConnector`] - JSON text frames over a WebSocket
//! - [`memory::MemoryConnector`] - In-process loopback with a scriptable
//!   backend, for tests and offline runs
//!
//! Both honour the same contract: sends are accepted only while the
//! connection is open, go through one FIFO queue, and are delivered at most
//! once. Nothing is buffered across reconnects; there are none.

mod channel;
pub mod memory;

pub use channel::{SessionChannel, WsConnector};
