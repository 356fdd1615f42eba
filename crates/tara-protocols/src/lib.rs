//! # TARA Protocols
//!
//! Wire protocol and capability definitions for the TARA Visual Co-Pilot.
//! Contains only types and interfaces - no transports, no page backends.
//!
//! ## Protocol
//!
//! ```text
//! client                                   backend
//!   │ ── session_config{mode, timestamp} ──►  │
//!   │ ── dom_update{elements} ────────────►   │
//!   │ ◄── state_update{state} ─────────────   │
//!   │ ◄── command{payload} ────────────────   │
//!   │ ── execution_complete{status, outcome} ►│
//! ```
//!
//! ## Core Traits
//!
//! - [`Page`] - The live document the overlay reads and mutates
//! - [`Transport`] / [`Connector`] - Bidirectional message channel
//! - [`SessionObserver`] - Lifecycle callbacks surfaced to the host
//! - [`Widget`] / [`WidgetLoader`] - The lazily loaded co-pilot the host drives

pub mod channel;
pub mod command;
pub mod element;
pub mod error;
pub mod message;
pub mod page;
pub mod session;
pub mod widget;

pub use channel::{ChannelEvent, ChannelEvents, Connector, Transport};
pub use command::{Command, CommandKind, ExecutionResult};
pub use element::{DomElement, Rect};
pub use error::{ChannelError, CommandResolutionError, CopilotError, DomError, ScriptLoadError};
pub use message::{ClientMessage, ExecutionOutcome, ExecutionStatus, ServerMessage, SessionMode};
pub use page::{
    BoundingBox, ComputedStyle, ElementHandle, Marker, MarkerKind, NodeAttributes, Page,
    PageElement, ViewportInfo,
};
pub use session::{CopilotState, SessionObserver};
pub use widget::{Widget, WidgetLoader, WidgetSettings};
