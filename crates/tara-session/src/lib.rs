//! # TARA Session
//!
//! Session lifecycle for the TARA Visual Co-Pilot.
//!
//! ## Components
//!
//! - [`SessionMachine`] - State, transition rules and observer delivery
//! - [`SessionRunner`] - The one task that owns a live session
//! - [`CopilotWidget`] / [`NativeWidgetLoader`] - The widget the host drives
//! - [`HostAdapter`] - Lazy widget load, start/stop, route-change rescans
//!
//! ## Concurrency
//!
//! Every transition happens on the session's runner task. Other tasks talk
//! to it through a control queue, so no lock ever guards session state and
//! observers see transitions in the order they happened.

mod host;
mod machine;
mod runner;
mod widget;

pub use host::HostAdapter;
pub use machine::{SessionMachine, StateCell};
pub use runner::{Control, SessionRunner};
pub use widget::{CopilotWidget, NativeWidgetLoader, SessionOptions};
