//! Error types for the co-pilot.
//!
//! Errors are split by blast radius: channel and script-load failures end the
//! session, command and extraction failures stay local to one operation.

mod channel;
mod copilot;
mod dom;

pub use channel::ChannelError;
pub use copilot::{CopilotError, ScriptLoadError};
pub use dom::{CommandResolutionError, DomError};
