//! Page and command resolution errors.

use thiserror::Error;

use crate::page::ElementHandle;

/// Errors raised by a [`Page`](crate::Page) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Element {0} is no longer attached")]
    Detached(ElementHandle),

    #[error("Page unavailable: {0}")]
    Unavailable(String),

    #[error("Action failed: {0}")]
    ActionFailed(String),
}

/// A command could not be mapped onto a live element.
///
/// Never fatal to the session; reported as `execution_complete{status:"error"}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandResolutionError {
    #[error("Target not found: {0}")]
    NotFound(String),

    #[error("Target {0} was in the snapshot but is no longer on the page")]
    Stale(String),

    #[error("Command requires a target")]
    NoTarget,
}
