//! The co-pilot widget capability.
//!
//! Hosts never drive a session directly. They obtain a [`Widget`] through a
//! [`WidgetLoader`] and call into it; the widget owns the session, its channel
//! and its page.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CopilotError, ScriptLoadError};
use crate::session::{CopilotState, SessionObserver};

/// Settings handed to the loader when the widget is first created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Backend endpoint; `None` keeps the widget's built-in endpoint.
    pub ws_url: Option<String>,
    pub agent_id: Option<String>,
}

/// A loaded co-pilot widget.
#[async_trait]
pub trait Widget: Send + Sync {
    /// Begin a visual co-pilot session. A no-op while one is active.
    async fn start_visual_copilot(&self) -> Result<(), CopilotError>;

    /// End the current session. A no-op while idle.
    async fn stop_visual_copilot(&self);

    fn is_active(&self) -> bool;

    fn state(&self) -> CopilotState;

    /// Rescan the page and stream the snapshot if it changed.
    async fn force_scan(&self);

    /// Counter bumped on every session start; lets delayed callbacks detect
    /// that the session they were scheduled for is gone.
    fn generation(&self) -> u64;
}

/// Produces the widget, once.
#[async_trait]
pub trait WidgetLoader: Send + Sync {
    async fn load(
        &self,
        settings: WidgetSettings,
        observer: Arc<dyn SessionObserver>,
    ) -> Result<Arc<dyn Widget>, ScriptLoadError>;
}
