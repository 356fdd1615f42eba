//! Host integration.
//!
//! [`HostAdapter`] is what an application embeds: it loads the widget on
//! first use, forwards start/stop, and rescans after client-side navigation
//! once the new route has had time to render.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tara_config::HostConfig;
use tara_protocols::{CopilotError, SessionObserver, Widget, WidgetLoader, WidgetSettings};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Embeds the co-pilot in a host application.
///
/// Every method takes `&self`, so one adapter can be shared through an `Arc`
/// between the host's controls and its router hook.
pub struct HostAdapter {
    loader: Arc<dyn WidgetLoader>,
    config: HostConfig,
    observer: Arc<dyn SessionObserver>,
    widget: RwLock<Option<Arc<dyn Widget>>>,
    /// Held while the loader runs, so concurrent starts load once.
    loading: tokio::sync::Mutex<()>,
    destroyed: AtomicBool,
    route_seq: Arc<AtomicU64>,
    route_timer: Mutex<Option<JoinHandle<()>>>,
}

impl HostAdapter {
    pub fn new(
        loader: Arc<dyn WidgetLoader>,
        config: HostConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            loader,
            config,
            observer,
            widget: RwLock::new(None),
            loading: tokio::sync::Mutex::new(()),
            destroyed: AtomicBool::new(false),
            route_seq: Arc::new(AtomicU64::new(0)),
            route_timer: Mutex::new(None),
        }
    }

    /// The loaded widget, if loading has happened.
    pub fn widget(&self) -> Option<Arc<dyn Widget>> {
        self.widget.read().clone()
    }

    pub fn is_active(&self) -> bool {
        self.widget().is_some_and(|w| w.is_active())
    }

    /// Load the widget if needed and start a session unless one is running.
    ///
    /// Load failures are reported through `on_error` and may be retried by
    /// calling `start` again.
    pub async fn start(&self) -> Result<(), CopilotError> {
        if self.destroyed.load(Ordering::SeqCst) {
            warn!("Host adapter destroyed, ignoring start");
            return Ok(());
        }

        let widget = self.load().await?;
        if self.destroyed.load(Ordering::SeqCst) {
            warn!("Host adapter destroyed while loading, not starting");
            return Ok(());
        }
        if widget.is_active() {
            debug!("Co-pilot already active");
            return Ok(());
        }
        widget.start_visual_copilot().await
    }

    /// Stop the running session. Safe to call at any time.
    pub async fn stop(&self) {
        self.cancel_route_timer();
        if let Some(widget) = self.widget() {
            widget.stop_visual_copilot().await;
        }
    }

    /// Schedule a rescan once the new route has settled.
    ///
    /// Route changes in quick succession collapse into one rescan. The rescan
    /// is dropped if the session it was scheduled for has ended.
    pub fn on_route_change(&self, path: &str) {
        let Some(widget) = self.widget() else {
            return;
        };
        if !widget.is_active() {
            return;
        }

        let seq = self.route_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = widget.generation();
        let delay = self.config.settle_delay();
        let route_seq = self.route_seq.clone();
        debug!(path, delay_ms = delay.as_millis() as u64, "Route changed");

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if route_seq.load(Ordering::SeqCst) != seq {
                return;
            }
            if widget.generation() != generation || !widget.is_active() {
                debug!("Session changed since navigation, skipping rescan");
                return;
            }
            widget.force_scan().await;
        });

        if let Some(previous) = self.route_timer.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Stop the session and release the widget. Later starts are ignored.
    pub async fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        // Let an in-flight load finish so its widget is released too.
        let _loading = self.loading.lock().await;
        self.stop().await;
        if self.widget.write().take().is_some() {
            info!("Co-pilot widget released");
        }
    }

    /// The widget, loading it on first use. A failed load leaves nothing
    /// behind, so the next call tries again.
    async fn load(&self) -> Result<Arc<dyn Widget>, CopilotError> {
        if let Some(widget) = self.widget() {
            return Ok(widget);
        }
        let _loading = self.loading.lock().await;
        if let Some(widget) = self.widget() {
            return Ok(widget);
        }

        let settings = WidgetSettings {
            ws_url: self.config.ws_url.clone(),
            agent_id: self.config.agent_id.clone(),
        };
        match self.loader.load(settings, self.observer.clone()).await {
            Ok(widget) => {
                if !self.destroyed.load(Ordering::SeqCst) {
                    *self.widget.write() = Some(widget.clone());
                }
                Ok(widget)
            }
            Err(e) => {
                error!(error = %e, "Widget load failed");
                let err = CopilotError::from(e);
                self.observer.on_error(&err);
                Err(err)
            }
        }
    }

    fn cancel_route_timer(&self) {
        if let Some(timer) = self.route_timer.lock().take() {
            timer.abort();
        }
    }
}

impl Drop for HostAdapter {
    fn drop(&mut self) {
        self.cancel_route_timer();
        let Some(widget) = self.widget.get_mut().take() else {
            return;
        };
        if !widget.is_active() {
            return;
        }
        // Without a runtime the session still ends once its control queue
        // is dropped along with the widget.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move { widget.stop_visual_copilot().await });
        }
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
