//! Command execution against a live page.

mod resolve;

pub use resolve::resolve_target;

use std::time::Duration;

use tara_config::ExecutorConfig;
use tara_protocols::{
    BoundingBox, Command, CommandKind, DomError, ExecutionResult, Marker, MarkerKind, Page,
    PageElement,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::scanner::DomSnapshot;

/// Padding around the target drawn by a highlight.
const HIGHLIGHT_PADDING: f64 = 4.0;

/// Share of the viewport height moved by one `scroll`.
const SCROLL_FRACTION: f64 = 0.7;

#[derive(Debug, Clone, Copy)]
struct ActiveMarker {
    expires_at: Instant,
}

/// Applies commands to a page. Holds at most one active marker.
#[derive(Debug)]
pub struct CommandExecutor {
    config: ExecutorConfig,
    generate_ids: bool,
    active: Option<ActiveMarker>,
}

impl CommandExecutor {
    /// `generate_ids` must match the scanner that produced the snapshots.
    pub fn new(config: ExecutorConfig, generate_ids: bool) -> Self {
        Self {
            config,
            generate_ids,
            active: None,
        }
    }

    /// Execute one command.
    ///
    /// Never fails outright: resolution and page errors are reported in the
    /// returned result.
    pub fn execute(
        &mut self,
        page: &dyn Page,
        command: &Command,
        snapshot: &DomSnapshot,
    ) -> ExecutionResult {
        let outcome = if command.kind.needs_target() {
            let target = match resolve_target(page, command, snapshot, self.generate_ids) {
                Ok(target) => target,
                Err(e) => {
                    warn!(command = %command.kind, target_id = %command.target_id, error = %e, "Command target unresolved");
                    return ExecutionResult::error(e.to_string());
                }
            };
            debug!(command = %command.kind, target = %target.handle, "Target resolved");
            self.apply_to(page, command, &target)
        } else {
            self.apply(page, command)
        };

        match outcome {
            Ok(()) => {
                info!(command = %command.kind, target_id = %command.target_id, "Command executed");
                ExecutionResult::success()
            }
            Err(e) => {
                warn!(command = %command.kind, target_id = %command.target_id, error = %e, "Command failed");
                ExecutionResult::error(e.to_string())
            }
        }
    }

    /// Commands that act on a resolved element.
    fn apply_to(
        &mut self,
        page: &dyn Page,
        command: &Command,
        target: &PageElement,
    ) -> Result<(), DomError> {
        match command.kind {
            CommandKind::Click => page.click(target.handle),
            CommandKind::TypeText => {
                page.set_value(target.handle, command.text.as_deref().unwrap_or_default())
            }
            CommandKind::ScrollTo => page.scroll_into_view(target.handle),
            CommandKind::Highlight => {
                self.mark(page, target, MarkerKind::Highlight, command.text.clone())
            }
            CommandKind::Spotlight => {
                self.mark(page, target, MarkerKind::Spotlight, command.text.clone())
            }
            _ => self.apply(page, command),
        }
    }

    /// Commands without a target.
    fn apply(&mut self, page: &dyn Page, command: &Command) -> Result<(), DomError> {
        match command.kind {
            CommandKind::Clear => {
                self.clear(page);
                Ok(())
            }
            CommandKind::Scroll => page.scroll_by(scroll_delta(page, command.text.as_deref())),
            // The pause itself is the settle wait.
            CommandKind::Wait => Ok(()),
            CommandKind::Unsupported => Err(DomError::ActionFailed(
                "unsupported command type".to_string(),
            )),
            CommandKind::Click
            | CommandKind::TypeText
            | CommandKind::ScrollTo
            | CommandKind::Highlight
            | CommandKind::Spotlight => Err(DomError::ActionFailed(format!(
                "{} requires a target",
                command.kind
            ))),
        }
    }

    /// Remove every marker. Always succeeds.
    pub fn clear(&mut self, page: &dyn Page) {
        page.clear_markers();
        self.active = None;
    }

    /// When the active marker should disappear, if there is one.
    pub fn marker_deadline(&self) -> Option<Instant> {
        self.active.map(|m| m.expires_at)
    }

    /// Clear the active marker once its deadline has passed.
    pub fn expire(&mut self, page: &dyn Page, now: Instant) -> bool {
        match self.active {
            Some(marker) if now >= marker.expires_at => {
                self.clear(page);
                debug!("Marker expired");
                true
            }
            _ => false,
        }
    }

    /// How long to let the page settle after `kind` before reporting.
    pub fn settle_for(&self, kind: CommandKind) -> Duration {
        match kind {
            CommandKind::ScrollTo | CommandKind::Scroll => self.config.scroll_settle(),
            CommandKind::Wait => self.config.wait() + self.config.settle(),
            _ => self.config.settle(),
        }
    }

    /// Settle wait after a server-requested navigation.
    pub fn navigation_settle(&self) -> Duration {
        self.config.settle()
    }

    fn mark(
        &mut self,
        page: &dyn Page,
        target: &PageElement,
        kind: MarkerKind,
        label: Option<String>,
    ) -> Result<(), DomError> {
        let live = page
            .element(target.handle)
            .ok_or(DomError::Detached(target.handle))?;
        let bounds = match kind {
            MarkerKind::Highlight => inflate(&live.bounding_box, HIGHLIGHT_PADDING),
            MarkerKind::Spotlight => live.bounding_box,
        };

        // One marker at a time.
        page.clear_markers();
        self.active = None;
        page.show_marker(&Marker {
            kind,
            target: target.handle,
            bounds,
            label,
        })?;
        self.active = Some(ActiveMarker {
            expires_at: Instant::now() + self.config.highlight_duration(),
        });
        Ok(())
    }
}

/// Pixels to scroll for a `scroll` command: down unless the text says "up".
fn scroll_delta(page: &dyn Page, text: Option<&str>) -> f64 {
    let distance = page.viewport().height as f64 * SCROLL_FRACTION;
    match text {
        Some(text) if text.to_lowercase().contains("up") => -distance,
        _ => distance,
    }
}

/// Bounds grown by `pad` pixels on every side.
fn inflate(bounds: &BoundingBox, pad: f64) -> BoundingBox {
    BoundingBox::new(
        bounds.x - pad,
        bounds.y - pad,
        bounds.width + pad * 2.0,
        bounds.height + pad * 2.0,
    )
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
