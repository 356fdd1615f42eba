//! Mapping a command's `target_id` back onto a live element.

use tara_protocols::{Command, CommandResolutionError, Page, PageElement};
use tracing::{debug, warn};

use crate::identity::element_id;
use crate::scanner::DomSnapshot;
use crate::text::extract_text;

/// Fallback text shorter than this must match exactly.
const MIN_SUBSTRING_MATCH: usize = 5;

/// Find the live element a command addresses.
///
/// Only addressable elements are candidates: the overlay's own UI and hidden
/// elements never resolve, whatever the command names. A derived identity
/// only resolves while its descriptor is in `snapshot`.
pub fn resolve_target(
    page: &dyn Page,
    command: &Command,
    snapshot: &DomSnapshot,
    generate_ids: bool,
) -> Result<PageElement, CommandResolutionError> {
    let target = command.target_id.as_str();
    let fallback_text = command.text.as_deref().filter(|t| !t.trim().is_empty());
    if target.is_empty() && fallback_text.is_none() {
        return Err(CommandResolutionError::NoTarget);
    }

    let live: Vec<PageElement> = page
        .elements()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Page unreadable while resolving target");
            Vec::new()
        })
        .into_iter()
        .filter(PageElement::is_addressable)
        .collect();

    if !target.is_empty() {
        if snapshot.contains(target) {
            if let Some(found) = by_identity(&live, target, generate_ids) {
                return Ok(found);
            }
        }
        if let Some(found) = by_attribute(&live, target) {
            return Ok(found);
        }
    }

    if let Some(text) = fallback_text {
        if let Some(found) = by_text(&live, text) {
            debug!(target_id = %target, text = %text, "Target resolved by text fallback");
            return Ok(found);
        }
    }

    if target.is_empty() {
        Err(CommandResolutionError::NotFound(
            fallback_text.unwrap_or_default().to_string(),
        ))
    } else if snapshot.contains(target) {
        Err(CommandResolutionError::Stale(target.to_string()))
    } else {
        Err(CommandResolutionError::NotFound(target.to_string()))
    }
}

/// The element the scanner would have reported under `target`.
fn by_identity(live: &[PageElement], target: &str, generate_ids: bool) -> Option<PageElement> {
    live.iter()
        .find(|el| element_id(el, generate_ids).as_deref() == Some(target))
        .cloned()
}

/// `id`, then `name`, then `data-testid`.
fn by_attribute(live: &[PageElement], target: &str) -> Option<PageElement> {
    let matches = |value: Option<&str>| value == Some(target);
    live.iter()
        .find(|el| matches(el.attributes.id.as_deref()))
        .or_else(|| live.iter().find(|el| matches(el.attributes.name.as_deref())))
        .or_else(|| live.iter().find(|el| matches(el.attributes.data_attr("testid"))))
        .cloned()
}

/// Case-insensitive exact match, or substring for longer texts.
fn by_text(live: &[PageElement], text: &str) -> Option<PageElement> {
    let wanted = text.trim().to_lowercase();
    let allow_substring = wanted.chars().count() > MIN_SUBSTRING_MATCH;
    live.iter()
        .find(|el| {
            let label = extract_text(el).to_lowercase();
            label == wanted || (allow_substring && label.contains(&wanted))
        })
        .cloned()
}
