//! DOM snapshot extraction.

mod candidate;

pub use candidate::{Role, classify, clickability_score, tag_type};

use std::collections::HashSet;

use tara_config::{MAX_TEXT_LEN, ScannerConfig};
use tara_protocols::{DomElement, Page, PageElement, Rect, ViewportInfo};
use tracing::{debug, warn};

use crate::identity::{element_id, snapshot_hash};
use crate::text::{extract_text, truncate_chars};

/// Elements smaller than this in either dimension are specks.
const MIN_SIZE: f64 = 2.0;

/// A bounded, deduplicated snapshot in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct DomSnapshot {
    pub url: String,
    pub elements: Vec<DomElement>,
    /// DJB2 over `id:text:x:y` of every descriptor.
    pub hash: u32,
    /// A dialog or modal layer was open when the page was scanned.
    pub has_modal: bool,
}

impl DomSnapshot {
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            elements: Vec::new(),
            hash: snapshot_hash(&[]),
            has_modal: false,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DomElement> {
        self.elements.iter().find(|el| el.matches_id(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Descriptors whose id does not appear in `previous`.
    pub fn new_elements_since(&self, previous: &DomSnapshot) -> usize {
        self.elements
            .iter()
            .filter(|el| el.id.as_deref().is_some_and(|id| !previous.contains(id)))
            .count()
    }
}

impl Default for DomSnapshot {
    fn default() -> Self {
        Self::empty("")
    }
}

struct Scored {
    order: usize,
    priority: f64,
    descriptor: DomElement,
}

/// Extracts [`DomSnapshot`]s from a page. Read-only.
#[derive(Debug, Clone, Default)]
pub struct DomScanner {
    config: ScannerConfig,
}

impl DomScanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Snapshot the page.
    ///
    /// Never fails: a page that cannot be read yields an empty snapshot.
    pub fn scan(&self, page: &dyn Page) -> DomSnapshot {
        let url = page.url();
        let elements = match page.elements() {
            Ok(elements) => elements,
            Err(e) => {
                warn!(error = %e, url = %url, "DOM extraction failed, sending empty snapshot");
                return DomSnapshot::empty(url);
            }
        };
        let viewport = page.viewport();
        let has_modal = elements.iter().any(|el| !el.is_overlay && el.is_modal());
        let max_text_len = self.config.max_text_len.min(MAX_TEXT_LEN);

        let mut seen = HashSet::new();
        let mut scored = Vec::new();
        for element in &elements {
            let Some(role) = classify(element) else {
                continue;
            };
            if !self.is_visible_region(element, &viewport) {
                continue;
            }

            let id = element_id(element, self.config.generate_ids);
            if let Some(ref id) = id {
                if !seen.insert(id.clone()) {
                    continue;
                }
            }

            let mut priority = clickability_score(element);
            if role == Role::Interactive {
                priority += 1.0;
            }
            scored.push(Scored {
                order: scored.len(),
                priority,
                descriptor: DomElement {
                    id,
                    text: truncate_chars(&extract_text(element), max_text_len),
                    tag_type: tag_type(element),
                    rect: Rect::from(&element.bounding_box),
                },
            });
        }

        let candidates = scored.len();
        if candidates > self.config.max_elements {
            // Stable sort keeps document order among equal priorities.
            scored.sort_by(|a, b| b.priority.total_cmp(&a.priority));
            scored.truncate(self.config.max_elements);
            scored.sort_by_key(|s| s.order);
        }

        let elements: Vec<DomElement> = scored.into_iter().map(|s| s.descriptor).collect();
        let hash = snapshot_hash(&elements);
        debug!(
            url = %url,
            candidates,
            kept = elements.len(),
            hash,
            "DOM scanned"
        );
        DomSnapshot {
            url,
            elements,
            hash,
            has_modal,
        }
    }

    fn is_visible_region(&self, element: &PageElement, viewport: &ViewportInfo) -> bool {
        let bounds = &element.bounding_box;
        bounds.width >= MIN_SIZE
            && bounds.height >= MIN_SIZE
            && bounds.is_near_viewport(viewport, self.config.viewport_margin)
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
