//! In-memory page model.
//!
//! Stands in for a browser document: the tree from a [`PageFixture`] is
//! flattened once into [`PageElement`]s with stable handles. Mutations
//! (clicks, input, scrolls, navigation, markers) are recorded so callers can
//! observe what the executor did. Routes registered with
//! [`MemoryPage::add_route`] are swapped in when the page navigates to them.

mod fixture;

pub use fixture::{FixtureNode, PageFixture};

use std::collections::HashMap;

use parking_lot::RwLock;
use tara_protocols::{DomError, ElementHandle, Marker, Page, PageElement, ViewportInfo};
use tracing::debug;
use url::Url;

/// Tags whose subtree lives in the SVG namespace.
const SVG_ROOT: &str = "svg";

/// Something the page was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Click(ElementHandle),
    Focus(ElementHandle),
    Scroll { target: ElementHandle, dy: f64 },
    /// Viewport scrolled without a target; positive is down.
    ScrollBy { dy: f64 },
    Input { target: ElementHandle, value: String },
    Navigate(String),
}

#[derive(Debug)]
struct PageState {
    url: String,
    viewport: ViewportInfo,
    elements: Vec<PageElement>,
    next_handle: u64,
    events: Vec<PageEvent>,
    markers: Vec<Marker>,
    routes: HashMap<String, PageFixture>,
    unavailable: Option<String>,
}

/// A document held in memory.
#[derive(Debug)]
pub struct MemoryPage {
    state: RwLock<PageState>,
}

impl MemoryPage {
    pub fn new(fixture: PageFixture) -> Self {
        let mut state = PageState {
            url: String::new(),
            viewport: ViewportInfo::default(),
            elements: Vec::new(),
            next_handle: 1,
            events: Vec::new(),
            markers: Vec::new(),
            routes: HashMap::new(),
            unavailable: None,
        };
        load_document(&mut state, fixture);
        Self {
            state: RwLock::new(state),
        }
    }

    /// Parse a JSON fixture.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Swap the whole document, as a client-side route change does.
    ///
    /// Handles are never reused, so elements of the old document read as
    /// detached afterwards. Markers are dropped with the old document.
    pub fn load(&self, fixture: PageFixture) {
        let mut state = self.state.write();
        debug!(from = %state.url, to = %fixture.url, "Page loaded");
        state.markers.clear();
        load_document(&mut state, fixture);
    }

    /// Register the document [`Page::navigate`] renders for `fixture.url`.
    pub fn add_route(&self, fixture: PageFixture) {
        let key = Url::parse(&fixture.url)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| fixture.url.clone());
        self.state.write().routes.insert(key, fixture);
    }

    /// Current value of an input, as set by [`Page::set_value`].
    pub fn value(&self, handle: ElementHandle) -> Option<String> {
        self.state
            .read()
            .elements
            .iter()
            .find(|el| el.handle == handle)
            .and_then(|el| el.attributes.value.clone())
    }

    /// Detach an element and its subtree.
    pub fn remove(&self, handle: ElementHandle) -> Result<(), DomError> {
        let mut state = self.state.write();
        let prefix = state
            .elements
            .iter()
            .find(|el| el.handle == handle)
            .map(|el| el.dom_path.clone())
            .ok_or(DomError::Detached(handle))?;
        state.elements.retain(|el| !el.dom_path.starts_with(&prefix));
        state.markers.retain(|m| m.target != handle);
        Ok(())
    }

    /// Replace an element's rendered text.
    pub fn set_text(&self, handle: ElementHandle, text: &str) -> Result<(), DomError> {
        let mut state = self.state.write();
        let element = state
            .elements
            .iter_mut()
            .find(|el| el.handle == handle)
            .ok_or(DomError::Detached(handle))?;
        element.inner_text = text.to_string();
        Ok(())
    }

    /// Make every read fail, as a document torn down mid-scan would.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.state.write().unavailable = reason.map(str::to_string);
    }

    /// First element carrying `id` as its id attribute.
    pub fn find_by_id(&self, id: &str) -> Option<PageElement> {
        self.state
            .read()
            .elements
            .iter()
            .find(|el| el.attributes.id.as_deref() == Some(id))
            .cloned()
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.state.read().events.clone()
    }

    pub fn clicks(&self) -> Vec<ElementHandle> {
        self.state
            .read()
            .events
            .iter()
            .filter_map(|event| match event {
                PageEvent::Click(handle) => Some(*handle),
                _ => None,
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.state.read().markers.clone()
    }
}

impl Page for MemoryPage {
    fn url(&self) -> String {
        self.state.read().url.clone()
    }

    fn viewport(&self) -> ViewportInfo {
        self.state.read().viewport.clone()
    }

    fn elements(&self) -> Result<Vec<PageElement>, DomError> {
        let state = self.state.read();
        if let Some(ref reason) = state.unavailable {
            return Err(DomError::Unavailable(reason.clone()));
        }
        Ok(state.elements.clone())
    }

    fn element(&self, handle: ElementHandle) -> Option<PageElement> {
        let state = self.state.read();
        if state.unavailable.is_some() {
            return None;
        }
        state.elements.iter().find(|el| el.handle == handle).cloned()
    }

    fn click(&self, handle: ElementHandle) -> Result<(), DomError> {
        let mut state = self.state.write();
        let element = state
            .elements
            .iter()
            .find(|el| el.handle == handle)
            .ok_or(DomError::Detached(handle))?;
        if element.disabled {
            return Err(DomError::ActionFailed(format!("{} is disabled", handle)));
        }
        let focusable = matches!(element.tag_name.as_str(), "input" | "textarea");

        state.events.push(PageEvent::Click(handle));
        if focusable {
            state.events.push(PageEvent::Focus(handle));
        }
        Ok(())
    }

    fn scroll_into_view(&self, handle: ElementHandle) -> Result<(), DomError> {
        let mut state = self.state.write();
        let (_, center_y) = state
            .elements
            .iter()
            .find(|el| el.handle == handle)
            .map(|el| el.bounding_box.center())
            .ok_or(DomError::Detached(handle))?;

        let dy = state.viewport.height as f64 / 2.0 - center_y;
        shift_content(&mut state, dy);
        state.events.push(PageEvent::Scroll { target: handle, dy });
        Ok(())
    }

    fn scroll_by(&self, dy: f64) -> Result<(), DomError> {
        let mut state = self.state.write();
        if let Some(ref reason) = state.unavailable {
            return Err(DomError::Unavailable(reason.clone()));
        }
        // Cannot scroll above the top of the document.
        let dy = dy.max(-state.viewport.scroll_y);
        shift_content(&mut state, -dy);
        state.events.push(PageEvent::ScrollBy { dy });
        Ok(())
    }

    fn set_value(&self, handle: ElementHandle, value: &str) -> Result<(), DomError> {
        let mut state = self.state.write();
        let element = state
            .elements
            .iter_mut()
            .find(|el| el.handle == handle)
            .ok_or(DomError::Detached(handle))?;
        if element.disabled {
            return Err(DomError::ActionFailed(format!("{} is disabled", handle)));
        }
        let editable = matches!(element.tag_name.as_str(), "input" | "textarea" | "select")
            || element.attributes.contenteditable;
        if !editable {
            return Err(DomError::ActionFailed(format!(
                "{} <{}> is not editable",
                handle, element.tag_name
            )));
        }

        element.attributes.value = Some(value.to_string());
        if element.attributes.contenteditable {
            element.inner_text = value.to_string();
        }
        state.events.push(PageEvent::Focus(handle));
        state.events.push(PageEvent::Input {
            target: handle,
            value: value.to_string(),
        });
        Ok(())
    }

    fn navigate(&self, url: &str) -> Result<(), DomError> {
        let mut state = self.state.write();
        let target = resolve_url(&state.url, url)?;
        state.events.push(PageEvent::Navigate(target.clone()));

        match state.routes.get(&target).cloned() {
            Some(fixture) => {
                debug!(from = %state.url, to = %target, "Page navigated");
                state.markers.clear();
                load_document(&mut state, fixture);
            }
            // Unknown route: the URL changes, the document stays.
            None => {
                debug!(from = %state.url, to = %target, "Page URL changed");
                state.url = target;
            }
        }
        Ok(())
    }

    fn show_marker(&self, marker: &Marker) -> Result<(), DomError> {
        let mut state = self.state.write();
        if !state.elements.iter().any(|el| el.handle == marker.target) {
            return Err(DomError::Detached(marker.target));
        }
        state.markers.push(marker.clone());
        Ok(())
    }

    fn clear_markers(&self) {
        self.state.write().markers.clear();
    }
}

/// Move every element and marker down by `dy` (up when negative).
fn shift_content(state: &mut PageState, dy: f64) {
    for element in state.elements.iter_mut() {
        element.bounding_box = element.bounding_box.translate(0.0, dy);
    }
    for marker in state.markers.iter_mut() {
        marker.bounds = marker.bounds.translate(0.0, dy);
    }
    state.viewport.scroll_y -= dy;
}

/// `target` made absolute against `current` when it is a path.
fn resolve_url(current: &str, target: &str) -> Result<String, DomError> {
    let target = target.trim();
    if target.is_empty() {
        return Err(DomError::ActionFailed("empty navigation target".to_string()));
    }
    if let Ok(absolute) = Url::parse(target) {
        return Ok(absolute.to_string());
    }
    match Url::parse(current).and_then(|base| base.join(target)) {
        Ok(joined) => Ok(joined.to_string()),
        Err(_) => Ok(target.to_string()),
    }
}

fn load_document(state: &mut PageState, fixture: PageFixture) {
    state.url = fixture.url;
    state.viewport = fixture.viewport;
    state.elements.clear();
    let mut next_handle = state.next_handle;
    for (index, node) in fixture.body.iter().enumerate() {
        flatten(node, vec![index], false, &mut next_handle, &mut state.elements);
    }
    state.next_handle = next_handle;
}

/// Pre-order walk. Returns the subtree's rendered text.
fn flatten(
    node: &FixtureNode,
    path: Vec<usize>,
    in_svg: bool,
    next_handle: &mut u64,
    out: &mut Vec<PageElement>,
) -> String {
    let tag_name = node.tag.to_ascii_lowercase();
    let is_svg = in_svg || tag_name == SVG_ROOT;
    let handle = ElementHandle(*next_handle);
    *next_handle += 1;

    let slot = out.len();
    out.push(PageElement {
        handle,
        tag_name,
        attributes: node.attributes.clone(),
        inner_text: String::new(),
        style: node.style.clone(),
        bounding_box: node.rect,
        dom_path: path.clone(),
        child_count: node.children.len(),
        disabled: node.disabled,
        is_svg,
        is_overlay: node.overlay,
    });

    let mut parts = Vec::with_capacity(node.children.len() + 1);
    if !node.text.trim().is_empty() {
        parts.push(node.text.clone());
    }
    for (index, child) in node.children.iter().enumerate() {
        let mut child_path = path.clone();
        child_path.push(index);
        let text = flatten(child, child_path, is_svg, next_handle, out);
        if !text.trim().is_empty() {
            parts.push(text);
        }
    }

    let inner_text = parts.join(" ");
    out[slot].inner_text = inner_text.clone();
    inner_text
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
