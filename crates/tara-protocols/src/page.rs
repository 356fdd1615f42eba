//! The live page capability.
//!
//! The overlay never talks to a concrete DOM. It reads a flattened walk of the
//! document (shadow roots and same-origin frames already pierced) through
//! [`Page::elements`] and mutates it through a handful of imperative calls.
//! Scans only read; the executor and the overlay's own markers are the only
//! writers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DomError;

/// Opaque identity of a live element, valid for the lifetime of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Viewport information for coordinate calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportInfo {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Scroll X offset.
    #[serde(default)]
    pub scroll_x: f64,
    /// Scroll Y offset.
    #[serde(default)]
    pub scroll_y: f64,
}

impl Default for ViewportInfo {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

/// Bounding box for an element, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside this bounding box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Get the center point of this bounding box.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if this box intersects with another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Check if this box is within the viewport, with `margin` pixels of
    /// tolerance above and below.
    pub fn is_near_viewport(&self, viewport: &ViewportInfo, margin: f64) -> bool {
        self.y < viewport.height as f64 + margin
            && self.y + self.height > -margin
            && self.x < viewport.width as f64
            && self.x + self.width > 0.0
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Node attributes extracted from the DOM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NodeAttributes {
    pub id: Option<String>,
    pub class: Option<String>,
    pub href: Option<String>,
    pub title: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub aria_label: Option<String>,
    pub tabindex: Option<i32>,
    pub contenteditable: bool,
    /// Alt text of the first descendant image, for icon-only controls.
    pub image_alt: Option<String>,
    /// `data-*` attributes without the prefix.
    pub data: HashMap<String, String>,
}

impl NodeAttributes {
    pub fn data_attr(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// Computed style properties the overlay cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
    pub cursor: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: 1.0,
            cursor: "auto".to_string(),
        }
    }
}

impl ComputedStyle {
    pub fn is_hidden(&self) -> bool {
        self.display == "none" || self.visibility == "hidden" || self.opacity <= 0.0
    }
}

/// One element from a flattened document walk.
#[derive(Debug, Clone, PartialEq)]
pub struct PageElement {
    pub handle: ElementHandle,
    /// Lowercase tag name.
    pub tag_name: String,
    pub attributes: NodeAttributes,
    /// Rendered text of the element and its descendants.
    pub inner_text: String,
    pub style: ComputedStyle,
    pub bounding_box: BoundingBox,
    /// Sibling index chain from the document root.
    pub dom_path: Vec<usize>,
    pub child_count: usize,
    pub disabled: bool,
    /// Part of the SVG namespace.
    pub is_svg: bool,
    /// Injected by the overlay itself (orb, markers).
    pub is_overlay: bool,
}

impl PageElement {
    /// Whether a command may act on this element: rendered, and not part of
    /// the overlay's own UI.
    pub fn is_addressable(&self) -> bool {
        !self.is_overlay && !self.style.is_hidden()
    }

    /// An open dialog or modal layer.
    pub fn is_modal(&self) -> bool {
        if self.style.is_hidden() {
            return false;
        }
        self.tag_name == "dialog"
            || matches!(
                self.attributes.role.as_deref(),
                Some("dialog") | Some("alertdialog")
            )
    }
}

/// Visual marker kinds drawn by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// Outline around the target.
    Highlight,
    /// Dim everything except the target region.
    Spotlight,
}

/// A marker overlaid on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub target: ElementHandle,
    pub bounds: BoundingBox,
    pub label: Option<String>,
}

/// The live document.
///
/// Implementations must be cheap to call: scans and commands run on the
/// session's event loop and must not block it.
pub trait Page: Send + Sync {
    /// Current location.
    fn url(&self) -> String;

    fn viewport(&self) -> ViewportInfo;

    /// Flattened document walk in document order.
    fn elements(&self) -> Result<Vec<PageElement>, DomError>;

    /// Look up a live element; `None` once it has been detached.
    fn element(&self, handle: ElementHandle) -> Option<PageElement>;

    /// Dispatch a synthetic click (pointer down/up, click, focus for inputs).
    fn click(&self, handle: ElementHandle) -> Result<(), DomError>;

    /// Scroll so the element is centred in the viewport.
    fn scroll_into_view(&self, handle: ElementHandle) -> Result<(), DomError>;

    /// Scroll the viewport by `dy` pixels; negative scrolls up.
    fn scroll_by(&self, dy: f64) -> Result<(), DomError>;

    /// Focus an editable element, set its value and fire input/change.
    fn set_value(&self, handle: ElementHandle, value: &str) -> Result<(), DomError>;

    /// Client-side navigation to `url` (absolute or path).
    fn navigate(&self, url: &str) -> Result<(), DomError>;

    /// Draw a marker. The page keeps whatever the executor last drew.
    fn show_marker(&self, marker: &Marker) -> Result<(), DomError>;

    /// Remove every marker. Never fails.
    fn clear_markers(&self);
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
