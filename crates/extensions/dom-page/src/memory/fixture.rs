//! JSON fixture format for [`MemoryPage`](super::MemoryPage).
//!
//! ```json
//! {
//!   "url": "https://app.example/dashboard",
//!   "viewport": { "width": 1280, "height": 720 },
//!   "body": [
//!     { "tag": "button", "text": "Save", "attributes": { "id": "save" },
//!       "rect": { "x": 10, "y": 10, "width": 80, "height": 30 } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tara_protocols::{BoundingBox, ComputedStyle, NodeAttributes, ViewportInfo};

/// A whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub viewport: ViewportInfo,

    /// Top-level nodes, in document order.
    #[serde(default)]
    pub body: Vec<FixtureNode>,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self {
            url: default_url(),
            viewport: ViewportInfo::default(),
            body: Vec::new(),
        }
    }
}

fn default_url() -> String {
    "about:blank".to_string()
}

/// One element and its subtree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FixtureNode {
    pub tag: String,

    #[serde(default)]
    pub attributes: NodeAttributes,

    /// The element's own text; descendants' text is appended when flattening.
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub style: ComputedStyle,

    #[serde(default)]
    pub rect: BoundingBox,

    #[serde(default)]
    pub disabled: bool,

    /// Part of the overlay's own UI.
    #[serde(default)]
    pub overlay: bool,

    #[serde(default)]
    pub children: Vec<FixtureNode>,
}

impl FixtureNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.attributes.id = Some(id.into());
        self
    }

    pub fn rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rect = BoundingBox::new(x, y, width, height);
        self
    }

    pub fn attributes(mut self, attributes: NodeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn overlay(mut self) -> Self {
        self.overlay = true;
        self
    }

    pub fn child(mut self, child: FixtureNode) -> Self {
        self.children.push(child);
        self
    }
}
