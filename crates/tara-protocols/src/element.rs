//! DOM element descriptors carried by `dom_update`.

use serde::{Deserialize, Serialize};

use crate::page::BoundingBox;

/// Hard ceiling on descriptor text, in characters.
pub const MAX_TEXT_LEN: usize = 50;

/// Element bounds in viewport coordinates at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&BoundingBox> for Rect {
    fn from(b: &BoundingBox) -> Self {
        Self {
            x: b.x.round(),
            y: b.y.round(),
            width: b.width.round(),
            height: b.height.round(),
        }
    }
}

/// Point-in-time record of one page element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomElement {
    /// Stable identifier, or `null` when the element has none.
    pub id: Option<String>,
    /// Visible text, at most [`MAX_TEXT_LEN`] characters.
    pub text: String,
    /// Element category (lowercase tag name, `header` for h1-h6).
    #[serde(rename = "type")]
    pub tag_type: String,
    pub rect: Rect,
}

impl DomElement {
    /// Whether this descriptor answers to `target_id`.
    pub fn matches_id(&self, target_id: &str) -> bool {
        self.id.as_deref() == Some(target_id)
    }
}
