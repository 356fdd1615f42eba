//! Candidate selection and layered interactivity scoring.

use tara_protocols::PageElement;

/// SVG internals: icon decoration with no interaction value.
const SVG_NOISE_TAGS: &[&str] = &[
    "svg", "path", "rect", "circle", "line", "polyline", "polygon", "ellipse", "use", "defs",
    "clippath", "g", "mask", "symbol", "lineargradient", "radialgradient", "stop", "pattern",
    "marker", "filter", "fegaussianblur", "feoffset", "feblend", "fecolormatrix", "text",
    "tspan",
];

const INTERACTIVE_TAGS: &[&str] = &["button", "input", "select", "textarea"];

const CLICKABLE_ROLES: &[&str] = &["button", "link", "menuitem", "tab", "checkbox", "switch"];

const CONTEXT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "label", "th", "td", "nav", "legend", "p", "li", "dt",
    "dd",
];

const HEADER_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Class fragments marking spans that hold data values.
const DATA_SPAN_CLASSES: &[&str] = &["value", "price", "stat", "count", "total"];

/// Class fragments marking any data container.
const DATA_CLASSES: &[&str] = &["metric", "amount"];

/// Text leaves shorter than this carry no context.
const MIN_LEAF_TEXT: usize = 3;
/// Text leaves this long or longer are prose, not data.
const MAX_LEAF_TEXT: usize = 200;

/// Why an element made it into the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Something the user can act on.
    Interactive,
    /// Headers, labels, data cells and text leaves.
    Context,
}

/// Classify an element, or `None` when it must not be reported.
///
/// Geometry is checked separately; this only looks at the element itself.
pub fn classify(element: &PageElement) -> Option<Role> {
    if element.is_overlay || is_svg_noise(element) {
        return None;
    }
    if element.disabled || is_secret_input(element) {
        return None;
    }
    if element.style.is_hidden() {
        return None;
    }

    if is_focusable(element) || has_clickable_role(element) || element.style.cursor == "pointer" {
        Some(Role::Interactive)
    } else if is_context(element) {
        Some(Role::Context)
    } else {
        None
    }
}

/// Layered clickability score in `0.0..=1.0`.
pub fn clickability_score(element: &PageElement) -> f64 {
    let attrs = &element.attributes;
    let tag = element.tag_name.as_str();
    let mut score: f64 = 0.0;

    // Layer 1: native interactive tags
    if INTERACTIVE_TAGS.contains(&tag) || (tag == "a" && attrs.href.is_some()) {
        score += 0.3;
    }

    // Layer 2: input type hints
    if let Some(ref input_type) = attrs.r#type {
        let clickable_types = [
            "button", "submit", "reset", "checkbox", "radio", "file", "image",
        ];
        if clickable_types.contains(&input_type.as_str()) {
            score += 0.15;
        }
        if input_type == "search" {
            score += 0.1;
        }
    }

    // Layer 3: ARIA roles
    if has_clickable_role(element) {
        score += 0.2;
    }

    // Layer 4: cursor pointer
    if element.style.cursor == "pointer" {
        score += 0.15;
    }

    // Layer 5: links
    if attrs.href.is_some() {
        score += 0.2;
    }

    // Layer 6: keyboard reachable
    if attrs.tabindex.is_some_and(|index| index >= 0) || attrs.contenteditable {
        score += 0.1;
    }

    // Layer 7: headers anchor the page structure
    if HEADER_TAGS.contains(&tag) {
        score += 0.1;
    }

    score.min(1.0)
}

/// Category reported in the descriptor's `type`.
pub fn tag_type(element: &PageElement) -> String {
    if HEADER_TAGS.contains(&element.tag_name.as_str()) {
        "header".to_string()
    } else {
        element.tag_name.clone()
    }
}

fn is_svg_noise(element: &PageElement) -> bool {
    element.is_svg || SVG_NOISE_TAGS.contains(&element.tag_name.as_str())
}

fn is_secret_input(element: &PageElement) -> bool {
    element.tag_name == "input"
        && matches!(
            element.attributes.r#type.as_deref(),
            Some("hidden") | Some("password")
        )
}

fn is_focusable(element: &PageElement) -> bool {
    let attrs = &element.attributes;
    let tag = element.tag_name.as_str();
    INTERACTIVE_TAGS.contains(&tag)
        || (tag == "a" && attrs.href.is_some())
        || attrs.tabindex.is_some_and(|index| index >= 0)
        || attrs.contenteditable
}

fn has_clickable_role(element: &PageElement) -> bool {
    element
        .attributes
        .role
        .as_deref()
        .is_some_and(|role| CLICKABLE_ROLES.contains(&role))
}

fn is_context(element: &PageElement) -> bool {
    let tag = element.tag_name.as_str();
    if CONTEXT_TAGS.contains(&tag) {
        return true;
    }

    let class = element.attributes.class.as_deref().unwrap_or("");
    if tag == "span" && DATA_SPAN_CLASSES.iter().any(|c| class.contains(c)) {
        return true;
    }
    if DATA_CLASSES.iter().any(|c| class.contains(c)) {
        return true;
    }

    let text_len = element.inner_text.trim().chars().count();
    element.child_count == 0 && (MIN_LEAF_TEXT..MAX_LEAF_TEXT).contains(&text_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tara_protocols::{BoundingBox, ComputedStyle, ElementHandle, NodeAttributes};

    fn element(tag: &str) -> PageElement {
        PageElement {
            handle: ElementHandle(1),
            tag_name: tag.to_string(),
            attributes: NodeAttributes::default(),
            inner_text: String::new(),
            style: ComputedStyle::default(),
            bounding_box: BoundingBox::new(0.0, 0.0, 50.0, 20.0),
            dom_path: vec![0],
            child_count: 0,
            disabled: false,
            is_svg: false,
            is_overlay: false,
        }
    }

    #[test]
    fn test_native_controls_are_interactive() {
        for tag in ["button", "input", "select", "textarea"] {
            assert_eq!(classify(&element(tag)), Some(Role::Interactive), "{}", tag);
        }
    }

    #[test]
    fn test_anchor_needs_href() {
        let mut a = element("a");
        assert_eq!(classify(&a), None);
        a.attributes.href = Some("/wallet".to_string());
        assert_eq!(classify(&a), Some(Role::Interactive));
    }

    #[test]
    fn test_tabindex_and_roles() {
        let mut div = element("div");
        div.attributes.tabindex = Some(-1);
        assert_eq!(classify(&div), None);
        div.attributes.tabindex = Some(0);
        assert_eq!(classify(&div), Some(Role::Interactive));

        let mut div = element("div");
        div.attributes.role = Some("tab".to_string());
        assert_eq!(classify(&div), Some(Role::Interactive));
    }

    #[test]
    fn test_cursor_pointer_is_interactive() {
        let mut div = element("div");
        div.style.cursor = "pointer".to_string();
        div.child_count = 3;
        assert_eq!(classify(&div), Some(Role::Interactive));
    }

    #[test]
    fn test_context_elements() {
        assert_eq!(classify(&element("h2")), Some(Role::Context));
        assert_eq!(classify(&element("td")), Some(Role::Context));

        let mut span = element("span");
        span.attributes.class = Some("card-total-value".to_string());
        span.child_count = 2;
        assert_eq!(classify(&span), Some(Role::Context));

        let mut leaf = element("div");
        leaf.inner_text = "€45.50".to_string();
        assert_eq!(classify(&leaf), Some(Role::Context));

        leaf.inner_text = "ok".to_string();
        assert_eq!(classify(&leaf), None);
    }

    #[test]
    fn test_excluded_elements() {
        let mut button = element("button");
        button.disabled = true;
        assert_eq!(classify(&button), None);

        let mut input = element("input");
        input.attributes.r#type = Some("password".to_string());
        assert_eq!(classify(&input), None);

        let mut hidden = element("button");
        hidden.style.opacity = 0.0;
        assert_eq!(classify(&hidden), None);

        let mut orb = element("button");
        orb.is_overlay = true;
        assert_eq!(classify(&orb), None);

        assert_eq!(classify(&element("path")), None);
    }

    #[test]
    fn test_score_layers() {
        let plain = clickability_score(&element("div"));
        assert_eq!(plain, 0.0);

        let mut submit = element("input");
        submit.attributes.r#type = Some("submit".to_string());
        assert!(clickability_score(&submit) > clickability_score(&element("input")));

        let mut link = element("a");
        link.attributes.href = Some("/".to_string());
        link.attributes.role = Some("button".to_string());
        link.style.cursor = "pointer".to_string();
        link.attributes.tabindex = Some(0);
        assert!(clickability_score(&link) <= 1.0);
    }

    #[test]
    fn test_header_type() {
        assert_eq!(tag_type(&element("h3")), "header");
        assert_eq!(tag_type(&element("button")), "button");
    }
}
