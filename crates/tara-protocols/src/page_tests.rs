use super::*;

#[test]
fn test_bounding_box_contains() {
    let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
    assert!(bbox.contains(50.0, 40.0));
    assert!(!bbox.contains(0.0, 0.0));
    assert!(!bbox.contains(200.0, 40.0));
}

#[test]
fn test_bounding_box_center() {
    let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(bbox.center(), (50.0, 50.0));
}

#[test]
fn test_bounding_box_intersects() {
    let box1 = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let box2 = BoundingBox::new(50.0, 50.0, 100.0, 100.0);
    let box3 = BoundingBox::new(200.0, 200.0, 100.0, 100.0);
    assert!(box1.intersects(&box2));
    assert!(!box1.intersects(&box3));
}

#[test]
fn test_near_viewport_margin() {
    let viewport = ViewportInfo::default();
    // Just below the fold, inside the margin.
    let below = BoundingBox::new(10.0, 760.0, 100.0, 20.0);
    assert!(below.is_near_viewport(&viewport, 100.0));
    assert!(!below.is_near_viewport(&viewport, 0.0));

    // Far above the viewport.
    let above = BoundingBox::new(10.0, -500.0, 100.0, 20.0);
    assert!(!above.is_near_viewport(&viewport, 100.0));

    // Off to the right.
    let right = BoundingBox::new(1300.0, 10.0, 100.0, 20.0);
    assert!(!right.is_near_viewport(&viewport, 100.0));
}

#[test]
fn test_translate() {
    let moved = BoundingBox::new(1.0, 2.0, 3.0, 4.0).translate(10.0, -2.0);
    assert_eq!(moved, BoundingBox::new(11.0, 0.0, 3.0, 4.0));
}

#[test]
fn test_computed_style_hidden() {
    let mut style = ComputedStyle::default();
    assert!(!style.is_hidden());
    style.opacity = 0.0;
    assert!(style.is_hidden());
    let style = ComputedStyle {
        display: "none".to_string(),
        ..Default::default()
    };
    assert!(style.is_hidden());
}

#[test]
fn test_node_attributes_deserialize_defaults() {
    let attrs: NodeAttributes =
        serde_json::from_str(r#"{"id": "save", "data": {"testid": "save-btn"}}"#).unwrap();
    assert_eq!(attrs.id.as_deref(), Some("save"));
    assert_eq!(attrs.data_attr("testid"), Some("save-btn"));
    assert!(!attrs.contenteditable);
}

#[test]
fn test_element_handle_display() {
    assert_eq!(ElementHandle(3).to_string(), "#3");
}

fn element(tag: &str) -> PageElement {
    PageElement {
        handle: ElementHandle(1),
        tag_name: tag.to_string(),
        attributes: NodeAttributes::default(),
        inner_text: String::new(),
        style: ComputedStyle::default(),
        bounding_box: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        dom_path: vec![0],
        child_count: 0,
        disabled: false,
        is_svg: false,
        is_overlay: false,
    }
}

#[test]
fn test_addressable_excludes_overlay_and_hidden() {
    assert!(element("button").is_addressable());

    let mut orb = element("div");
    orb.is_overlay = true;
    assert!(!orb.is_addressable());

    let mut hidden = element("button");
    hidden.style.display = "none".to_string();
    assert!(!hidden.is_addressable());
}

#[test]
fn test_modal_detection() {
    assert!(element("dialog").is_modal());
    assert!(!element("div").is_modal());

    let mut alert = element("div");
    alert.attributes.role = Some("alertdialog".to_string());
    assert!(alert.is_modal());

    alert.style.visibility = "hidden".to_string();
    assert!(!alert.is_modal());
}
