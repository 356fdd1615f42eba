use super::*;
use tara_protocols::{BoundingBox, MarkerKind};

fn dashboard() -> PageFixture {
    PageFixture {
        url: "https://app.example/dashboard".to_string(),
        viewport: ViewportInfo::default(),
        body: vec![
            FixtureNode::new("nav")
                .rect(0.0, 0.0, 1280.0, 60.0)
                .child(FixtureNode::new("a").text("Home").rect(10.0, 10.0, 60.0, 20.0))
                .child(FixtureNode::new("a").text("Wallet").rect(80.0, 10.0, 60.0, 20.0)),
            FixtureNode::new("input").id("search").rect(10.0, 80.0, 200.0, 30.0),
            FixtureNode::new("button")
                .id("save")
                .text("Save")
                .rect(10.0, 1500.0, 80.0, 30.0),
        ],
    }
}

#[test]
fn test_flatten_preorder_with_paths() {
    let page = MemoryPage::new(dashboard());
    let elements = page.elements().unwrap();
    let tags: Vec<_> = elements.iter().map(|el| el.tag_name.as_str()).collect();
    assert_eq!(tags, vec!["nav", "a", "a", "input", "button"]);
    assert_eq!(elements[0].dom_path, vec![0]);
    assert_eq!(elements[2].dom_path, vec![0, 1]);
    assert_eq!(elements[0].child_count, 2);
    assert_eq!(elements[0].inner_text, "Home Wallet");
}

#[test]
fn test_svg_descendants_flagged() {
    let fixture = PageFixture {
        body: vec![FixtureNode::new("button").child(
            FixtureNode::new("svg").child(FixtureNode::new("path")),
        )],
        ..Default::default()
    };
    let page = MemoryPage::new(fixture);
    let elements = page.elements().unwrap();
    assert!(!elements[0].is_svg);
    assert!(elements[1].is_svg);
    assert!(elements[2].is_svg);
}

#[test]
fn test_click_records_events() {
    let page = MemoryPage::new(dashboard());
    let search = page.find_by_id("search").unwrap();
    let save = page.find_by_id("save").unwrap();

    page.click(save.handle).unwrap();
    page.click(search.handle).unwrap();

    assert_eq!(
        page.events(),
        vec![
            PageEvent::Click(save.handle),
            PageEvent::Click(search.handle),
            PageEvent::Focus(search.handle),
        ]
    );
    assert_eq!(page.clicks(), vec![save.handle, search.handle]);
}

#[test]
fn test_click_disabled_fails() {
    let fixture = PageFixture {
        body: vec![FixtureNode::new("button").id("pay").disabled()],
        ..Default::default()
    };
    let page = MemoryPage::new(fixture);
    let pay = page.find_by_id("pay").unwrap();
    assert!(matches!(page.click(pay.handle), Err(DomError::ActionFailed(_))));
    assert!(page.events().is_empty());
}

#[test]
fn test_scroll_into_view_centers_target() {
    let page = MemoryPage::new(dashboard());
    let save = page.find_by_id("save").unwrap();

    page.scroll_into_view(save.handle).unwrap();

    let moved = page.element(save.handle).unwrap();
    let (_, center_y) = moved.bounding_box.center();
    assert_eq!(center_y, 360.0);
    assert_eq!(page.viewport().scroll_y, 1515.0 - 360.0);
}

#[test]
fn test_markers_replace_and_clear() {
    let page = MemoryPage::new(dashboard());
    let save = page.find_by_id("save").unwrap();
    let marker = Marker {
        kind: MarkerKind::Highlight,
        target: save.handle,
        bounds: BoundingBox::new(6.0, 1496.0, 88.0, 38.0),
        label: Some("Save here".to_string()),
    };

    page.show_marker(&marker).unwrap();
    assert_eq!(page.markers().len(), 1);

    page.clear_markers();
    assert!(page.markers().is_empty());
}

#[test]
fn test_load_detaches_old_handles() {
    let page = MemoryPage::new(dashboard());
    let save = page.find_by_id("save").unwrap();

    page.load(PageFixture {
        url: "https://app.example/wallet".to_string(),
        body: vec![FixtureNode::new("button").id("save").text("Save")],
        ..Default::default()
    });

    assert_eq!(page.url(), "https://app.example/wallet");
    assert!(page.element(save.handle).is_none());
    assert!(matches!(page.click(save.handle), Err(DomError::Detached(_))));
    let fresh = page.find_by_id("save").unwrap();
    assert_ne!(fresh.handle, save.handle);
}

#[test]
fn test_remove_detaches_subtree() {
    let page = MemoryPage::new(dashboard());
    let nav = page.elements().unwrap()[0].handle;
    page.remove(nav).unwrap();
    let tags: Vec<_> = page
        .elements()
        .unwrap()
        .into_iter()
        .map(|el| el.tag_name)
        .collect();
    assert_eq!(tags, vec!["input", "button"]);
}

#[test]
fn test_unavailable_page() {
    let page = MemoryPage::new(dashboard());
    page.set_unavailable(Some("document unloading"));
    assert!(matches!(page.elements(), Err(DomError::Unavailable(_))));
    page.set_unavailable(None);
    assert!(page.elements().is_ok());
}

#[test]
fn test_from_json() {
    let json = r#"{
        "url": "https://app.example/",
        "viewport": { "width": 800, "height": 600 },
        "body": [
            { "tag": "BUTTON", "text": "Go", "attributes": { "aria_label": "Start" },
              "rect": { "x": 1, "y": 2, "width": 30, "height": 20 } }
        ]
    }"#;
    let page = MemoryPage::from_json(json).unwrap();
    let elements = page.elements().unwrap();
    assert_eq!(page.viewport().width, 800);
    assert_eq!(elements[0].tag_name, "button");
    assert_eq!(elements[0].attributes.aria_label.as_deref(), Some("Start"));
}

#[test]
fn test_set_value_on_input() {
    let page = MemoryPage::new(dashboard());
    let search = page.find_by_id("search").unwrap();

    page.set_value(search.handle, "acme corp").unwrap();

    assert_eq!(page.value(search.handle).as_deref(), Some("acme corp"));
    assert_eq!(
        page.events(),
        vec![
            PageEvent::Focus(search.handle),
            PageEvent::Input {
                target: search.handle,
                value: "acme corp".to_string(),
            },
        ]
    );
}

#[test]
fn test_set_value_rejects_non_editable() {
    let page = MemoryPage::new(dashboard());
    let save = page.find_by_id("save").unwrap();
    assert!(matches!(
        page.set_value(save.handle, "x"),
        Err(DomError::ActionFailed(_))
    ));
    assert!(page.events().is_empty());
}

#[test]
fn test_scroll_by_moves_content_and_stops_at_top() {
    let page = MemoryPage::new(dashboard());

    page.scroll_by(500.0).unwrap();
    let save = page.find_by_id("save").unwrap();
    assert_eq!(save.bounding_box.y, 1000.0);
    assert_eq!(page.viewport().scroll_y, 500.0);

    page.scroll_by(-800.0).unwrap();
    assert_eq!(page.viewport().scroll_y, 0.0);
    assert_eq!(page.find_by_id("save").unwrap().bounding_box.y, 1500.0);
    assert_eq!(page.events()[1], PageEvent::ScrollBy { dy: -500.0 });
}

#[test]
fn test_navigate_to_registered_route() {
    let page = MemoryPage::new(dashboard());
    page.add_route(PageFixture {
        url: "https://app.example/wallet".to_string(),
        body: vec![FixtureNode::new("button").id("topup").text("Top up")],
        ..Default::default()
    });

    page.navigate("/wallet").unwrap();

    assert_eq!(page.url(), "https://app.example/wallet");
    assert!(page.find_by_id("topup").is_some());
    assert!(page.find_by_id("save").is_none());
    assert_eq!(
        page.events(),
        vec![PageEvent::Navigate("https://app.example/wallet".to_string())]
    );
}

#[test]
fn test_navigate_to_unknown_route_keeps_document() {
    let page = MemoryPage::new(dashboard());
    page.navigate("/settings?tab=billing").unwrap();
    assert_eq!(page.url(), "https://app.example/settings?tab=billing");
    assert!(page.find_by_id("save").is_some());

    assert!(page.navigate("  ").is_err());
}
