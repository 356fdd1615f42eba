//! Stable element identity and snapshot hashing.

use tara_protocols::{DomElement, PageElement};

/// Characters of element text folded into a derived id.
const ID_TEXT_PREFIX: usize = 30;

/// DJB2 over UTF-16 code units, XOR variant, wrapping at 32 bits.
pub fn djb2(input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(5381u32, |hash, unit| hash.wrapping_mul(33) ^ u32::from(unit))
}

/// Lowercase base-36 rendering.
pub fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Derived id: `t-` plus the base-36 DJB2 of
/// `tag|text30|role|href|type|dom-path`.
pub fn stable_id(element: &PageElement) -> String {
    let attrs = &element.attributes;
    let text: String = element
        .inner_text
        .trim()
        .chars()
        .take(ID_TEXT_PREFIX)
        .collect();
    let path: String = element
        .dom_path
        .iter()
        .map(|index| format!("{}.", index))
        .collect();

    let key = format!(
        "{}|{}|{}|{}|{}|{}",
        element.tag_name,
        text,
        attrs.role.as_deref().unwrap_or(""),
        attrs.href.as_deref().unwrap_or(""),
        attrs.r#type.as_deref().unwrap_or(""),
        path
    );
    format!("t-{}", to_base36(djb2(&key)))
}

/// Identity the scanner reports for `element`.
///
/// `id` attribute, else `name`, else a derived id when `generate_ids` is set.
pub fn element_id(element: &PageElement, generate_ids: bool) -> Option<String> {
    let attrs = &element.attributes;
    non_empty(attrs.id.as_deref())
        .or_else(|| non_empty(attrs.name.as_deref()))
        .map(str::to_string)
        .or_else(|| generate_ids.then(|| stable_id(element)))
}

/// Content hash over `id:text:x:y|` of every descriptor, in order.
pub fn snapshot_hash(elements: &[DomElement]) -> u32 {
    let mut key = String::new();
    for element in elements {
        key.push_str(&format!(
            "{}:{}:{}:{}|",
            element.id.as_deref().unwrap_or("null"),
            element.text,
            element.rect.x as i64,
            element.rect.y as i64
        ));
    }
    djb2(&key)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tara_protocols::{
        BoundingBox, ComputedStyle, ElementHandle, NodeAttributes, Rect,
    };

    fn element(tag: &str, text: &str, path: Vec<usize>) -> PageElement {
        PageElement {
            handle: ElementHandle(1),
            tag_name: tag.to_string(),
            attributes: NodeAttributes::default(),
            inner_text: text.to_string(),
            style: ComputedStyle::default(),
            bounding_box: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            dom_path: path,
            child_count: 0,
            disabled: false,
            is_svg: false,
            is_overlay: false,
        }
    }

    #[test]
    fn test_djb2_known_values() {
        assert_eq!(djb2(""), 5381);
        // 5381 * 33 ^ 'a'
        assert_eq!(djb2("a"), (5381u32 * 33) ^ 97);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u32::MAX), "1z141z3");
    }

    #[test]
    fn test_stable_id_deterministic() {
        let a = element("button", "  Save changes ", vec![0, 1, 2]);
        let b = element("button", "Save changes", vec![0, 1, 2]);
        assert_eq!(stable_id(&a), stable_id(&b));
        assert!(stable_id(&a).starts_with("t-"));
    }

    #[test]
    fn test_stable_id_depends_on_path() {
        let a = element("button", "Save", vec![0, 1, 2]);
        let b = element("button", "Save", vec![0, 1, 3]);
        assert_ne!(stable_id(&a), stable_id(&b));
    }

    #[test]
    fn test_stable_id_text_prefix_only() {
        let a = element("p", &"x".repeat(30), vec![0]);
        let b = element("p", &format!("{}tail", "x".repeat(30)), vec![0]);
        assert_eq!(stable_id(&a), stable_id(&b));
    }

    #[test]
    fn test_element_id_precedence() {
        let mut el = element("input", "", vec![0]);
        el.attributes.name = Some("email".to_string());
        assert_eq!(element_id(&el, true).as_deref(), Some("email"));

        el.attributes.id = Some("email-field".to_string());
        assert_eq!(element_id(&el, true).as_deref(), Some("email-field"));

        el.attributes.id = Some(String::new());
        assert_eq!(element_id(&el, true).as_deref(), Some("email"));
    }

    #[test]
    fn test_element_id_without_generation() {
        let el = element("div", "Revenue", vec![0]);
        assert!(element_id(&el, false).is_none());
        assert!(element_id(&el, true).is_some());
    }

    #[test]
    fn test_snapshot_hash_changes_with_position() {
        let mut descriptor = DomElement {
            id: Some("a".to_string()),
            text: "Save".to_string(),
            tag_type: "button".to_string(),
            rect: Rect {
                x: 10.0,
                y: 20.0,
                width: 5.0,
                height: 5.0,
            },
        };
        let before = snapshot_hash(std::slice::from_ref(&descriptor));
        descriptor.rect.y = 21.0;
        let after = snapshot_hash(std::slice::from_ref(&descriptor));
        assert_ne!(before, after);
        assert_eq!(snapshot_hash(&[]), 5381);
    }
}
