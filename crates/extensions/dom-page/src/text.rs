//! Visible text extraction.

use tara_protocols::PageElement;

/// Collapse whitespace runs to a single space and trim.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

/// Best label for an element, whitespace collapsed, untruncated.
///
/// Accessibility attributes win over rendered text so icon buttons and
/// inputs still get a useful name.
pub fn extract_text(element: &PageElement) -> String {
    let attrs = &element.attributes;
    let labelled = [&attrs.aria_label, &attrs.title, &attrs.placeholder]
        .into_iter()
        .flatten()
        .map(|label| clean_text(label))
        .find(|label| !label.is_empty());
    if let Some(label) = labelled {
        return label;
    }

    let rendered = clean_text(&element.inner_text);
    if !rendered.is_empty() {
        return rendered;
    }

    [&attrs.value, &attrs.image_alt]
        .into_iter()
        .flatten()
        .map(|text| clean_text(text))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}
