use regex::Regex;
use std::sync::LazyLock;

use crate::xml::Element;

static MARKUP_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("markup pattern compiles"));

/// Canonical comparison form of a piece of text.
///
/// Non-breaking spaces become ordinary spaces, every whitespace run collapses
/// to one space and the ends are trimmed.
pub fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for ch in value.chars() {
        if ch == '\u{a0}' || ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

pub fn normalize_opt(value: Option<&str>) -> String {
    value.map(normalize).unwrap_or_default()
}

/// Drops `<...>` runs from rich text pulled out of table cells, then normalizes.
///
/// Only meant for glossary cells; XML content goes through [`flatten_element_text`].
pub fn strip_markup_like(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    normalize(&MARKUP_LIKE.replace_all(value, ""))
}

/// Normalized string value of an element: all descendant text in document order.
pub fn flatten_element_text(element: &Element) -> String {
    normalize(&element.string_value())
}
