//! Builds `<target>` elements for a resolved translation.

use crate::xml::{Element, Node, XML_SPACE_ATTR};

/// Creates an empty sibling of `source` named `local_name`, reusing its prefix and namespace.
fn sibling(source: &Element, local_name: &str) -> Element {
    let name = match source.prefix() {
        Some(prefix) => format!("{}:{}", prefix, local_name),
        None => local_name.to_string(),
    };
    let mut element = Element::new(name, source.namespace.clone());
    element.set_attribute(XML_SPACE_ATTR, "preserve");
    element
}

/// Target that mirrors the inline elements of `source` and carries `translated`.
///
/// Every child element of the source is deep-copied in order. The translated text goes
/// into the first element (pre-order, the target itself included) whose direct text is
/// blank; if there is none it is appended to the target's own text. Text between or
/// after the source's inline elements is not copied.
pub fn build_translation_node(source: &Element, translated: &str) -> Element {
    let mut target = sibling(source, "target");
    if !source.has_child_elements() {
        target.children.push(Node::Text(translated.to_string()));
        return target;
    }

    target.children.extend(
        source
            .child_elements()
            .map(|child| Node::Element(child.clone())),
    );

    let mut is_blank = |element: &Element| element.direct_text().trim().is_empty();
    if let Some(slot) = target.find_first_mut(&mut is_blank) {
        slot.set_direct_text(translated);
        return target;
    }

    let existing = target.direct_text();
    if existing.is_empty() {
        target.set_direct_text(translated);
    } else {
        target.set_direct_text(format!("{} {}", existing, translated));
    }
    target
}

/// Target holding `translated` as its only text, used when tags are not preserved.
pub fn build_plain_translation_node(source: &Element, translated: &str) -> Element {
    let mut target = sibling(source, "target");
    target.children.push(Node::Text(translated.to_string()));
    target
}
