use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

use super::{Document, Element, Node};

const INDENT: &str = "  ";

impl Document {
    /// Serializes with an XML declaration and indentation.
    ///
    /// Only elements whose children are all elements or comments are re-indented;
    /// anything holding text keeps its exact content.
    pub fn to_pretty_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut root = self.root.clone();
        indent(&mut root, 0);

        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(into_io)?;
        writer.get_mut().write_all(b"\n")?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
            writer.get_mut().write_all(b"\n")?;
        }
        write_element(&mut writer, &root)?;
        writer.get_mut().write_all(b"\n")?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
            writer.get_mut().write_all(b"\n")?;
        }
        Ok(writer.into_inner())
    }
}

fn indent(element: &mut Element, depth: usize) {
    let indentable = !element.children.is_empty()
        && element.has_child_elements()
        && element
            .children
            .iter()
            .all(|node| matches!(node, Node::Element(_) | Node::Comment(_)));
    if !indentable {
        return;
    }
    let inner = format!("\n{}", INDENT.repeat(depth + 1));
    let children = std::mem::take(&mut element.children);
    for mut node in children {
        if let Node::Element(child) = &mut node {
            indent(child, depth + 1);
        }
        element.children.push(Node::Text(inner.clone()));
        element.children.push(node);
    }
    element
        .children
        .push(Node::Text(format!("\n{}", INDENT.repeat(depth))));
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> std::io::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(into_io);
    }
    writer.write_event(Event::Start(start)).map_err(into_io)?;
    for node in &element.children {
        write_node(writer, node)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(into_io)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> std::io::Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => writer
            .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
            .map_err(into_io),
        Node::CData(text) => writer
            .write_event(Event::CData(BytesCData::new(text.as_str())))
            .map_err(into_io),
        Node::Comment(raw) => write!(writer.get_mut(), "<!--{}-->", raw),
        Node::ProcessingInstruction(raw) => write!(writer.get_mut(), "<?{}?>", raw),
        Node::DocType(raw) => write!(writer.get_mut(), "<!DOCTYPE {}>", raw),
    }
}

fn into_io(err: quick_xml::Error) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(input: &[u8]) -> String {
        let doc = Document::parse(input).expect("parse");
        String::from_utf8(doc.to_pretty_bytes().expect("write")).expect("utf8")
    }

    #[test]
    fn indents_element_only_content() {
        assert_eq!(
            render(b"<a><b><c>x</c></b><d/></a>"),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n  <b>\n    <c>x</c>\n  </b>\n  <d/>\n</a>\n"
        );
    }

    #[test]
    fn leaves_existing_layout_and_mixed_content_alone() {
        let input = "<a>\n <s>Hi <b>there</b> <x/></s>\n</a>";
        assert_eq!(
            render(input.as_bytes()),
            format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n", input)
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let out = render(br#"<a t="&quot;q&quot; &amp;">1 &lt; 2 &amp; "ok"</a>"#);
        assert!(out.contains(r#"<a t="&quot;q&quot; &amp;">1 &lt; 2 &amp; "ok"</a>"#));
    }

    #[test]
    fn keeps_prolog_comments() {
        let out = render(b"<!--c--><a/>");
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!--c-->\n<a/>\n"
        );
    }
}
