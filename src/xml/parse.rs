use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::bytes::Regex;
use std::borrow::Cow;
use std::io::Cursor;
use std::sync::LazyLock;

use super::{Document, Element, Node};
use crate::error::{Error, Result};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

static DECLARED_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\A<\?xml\s[^>]*?\bencoding\s*=\s*["']([A-Za-z][A-Za-z0-9._-]*)["']"#)
        .expect("declaration pattern compiles")
});

impl Document {
    /// Parses a complete document into an owned tree.
    ///
    /// The input is decoded from its BOM or declared encoding, UTF-8 otherwise.
    /// Whitespace text is kept as-is inside the root element. Any well-formedness
    /// problem aborts with [`Error::Xml`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let decoded = decode(bytes)?;
        let mut reader = Reader::from_reader(Cursor::new(decoded.as_bytes()));
        reader.trim_text(false);
        let mut builder = TreeBuilder::default();
        let mut buf = Vec::new();

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|err| Error::xml(position, err.to_string()))?;
            match event {
                Event::Start(e) => builder.open(&e, position)?,
                Event::Empty(e) => {
                    builder.open(&e, position)?;
                    builder.close(position)?;
                }
                Event::End(_) => builder.close(position)?,
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::xml(position, err.to_string()))?;
                    builder.text(Node::Text(text.into_owned()), position)?;
                }
                Event::CData(e) => {
                    builder.text(Node::CData(lossy(&e)), position)?;
                }
                Event::Comment(e) => builder.misc(Node::Comment(lossy(&e))),
                Event::PI(e) => builder.misc(Node::ProcessingInstruction(lossy(&e))),
                Event::DocType(e) => builder.misc(Node::DocType(lossy(&e))),
                Event::Decl(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        builder.finish(reader.buffer_position() as u64)
    }
}

/// Decodes the raw document to UTF-8. Positions in later errors refer to the
/// decoded text.
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => sniff_encoding(bytes)?,
    };
    let (text, used, malformed) = encoding.decode(bytes);
    if malformed {
        return Err(Error::Encoding {
            encoding: used.name(),
        });
    }
    Ok(text)
}

fn sniff_encoding(bytes: &[u8]) -> Result<&'static Encoding> {
    if bytes.starts_with(b"<\0?\0") {
        return Ok(UTF_16LE);
    }
    if bytes.starts_with(b"\0<\0?") {
        return Ok(UTF_16BE);
    }
    let Some(label) = DECLARED_ENCODING
        .captures(bytes)
        .and_then(|caps| caps.get(1))
    else {
        return Ok(UTF_8);
    };
    match Encoding::for_label(label.as_bytes()) {
        // A UTF-16 label on single-byte input cannot be right; the bytes are ASCII-compatible.
        Some(encoding) if encoding == UTF_16LE || encoding == UTF_16BE => Ok(UTF_8),
        Some(encoding) => Ok(encoding),
        None => Err(Error::UnsupportedEncoding(lossy(label.as_bytes()))),
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    scopes: Vec<Vec<(Option<String>, String)>>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn open(&mut self, start: &BytesStart<'_>, position: u64) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(Error::xml(position, "more than one root element"));
        }
        let name = lossy(start.name().as_ref());
        let mut attributes = Vec::new();
        let mut declared = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| Error::xml(position, err.to_string()))?;
            let key = lossy(attr.key.as_ref());
            let value = attr
                .unescape_value()
                .map_err(|err| Error::xml(position, err.to_string()))?
                .into_owned();
            if key == "xmlns" {
                declared.push((None, value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declared.push((Some(prefix.to_string()), value.clone()));
            }
            attributes.push((key, value));
        }
        self.scopes.push(declared);

        let prefix = name.split_once(':').map(|(prefix, _)| prefix);
        let namespace = self.resolve(prefix);
        self.stack.push(Element {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        });
        Ok(())
    }

    fn close(&mut self, position: u64) -> Result<()> {
        let element = self
            .stack
            .pop()
            .ok_or_else(|| Error::xml(position, "closing tag without an open element"))?;
        self.scopes.pop();
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn text(&mut self, node: Node, position: u64) -> Result<()> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
            return Ok(());
        }
        match node {
            Node::Text(text) if text.trim().is_empty() => Ok(()),
            _ => Err(Error::xml(position, "text outside the root element")),
        }
    }

    fn misc(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        } else if self.root.is_none() {
            self.prolog.push(node);
        } else {
            self.epilog.push(node);
        }
    }

    fn resolve(&self, prefix: Option<&str>) -> Option<String> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE.to_string());
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(declared, _)| declared.as_deref() == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }

    fn finish(self, position: u64) -> Result<Document> {
        if let Some(open) = self.stack.last() {
            return Err(Error::xml(
                position,
                format!("unclosed element <{}>", open.name),
            ));
        }
        let root = self
            .root
            .ok_or_else(|| Error::xml(position, "document has no root element"))?;
        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}
