//! Owned, mutable XML tree used for XLIFF documents.
//!
//! The tree is produced by [`Document::parse`] from `quick-xml` events and written
//! back by [`Document::to_pretty_bytes`]. Elements own their children, so cloning an
//! [`Element`] is a full recursive copy that shares nothing with the original.

mod parse;
mod write;

pub const XLIFF_NS: &str = "urn:oasis:names:tc:xliff:document:1.2";
pub const XML_SPACE_ATTR: &str = "xml:space";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Comments, processing instructions and doctype before the root element.
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written in the document, e.g. `source` or `x:source`.
    pub name: String,
    /// Namespace URI the prefix (or default namespace) resolved to.
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

impl Element {
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, keeping its position when it already exists.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| name == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// Index (among all children) of the first child element satisfying `predicate`.
    pub fn position_of_child<F>(&self, mut predicate: F) -> Option<usize>
    where
        F: FnMut(&Element) -> bool,
    {
        self.children
            .iter()
            .position(|node| node.as_element().is_some_and(&mut predicate))
    }

    /// Removes the child at `index` together with the indentation text right before it.
    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        if index >= self.children.len() {
            return None;
        }
        let removed = self.children.remove(index);
        if index > 0 && self.children[index - 1].is_blank_text() {
            self.children.remove(index - 1);
        }
        Some(removed)
    }

    /// Inserts `node` right after the child at `anchor`.
    ///
    /// When the anchor is indented by a whitespace-only text node, the same
    /// whitespace is repeated before the new node. A missing anchor appends at the end.
    pub fn insert_after(&mut self, anchor: Option<usize>, node: Node) {
        let Some(anchor) = anchor.filter(|index| *index < self.children.len()) else {
            self.children.push(node);
            return;
        };
        let indent = anchor
            .checked_sub(1)
            .map(|index| &self.children[index])
            .filter(|node| node.is_blank_text())
            .cloned();
        let mut at = anchor + 1;
        if let Some(indent) = indent {
            self.children.insert(at, indent);
            at += 1;
        }
        self.children.insert(at, node);
    }

    /// Text before the first child element.
    pub fn direct_text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                Node::Text(text) | Node::CData(text) => out.push_str(text),
                Node::Element(_) => break,
                _ => {}
            }
        }
        out
    }

    /// Replaces the text before the first child element with `text`.
    pub fn set_direct_text(&mut self, text: impl Into<String>) {
        let leading = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(_)))
            .unwrap_or(self.children.len());
        let mut index = 0;
        self.children.retain(|node| {
            let is_leading_text = index < leading && matches!(node, Node::Text(_) | Node::CData(_));
            index += 1;
            !is_leading_text
        });
        self.children.insert(0, Node::Text(text.into()));
    }

    /// XPath string value: every descendant text node concatenated in document order.
    pub fn string_value(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) | Node::CData(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
                _ => {}
            }
        }
    }

    /// Pre-order search over this element and its descendants.
    pub fn find_first_mut<F>(&mut self, predicate: &mut F) -> Option<&mut Element>
    where
        F: FnMut(&Element) -> bool,
    {
        if predicate(&*self) {
            return Some(self);
        }
        for node in &mut self.children {
            if let Node::Element(child) = node {
                if let Some(found) = child.find_first_mut(predicate) {
                    return Some(found);
                }
            }
        }
        None
    }
}

/// Namespace used for every XLIFF element lookup in one document.
///
/// Resolved once from the root element; un-namespaced elements also match so that
/// documents without an `xmlns` declaration still work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceContext {
    namespace: String,
}

impl NamespaceContext {
    pub fn detect(document: &Document) -> Self {
        let namespace = document
            .root
            .namespace
            .clone()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| XLIFF_NS.to_string());
        Self { namespace }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is(&self, element: &Element, local_name: &str) -> bool {
        if element.local_name() != local_name {
            return false;
        }
        match element.namespace.as_deref() {
            None | Some("") => true,
            Some(namespace) => namespace == self.namespace,
        }
    }
}
