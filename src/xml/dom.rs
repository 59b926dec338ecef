//! XML element tree and writers
//!
//! A minimal owned DOM, enough to represent serialized blocks: elements
//! with ordered attributes, element children, and text content. Two writers
//! render it back to text: a compact single-line form and the canonical
//! pretty form every serialization assertion compares against.

use std::fmt::Write as _;

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element: name, attributes in document order, children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value and otherwise
    /// appending in document order.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Child elements only, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// The element's text content, if its only child is a text node.
    pub fn text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [Node::Text(t)] => Some(t),
            _ => None,
        }
    }
}

/// Render an element as compact single-line XML.
pub fn dom_to_text(element: &Element) -> String {
    let mut out = String::new();
    write_compact(element, &mut out);
    out
}

/// Render an element in canonical pretty form: two-space indentation, one
/// element per line, text-only elements kept on one line, no trailing
/// newline.
pub fn dom_to_pretty_text(element: &Element) -> String {
    let mut out = String::new();
    write_pretty(element, 0, &mut out);
    out
}

fn write_open_tag(element: &Element, self_closing: bool, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attributes {
        let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
    }
    if self_closing {
        out.push('/');
    }
    out.push('>');
}

fn write_compact(element: &Element, out: &mut String) {
    if element.children.is_empty() {
        write_open_tag(element, true, out);
        return;
    }
    write_open_tag(element, false, out);
    for child in &element.children {
        match child {
            Node::Element(e) => write_compact(e, out),
            Node::Text(t) => out.push_str(&escape_text(t)),
        }
    }
    let _ = write!(out, "</{}>", element.name);
}

fn write_pretty(element: &Element, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    if element.children.is_empty() {
        write_open_tag(element, true, out);
        return;
    }
    if let Some(text) = element.text() {
        write_open_tag(element, false, out);
        out.push_str(&escape_text(text));
        let _ = write!(out, "</{}>", element.name);
        return;
    }
    write_open_tag(element, false, out);
    for child in &element.children {
        out.push('\n');
        match child {
            Node::Element(e) => write_pretty(e, depth + 1, out),
            Node::Text(t) => {
                out.push_str(&indent);
                out.push_str("  ");
                out.push_str(&escape_text(t));
            }
        }
    }
    out.push('\n');
    out.push_str(&indent);
    let _ = write!(out, "</{}>", element.name);
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
