//! Minimal HTML element tree used to render post bodies.

use std::fmt::Write;

/// Options controlling markup serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Put block children on their own lines, indented by two spaces per level.
    pub pretty: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl RenderOptions {
    /// Compact output without added whitespace.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

/// An HTML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Append a text child. Empty strings are ignored.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.push(Node::Text(text.into()));
        self
    }

    /// Append an element child.
    pub fn child(mut self, child: Element) -> Self {
        self.push(Node::Element(child));
        self
    }

    /// Append children in order.
    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        for child in children {
            self.push(child.into());
        }
        self
    }

    pub fn push(&mut self, node: Node) {
        match node {
            Node::Text(text) if text.is_empty() => {}
            node => self.children.push(node),
        }
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    /// Concatenated text of this element and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize the element and its subtree.
    pub fn render(&self, options: RenderOptions) -> String {
        let mut out = String::new();
        if options.pretty {
            write_block(&mut out, self, 0);
        } else {
            write_inline(&mut out, self);
        }
        out
    }

    fn has_text(&self) -> bool {
        self.children.iter().any(|c| matches!(c, Node::Text(_)))
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(el, out),
        }
    }
}

fn write_open_tag(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
    }
}

/// Mixed content stays on one line; only element-only children get indented.
fn write_block(out: &mut String, element: &Element, depth: usize) {
    out.push_str(&"  ".repeat(depth));
    if element.children.is_empty() || element.has_text() {
        write_inline(out, element);
    } else {
        write_open_tag(out, element);
        out.push_str(">\n");
        for child in &element.children {
            if let Node::Element(el) = child {
                write_block(out, el, depth + 1);
            }
        }
        out.push_str(&"  ".repeat(depth));
        let _ = write!(out, "</{}>", element.tag);
    }
    out.push('\n');
}

fn write_inline(out: &mut String, element: &Element) {
    write_open_tag(out, element);
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(&escape_text(text)),
            Node::Element(el) => write_inline(out, el),
        }
    }
    let _ = write!(out, "</{}>", element.tag);
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
