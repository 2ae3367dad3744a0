//! Markup trees returned by [`Component::render`](crate::Component::render).
//!
//! A render pass produces a plain tree of elements and text. Two kinds of
//! elements are special:
//!
//! - a **slot** is a placeholder element identified by a key; the parent's
//!   child registry mounts the child registered under that key into it;
//! - a **named** element is an element hooks want to reach (to attach a
//!   listener or read a value) without querying the document.
//!
//! ```
//! use marsview_core::{element, slot};
//!
//! let markup = element("section")
//!     .class("search")
//!     .child(slot("rover-input"))
//!     .child(element("button").named("retry").text("Try again"));
//! assert!(markup.to_html().contains(r#"data-slot="rover-input""#));
//! ```

use alloc::{
    borrow::Cow,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt::Write;

/// Attribute carrying the key of a slot placeholder.
pub const SLOT_ATTRIBUTE: &str = "data-slot";

/// A node of a markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// A text node.
    Text(Cow<'static, str>),
}

/// An element of a markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Element {
    tag: Cow<'static, str>,
    attributes: Vec<(Cow<'static, str>, String)>,
    children: Vec<Node>,
    slot: Option<String>,
    name: Option<String>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            slot: None,
            name: None,
        }
    }

    /// Sets an attribute, replacing an earlier value of the same name.
    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl ToString) -> Self {
        let name = name.into();
        let value = value.to_string();
        if let Some(existing) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value;
        } else {
            self.attributes.push((name, value));
        }
        self
    }

    /// Sets a boolean attribute (`disabled`, `selected`, ...) when `on` is true.
    pub fn flag(self, name: impl Into<Cow<'static, str>>, on: bool) -> Self {
        if on { self.attr(name, "") } else { self }
    }

    /// Sets the `class` attribute.
    pub fn class(self, class: impl ToString) -> Self {
        self.attr("class", class)
    }

    /// Sets the `id` attribute.
    pub fn id(self, id: impl ToString) -> Self {
        self.attr("id", id)
    }

    /// Appends a child node.
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends every node yielded by `children`.
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Appends a text node.
    pub fn text(self, text: impl Into<Cow<'static, str>>) -> Self {
        self.child(Node::Text(text.into()))
    }

    /// Makes the element reachable from hooks under `name`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_ref(), value.as_str()))
    }

    /// Returns the value of attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the child nodes.
    #[must_use]
    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    /// Returns the slot key when this element is a placeholder.
    #[must_use]
    pub fn slot_key(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Returns the name hooks use to reach this element.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Serialises the element to HTML, escaping text and attribute values.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self);
        out
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

impl From<&'static str> for Node {
    fn from(value: &'static str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

/// The output of one render pass: a list of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct Markup {
    nodes: Vec<Node>,
}

impl Markup {
    /// Creates empty markup.
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Appends a top-level node.
    pub fn push(mut self, node: impl Into<Node>) -> Self {
        self.nodes.push(node.into());
        self
    }

    /// Returns the top-level nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the keys of every slot declared in document order.
    #[must_use]
    pub fn slot_keys(&self) -> Vec<&str> {
        fn collect<'a>(nodes: &'a [Node], keys: &mut Vec<&'a str>) {
            for node in nodes {
                if let Node::Element(element) = node {
                    if let Some(key) = element.slot_key() {
                        keys.push(key);
                    }
                    collect(&element.children, keys);
                }
            }
        }
        let mut keys = Vec::new();
        collect(&self.nodes, &mut keys);
        keys
    }

    /// Serialises the markup to HTML, escaping text and attribute values.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node);
        }
        out
    }
}

impl From<Element> for Markup {
    fn from(value: Element) -> Self {
        Self::new().push(value)
    }
}

impl From<Node> for Markup {
    fn from(value: Node) -> Self {
        Self::new().push(value)
    }
}

impl<N: Into<Node>> FromIterator<N> for Markup {
    fn from_iter<T: IntoIterator<Item = N>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Creates an element with the given tag.
pub fn element(tag: impl Into<Cow<'static, str>>) -> Element {
    Element::new(tag)
}

/// Creates a placeholder the child registered under `key` is mounted into.
pub fn slot(key: impl Into<String>) -> Element {
    let key = key.into();
    let mut placeholder = Element::new("div").attr(SLOT_ATTRIBUTE, &key);
    placeholder.slot = Some(key);
    placeholder
}

/// Creates a text node.
pub fn text(text: impl Into<Cow<'static, str>>) -> Node {
    Node::Text(text.into())
}

/// Escapes `&`, `<`, `>`, `"` and `'` for use in HTML text and attributes.
#[must_use]
pub fn escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(element) => write_element(out, element),
        Node::Text(text) => out.push_str(&escape(text)),
    }
}

fn write_element(out: &mut String, element: &Element) {
    let _ = write!(out, "<{}", element.tag);
    for (name, value) in &element.attributes {
        if value.is_empty() {
            let _ = write!(out, " {name}");
        } else {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
    }
    out.push('>');
    if is_void(&element.tag) {
        return;
    }
    for child in &element.children {
        write_node(out, child);
    }
    let _ = write!(out, "</{}>", element.tag);
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_nested_elements() {
        let markup = Markup::from(
            element("div")
                .class("card")
                .child(element("img").attr("src", "a.jpg"))
                .child(element("p").text("Sol 1000")),
        );
        assert_eq!(
            markup.to_html(),
            r#"<div class="card"><img src="a.jpg"><p>Sol 1000</p></div>"#
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let html = element("p")
            .attr("title", "\"quoted\"")
            .text("<b>&</b>")
            .to_html();
        assert_eq!(html, r#"<p title="&quot;quoted&quot;">&lt;b&gt;&amp;&lt;/b&gt;</p>"#);
    }

    #[test]
    fn flag_only_sets_attribute_when_on() {
        assert_eq!(element("button").flag("disabled", true).to_html(), "<button disabled></button>");
        assert_eq!(element("button").flag("disabled", false).to_html(), "<button></button>");
    }

    #[test]
    fn attr_replaces_previous_value() {
        let element = element("a").attr("href", "#/").attr("href", "#/photo/1");
        assert_eq!(element.attribute("href"), Some("#/photo/1"));
        assert_eq!(element.attributes().count(), 1);
    }

    #[test]
    fn slot_keys_are_collected_in_document_order() {
        let markup = Markup::new()
            .push(element("header").child(slot("a")))
            .push(element("main").child(element("div").child(slot("b"))).child(slot("c")));
        assert_eq!(markup.slot_keys(), ["a", "b", "c"]);
    }

    #[test]
    fn escape_borrows_clean_input() {
        assert!(matches!(escape("curiosity"), Cow::Borrowed(_)));
    }
}
