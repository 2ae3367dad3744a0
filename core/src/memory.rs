//! An in-memory [`Dom`].
//!
//! Keeps a node arena instead of a browser document. It backs the test
//! suites of every crate in the workspace and can host the engine headless.

use alloc::{rc::Rc, string::String, vec::Vec};
use core::{cell::RefCell, fmt, mem};

use crate::{
    dom::{Dom, DomEvent, EventHandler, EventKind, ListenerToken, MountPoints, NodeId},
    markup::{Markup, Node, escape},
};

enum Kind {
    Element(String),
    Text(String),
}

struct Listener {
    id: u64,
    kind: EventKind,
    handler: EventHandler,
}

struct NodeData {
    kind: Kind,
    attributes: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Listener>,
    value: Option<String>,
}

impl NodeData {
    const fn new(kind: Kind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            value: None,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

#[derive(Default)]
struct Arena {
    nodes: Vec<NodeData>,
    next_listener: u64,
}

impl Arena {
    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(data);
        NodeId::from_raw(id)
    }

    fn get(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.into_raw() as usize)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.into_raw() as usize)
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.get_mut(node).and_then(|data| data.parent.take()) else {
            return;
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|child| *child != node);
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        self.unlink(child);
        if let Some(data) = self.get_mut(child) {
            data.parent = Some(parent);
        }
        if let Some(data) = self.get_mut(parent) {
            data.children.push(child);
        }
    }

    fn build(&mut self, node: &Node, mounts: &mut MountPoints) -> NodeId {
        match node {
            Node::Text(text) => self.alloc(NodeData::new(Kind::Text(text.clone().into_owned()))),
            Node::Element(element) => {
                let mut data = NodeData::new(Kind::Element(element.tag().into()));
                data.attributes = element
                    .attributes()
                    .map(|(name, value)| (name.into(), value.into()))
                    .collect();
                data.value = element.attribute("value").map(String::from);
                let id = self.alloc(data);
                if let Some(key) = element.slot_key() {
                    mounts.insert_slot(key, id);
                }
                if let Some(name) = element.name() {
                    mounts.insert_named(name, id);
                }
                for child in element.child_nodes() {
                    let child = self.build(child, mounts);
                    self.link(id, child);
                }
                if element.tag() == "select" {
                    let selected = self.selected_option(id);
                    if let Some(data) = self.get_mut(id) {
                        data.value = selected;
                    }
                }
                id
            }
        }
    }

    fn selected_option(&self, select: NodeId) -> Option<String> {
        let options: Vec<&NodeData> = self
            .get(select)?
            .children
            .iter()
            .filter_map(|child| self.get(*child))
            .filter(|data| matches!(&data.kind, Kind::Element(tag) if tag == "option"))
            .collect();
        options
            .iter()
            .find(|data| data.attribute("selected").is_some())
            .or_else(|| options.first())
            .and_then(|data| data.attribute("value"))
            .map(String::from)
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .get(scope)
            .map(|data| data.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(data) = self.get(node) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.get(node) else { return };
        match &data.kind {
            Kind::Text(text) => out.push_str(&escape(text)),
            Kind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &data.attributes {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape(value));
                        out.push('"');
                    }
                }
                out.push('>');
                for child in &data.children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn write_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.get(node) else { return };
        match &data.kind {
            Kind::Text(text) => out.push_str(text),
            Kind::Element(_) => {
                for child in &data.children {
                    self.write_text(*child, out);
                }
            }
        }
    }
}

/// A [`Dom`] backed by an in-memory node arena.
///
/// The document starts with a `body` element. Nodes are never freed; the
/// arena is meant for tests and short headless sessions.
pub struct MemoryDom {
    arena: RefCell<Arena>,
    body: NodeId,
}

impl fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDom")
            .field("nodes", &self.arena.borrow().nodes.len())
            .field("body", &self.body)
            .finish()
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Creates a document holding an empty `body`.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::default();
        let body = arena.alloc(NodeData::new(Kind::Element("body".into())));
        Self {
            arena: RefCell::new(arena),
            body,
        }
    }

    /// The `body` element.
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Appends a `div` with the given `id` to the body and returns it.
    pub fn create_root(&self, id: &str) -> NodeId {
        let mut arena = self.arena.borrow_mut();
        let mut data = NodeData::new(Kind::Element("div".into()));
        data.attributes.push(("id".into(), id.into()));
        let node = arena.alloc(data);
        arena.link(self.body, node);
        node
    }

    /// Child nodes of `node`, text nodes included.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena
            .borrow()
            .get(node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    /// Tag name of an element, `None` for text nodes.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.arena.borrow().get(node)?.kind {
            Kind::Element(tag) => Some(tag.clone()),
            Kind::Text(_) => None,
        }
    }

    /// Value of attribute `name` on `node`.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.arena
            .borrow()
            .get(node)?
            .attribute(name)
            .map(String::from)
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.arena.borrow().write_text(node, &mut out);
        out
    }

    /// Serialises `node` and its subtree.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.arena.borrow().write_html(node, &mut out);
        out
    }

    /// Returns `true` when `node` is `ancestor` or lies below it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let arena = self.arena.borrow();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = arena.get(current).and_then(|data| data.parent);
        }
        false
    }

    /// Returns `true` when `node` is attached to the document.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// First element below `scope` carrying `class`, in document order.
    #[must_use]
    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.find_all_by_class(scope, class).into_iter().next()
    }

    /// Every element below `scope` carrying `class`, in document order.
    #[must_use]
    pub fn find_all_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        let arena = self.arena.borrow();
        arena
            .descendants(scope)
            .into_iter()
            .filter(|node| arena.get(*node).is_some_and(|data| data.has_class(class)))
            .collect()
    }

    /// First element below `scope` with the given tag, in document order.
    #[must_use]
    pub fn find_by_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        let arena = self.arena.borrow();
        arena.descendants(scope).into_iter().find(|node| {
            arena
                .get(*node)
                .is_some_and(|data| matches!(&data.kind, Kind::Element(t) if t == tag))
        })
    }

    /// Listeners registered on `node`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.arena
            .borrow()
            .get(node)
            .map_or(0, |data| data.listeners.len())
    }

    /// Listeners registered anywhere in the arena, detached nodes included.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.arena
            .borrow()
            .nodes
            .iter()
            .map(|data| data.listeners.len())
            .sum()
    }

    /// Fires `kind` on `node` and returns how many handlers ran.
    ///
    /// Events do not bubble.
    pub fn dispatch(&self, node: NodeId, kind: EventKind) -> usize {
        let (handlers, value) = {
            let arena = self.arena.borrow();
            let Some(data) = arena.get(node) else {
                return 0;
            };
            let handlers: Vec<EventHandler> = data
                .listeners
                .iter()
                .filter(|listener| listener.kind == kind)
                .map(|listener| Rc::clone(&listener.handler))
                .collect();
            (handlers, data.value.clone())
        };
        let event = DomEvent {
            kind,
            target: node,
            value,
        };
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Sets the value of a text field and fires `input`, like typing would.
    pub fn type_text(&self, node: NodeId, value: &str) -> usize {
        self.set_value(node, value);
        self.dispatch(node, EventKind::Input)
    }

    /// Sets the value of a control and fires `change`, like picking an option would.
    pub fn choose(&self, node: NodeId, value: &str) -> usize {
        self.set_value(node, value);
        self.dispatch(node, EventKind::Change)
    }
}

impl Dom for MemoryDom {
    fn create_element(&self, tag: &str) -> NodeId {
        self.arena
            .borrow_mut()
            .alloc(NodeData::new(Kind::Element(tag.into())))
    }

    fn find_root(&self, id: &str) -> Option<NodeId> {
        let arena = self.arena.borrow();
        arena
            .descendants(self.body)
            .into_iter()
            .find(|node| arena.get(*node).and_then(|data| data.attribute("id")) == Some(id))
    }

    fn replace_content(&self, node: NodeId, markup: &Markup) -> MountPoints {
        let mut arena = self.arena.borrow_mut();
        let mut mounts = MountPoints::new();
        let Some(data) = arena.get_mut(node) else {
            return mounts;
        };
        let previous = mem::take(&mut data.children);
        for child in previous {
            if let Some(data) = arena.get_mut(child) {
                data.parent = None;
            }
        }
        for child in markup.nodes() {
            let child = arena.build(child, &mut mounts);
            arena.link(node, child);
        }
        mounts
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        self.arena.borrow_mut().link(parent, child);
    }

    fn detach(&self, node: NodeId) {
        self.arena.borrow_mut().unlink(node);
    }

    fn clear(&self, node: NodeId) {
        let mut arena = self.arena.borrow_mut();
        let Some(data) = arena.get_mut(node) else { return };
        for child in mem::take(&mut data.children) {
            if let Some(data) = arena.get_mut(child) {
                data.parent = None;
            }
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.borrow().get(node)?.parent
    }

    fn listen(&self, node: NodeId, kind: EventKind, handler: EventHandler) -> ListenerToken {
        let mut arena = self.arena.borrow_mut();
        arena.next_listener += 1;
        let id = arena.next_listener;
        if let Some(data) = arena.get_mut(node) {
            data.listeners.push(Listener { id, kind, handler });
        }
        ListenerToken::new(node, id)
    }

    fn unlisten(&self, token: ListenerToken) {
        if let Some(data) = self.arena.borrow_mut().get_mut(token.node()) {
            data.listeners.retain(|listener| listener.id != token.id());
        }
    }

    fn value(&self, node: NodeId) -> Option<String> {
        self.arena.borrow().get(node)?.value.clone()
    }

    fn set_value(&self, node: NodeId, value: &str) {
        if let Some(data) = self.arena.borrow_mut().get_mut(node) {
            data.value = Some(value.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::{element, slot};

    #[test]
    fn replace_content_reports_slots_and_named_elements() {
        let dom = MemoryDom::new();
        let host = dom.create_root("app");
        let markup = Markup::from(
            element("div")
                .child(slot("left"))
                .child(element("button").named("go").text("Go")),
        );

        let mounts = dom.replace_content(host, &markup);

        let left = mounts.slot("left").expect("slot");
        let go = mounts.named("go").expect("named");
        assert!(dom.contains(host, left));
        assert_eq!(dom.tag(go).as_deref(), Some("button"));
        assert_eq!(
            dom.outer_html(host),
            r#"<div id="app"><div><div data-slot="left"></div><button>Go</button></div></div>"#
        );
    }

    #[test]
    fn replace_content_orphans_previous_children() {
        let dom = MemoryDom::new();
        let host = dom.create_root("app");
        let first = dom.replace_content(host, &element("p").named("p").into());
        let old = first.named("p").expect("p");

        dom.replace_content(host, &element("span").into());

        assert!(!dom.contains(host, old));
        assert_eq!(dom.parent(old), None);
    }

    #[test]
    fn find_root_searches_the_document_only() {
        let dom = MemoryDom::new();
        let app = dom.create_root("app");
        let detached = dom.create_element("div");
        dom.replace_content(detached, &element("div").id("ghost").into());

        assert_eq!(dom.find_root("app"), Some(app));
        assert_eq!(dom.find_root("ghost"), None);
    }

    #[test]
    fn unlisten_removes_only_the_matching_listener() {
        let dom = MemoryDom::new();
        let node = dom.create_element("button");
        let hits = Rc::new(Cell::new(0));
        let first = {
            let hits = hits.clone();
            dom.listen(node, EventKind::Click, Rc::new(move |_: &DomEvent| hits.set(hits.get() + 1)))
        };
        {
            let hits = hits.clone();
            dom.listen(node, EventKind::Click, Rc::new(move |_: &DomEvent| hits.set(hits.get() + 10)));
        }

        dom.unlisten(first);
        assert_eq!(dom.dispatch(node, EventKind::Click), 1);
        assert_eq!(hits.get(), 10);
        assert_eq!(dom.dispatch(node, EventKind::Input), 0);
    }

    #[test]
    fn select_value_follows_selected_option() {
        let dom = MemoryDom::new();
        let host = dom.create_root("app");
        let mounts = dom.replace_content(
            host,
            &element("select")
                .named("field")
                .child(element("option").attr("value", "a"))
                .child(element("option").attr("value", "b").flag("selected", true))
                .into(),
        );
        let select = mounts.named("field").expect("select");
        assert_eq!(dom.value(select).as_deref(), Some("b"));
    }

    #[test]
    fn events_carry_the_live_value() {
        let dom = MemoryDom::new();
        let input = dom.create_element("input");
        let seen = Rc::new(RefCell::new(None));
        {
            let seen = seen.clone();
            dom.listen(
                input,
                EventKind::Input,
                Rc::new(move |event: &DomEvent| *seen.borrow_mut() = event.value.clone()),
            );
        }
        dom.type_text(input, "perseverance");
        assert_eq!(seen.borrow().as_deref(), Some("perseverance"));
    }
}
