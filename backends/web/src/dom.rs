//! The web-sys backed [`Dom`].
//!
//! Elements are kept in a slot table and addressed by [`NodeId`]. Only the
//! elements the engine needs to reach get a slot: component roots, slot
//! placeholders and named elements. Slots allocated by a render pass belong
//! to the element the markup was rendered into and are recycled by the next
//! pass or when that element is released.

use std::{cell::RefCell, collections::HashMap, fmt};

use marsview_core::{
    Dom, DomEvent, EventHandler, EventKind, ListenerToken, Markup, MountPoints, Node as MarkupNode,
    NodeId,
};
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{Document, Event, HtmlInputElement, HtmlSelectElement, Node};

use crate::error::{WebError, js_message};

const STYLE_ID: &str = "marsview-styles";

struct Listener {
    node: NodeId,
    kind: EventKind,
    callback: Closure<dyn FnMut(Event)>,
}

#[derive(Default)]
struct Slots {
    nodes: Vec<Option<Node>>,
    free: Vec<u32>,
    roots: HashMap<String, NodeId>,
    owned: HashMap<NodeId, Vec<NodeId>>,
    listeners: HashMap<u64, Listener>,
    next_listener: u64,
}

impl Slots {
    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.nodes[index as usize] = Some(node);
            return NodeId::from_raw(index);
        }
        #[allow(clippy::cast_possible_truncation)]
        let index = self.nodes.len() as u32;
        self.nodes.push(Some(node));
        NodeId::from_raw(index)
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.into_raw() as usize)?.as_ref()
    }

    fn free(&mut self, id: NodeId) {
        if let Some(slot) = self.nodes.get_mut(id.into_raw() as usize)
            && slot.take().is_some()
        {
            self.free.push(id.into_raw());
        }
    }
}

/// [`Dom`] implementation driving the browser document.
pub struct WebDom {
    document: Document,
    slots: RefCell<Slots>,
}

impl fmt::Debug for WebDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        f.debug_struct("WebDom")
            .field("live", &(slots.nodes.len() - slots.free.len()))
            .field("listeners", &slots.listeners.len())
            .finish_non_exhaustive()
    }
}

impl WebDom {
    /// Wraps `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            slots: RefCell::new(Slots::default()),
        }
    }

    /// Returns the owning document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    fn node(&self, id: NodeId) -> Option<Node> {
        self.slots.borrow().get(id).cloned()
    }

    fn build(
        &self,
        parent: &Node,
        node: &MarkupNode,
        mounts: &mut MountPoints,
        created: &mut Vec<NodeId>,
    ) -> Result<(), WebError> {
        match node {
            MarkupNode::Text(text) => {
                parent.append_child(&self.document.create_text_node(text))?;
            }
            MarkupNode::Element(markup) => {
                let element = self.document.create_element(markup.tag())?;
                for (name, value) in markup.attributes() {
                    element.set_attribute(name, value)?;
                }
                for child in markup.child_nodes() {
                    self.build(&element, child, mounts, created)?;
                }
                if markup.slot_key().is_some() || markup.name().is_some() {
                    let id = self.slots.borrow_mut().alloc(element.clone().into());
                    created.push(id);
                    if let Some(key) = markup.slot_key() {
                        mounts.insert_slot(key, id);
                    }
                    if let Some(name) = markup.name() {
                        mounts.insert_named(name, id);
                    }
                }
                parent.append_child(&element)?;
            }
        }
        Ok(())
    }

    /// Frees `ids` and drops the listeners still attached to them.
    fn forget(&self, ids: &[NodeId]) {
        let mut dropped = Vec::new();
        {
            let mut slots = self.slots.borrow_mut();
            let keys: Vec<u64> = slots
                .listeners
                .iter()
                .filter(|(_, listener)| ids.contains(&listener.node))
                .map(|(key, _)| *key)
                .collect();
            for key in keys {
                if let Some(listener) = slots.listeners.remove(&key) {
                    dropped.push((slots.get(listener.node).cloned(), listener));
                }
            }
            for id in ids {
                slots.free(*id);
            }
            slots.roots.retain(|_, root| !ids.contains(root));
        }
        for (node, listener) in dropped {
            remove_listener(node.as_ref(), &listener);
        }
    }
}

fn remove_listener(node: Option<&Node>, listener: &Listener) {
    if let Some(node) = node
        && let Err(error) = node.remove_event_listener_with_callback(
            listener.kind.as_str(),
            listener.callback.as_ref().unchecked_ref(),
        )
    {
        tracing::warn!(error = %js_message(&error), "removing listener failed");
    }
}

fn control_value(node: &Node) -> Option<String> {
    if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    node.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
}

impl Dom for WebDom {
    fn create_element(&self, tag: &str) -> NodeId {
        let node: Node = match self.document.create_element(tag) {
            Ok(element) => element.into(),
            Err(error) => {
                tracing::error!(tag, error = %js_message(&error), "element not created");
                self.document.create_text_node("").into()
            }
        };
        self.slots.borrow_mut().alloc(node)
    }

    fn find_root(&self, id: &str) -> Option<NodeId> {
        if let Some(root) = self.slots.borrow().roots.get(id) {
            return Some(*root);
        }
        let element = self.document.get_element_by_id(id)?;
        let mut slots = self.slots.borrow_mut();
        let root = slots.alloc(element.into());
        slots.roots.insert(id.into(), root);
        Some(root)
    }

    fn replace_content(&self, node: NodeId, markup: &Markup) -> MountPoints {
        let mut mounts = MountPoints::new();
        let Some(host) = self.node(node) else {
            return mounts;
        };
        let stale = self.slots.borrow_mut().owned.remove(&node).unwrap_or_default();
        self.forget(&stale);
        host.set_text_content(None);

        let fragment = self.document.create_document_fragment();
        let mut created = Vec::new();
        for child in markup.nodes() {
            if let Err(error) = self.build(&fragment, child, &mut mounts, &mut created) {
                tracing::error!(%error, %node, "render aborted");
                break;
            }
        }
        if let Err(error) = host.append_child(&fragment) {
            tracing::error!(error = %js_message(&error), %node, "render not attached");
        }
        self.slots.borrow_mut().owned.insert(node, created);
        mounts
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let (Some(parent), Some(child)) = (self.node(parent), self.node(child)) else {
            return;
        };
        if let Err(error) = parent.append_child(&child) {
            tracing::warn!(error = %js_message(&error), "append failed");
        }
    }

    fn detach(&self, node: NodeId) {
        if let Some(node) = self.node(node)
            && let Some(parent) = node.parent_node()
            && let Err(error) = parent.remove_child(&node)
        {
            tracing::warn!(error = %js_message(&error), "detach failed");
        }
    }

    fn clear(&self, node: NodeId) {
        let stale = self.slots.borrow_mut().owned.remove(&node).unwrap_or_default();
        self.forget(&stale);
        if let Some(node) = self.node(node) {
            node.set_text_content(None);
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let slots = self.slots.borrow();
        let parent = slots.get(node)?.parent_node()?;
        slots
            .nodes
            .iter()
            .position(|candidate| candidate.as_ref() == Some(&parent))
            .and_then(|index| u32::try_from(index).ok())
            .map(NodeId::from_raw)
    }

    fn listen(&self, node: NodeId, kind: EventKind, handler: EventHandler) -> ListenerToken {
        let mut slots = self.slots.borrow_mut();
        let id = slots.next_listener;
        slots.next_listener += 1;
        let token = ListenerToken::new(node, id);
        let Some(target) = slots.get(node).cloned() else {
            tracing::trace!(%node, "listen on unknown node ignored");
            return token;
        };

        let source = target.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            let event = DomEvent {
                kind,
                target: node,
                value: control_value(&source),
            };
            handler(&event);
        });
        if let Err(error) =
            target.add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
        {
            tracing::warn!(error = %js_message(&error), %node, "listener not attached");
            return token;
        }
        slots.listeners.insert(
            id,
            Listener {
                node,
                kind,
                callback,
            },
        );
        token
    }

    fn unlisten(&self, token: ListenerToken) {
        let removed = {
            let mut slots = self.slots.borrow_mut();
            slots
                .listeners
                .remove(&token.id())
                .map(|listener| (slots.get(listener.node).cloned(), listener))
        };
        if let Some((node, listener)) = removed {
            remove_listener(node.as_ref(), &listener);
        }
    }

    fn value(&self, node: NodeId) -> Option<String> {
        control_value(&self.node(node)?)
    }

    fn set_value(&self, node: NodeId, value: &str) {
        let Some(node) = self.node(node) else {
            return;
        };
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        }
    }

    fn release(&self, node: NodeId) {
        let mut ids = self.slots.borrow_mut().owned.remove(&node).unwrap_or_default();
        ids.push(node);
        self.forget(&ids);
    }
}

/// Adds the default stylesheet to `document` unless it is already present.
pub(crate) fn inject_stylesheet(document: &Document) -> Result<(), WebError> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = document.create_element("style")?;
    style.set_id(STYLE_ID);
    style.set_attribute("data-marsview", "true")?;
    style.set_text_content(Some(include_str!("../styles/default.css")));

    if let Some(head) = document.head() {
        head.append_child(&style)?;
    } else if let Some(body) = document.body() {
        body.prepend_with_node_1(&style)?;
    } else {
        return Err(WebError::DomUnavailable);
    }
    Ok(())
}
