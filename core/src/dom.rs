//! The DOM port.
//!
//! Components never talk to a browser directly. Every node operation goes
//! through a [`Dom`] implementation: the in-memory [`MemoryDom`](crate::MemoryDom)
//! for tests and headless use, or the web-sys backed DOM shipped by the web
//! backend. Nodes are addressed by opaque [`NodeId`] handles.

use alloc::{collections::BTreeMap, rc::Rc, string::String};
use core::fmt;

use crate::markup::Markup;

/// Opaque handle to an element owned by a [`Dom`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Wraps a raw index handed out by a [`Dom`] implementation.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index of this handle.
    #[must_use]
    pub const fn into_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// DOM events the engine knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventKind {
    /// A pointer activation.
    Click,
    /// The value of an editable element changed while typing.
    Input,
    /// The committed value of a form control changed.
    Change,
}

impl EventKind {
    /// Returns the DOM event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::Change => "change",
        }
    }
}

/// An event delivered to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    /// Which event fired.
    pub kind: EventKind,
    /// The element the listener was registered on.
    pub target: NodeId,
    /// The current value of the target when it is a form control.
    pub value: Option<String>,
}

/// Callback invoked when a listened event fires.
pub type EventHandler = Rc<dyn Fn(&DomEvent)>;

/// Registration token returned by [`Dom::listen`].
///
/// Passing the token back to [`Dom::unlisten`] removes exactly the listener
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken {
    node: NodeId,
    id: u64,
}

impl ListenerToken {
    /// Creates a token. Only [`Dom`] implementations should need this.
    #[must_use]
    pub const fn new(node: NodeId, id: u64) -> Self {
        Self { node, id }
    }

    /// The element the listener is attached to.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Implementation-defined listener identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Mount points produced by one render pass.
///
/// Built by the [`Dom`] while it materialises a [`Markup`] tree: every slot
/// declared in the markup maps its key to the placeholder element, every
/// named element maps its name to the element. Lookups never query the
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountPoints {
    slots: BTreeMap<String, NodeId>,
    named: BTreeMap<String, NodeId>,
}

impl MountPoints {
    /// Creates an empty set of mount points.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            named: BTreeMap::new(),
        }
    }

    /// Records the placeholder for `key`. The first declaration of a key wins.
    pub fn insert_slot(&mut self, key: &str, node: NodeId) {
        if self.slots.contains_key(key) {
            tracing::warn!(key, "duplicate slot declared in markup, keeping the first");
            return;
        }
        self.slots.insert(key.into(), node);
    }

    /// Records a named element. The first declaration of a name wins.
    pub fn insert_named(&mut self, name: &str, node: NodeId) {
        self.named.entry(name.into()).or_insert(node);
    }

    /// Returns the placeholder declared for `key`.
    #[must_use]
    pub fn slot(&self, key: &str) -> Option<NodeId> {
        self.slots.get(key).copied()
    }

    /// Returns the element declared under `name`.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<NodeId> {
        self.named.get(name).copied()
    }

    /// Iterates over the declared slots in key order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.slots.iter().map(|(key, node)| (key.as_str(), *node))
    }
}

/// Node creation, attachment and listener registration.
///
/// Implementations must not fail for ordinary conditions: operations on
/// unknown or detached nodes are ignored.
pub trait Dom {
    /// Creates a detached element.
    fn create_element(&self, tag: &str) -> NodeId;

    /// Looks up the element with the given `id` attribute in the document.
    fn find_root(&self, id: &str) -> Option<NodeId>;

    /// Replaces the content of `node` with `markup` and returns the mount
    /// points the markup declared.
    fn replace_content(&self, node: NodeId, markup: &Markup) -> MountPoints;

    /// Appends `child` as the last child of `parent`, moving it if it is
    /// attached elsewhere.
    fn append_child(&self, parent: NodeId, child: NodeId);

    /// Detaches `node` from its parent. The node keeps its own subtree.
    fn detach(&self, node: NodeId);

    /// Removes every child of `node`.
    fn clear(&self, node: NodeId);

    /// Returns the parent of `node` when it is attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Registers `handler` for `kind` events on `node`.
    fn listen(&self, node: NodeId, kind: EventKind, handler: EventHandler) -> ListenerToken;

    /// Removes the listener registered under `token`.
    fn unlisten(&self, token: ListenerToken);

    /// Returns the live value of a form control.
    fn value(&self, node: NodeId) -> Option<String>;

    /// Overwrites the live value of a form control.
    fn set_value(&self, node: NodeId, value: &str);

    /// Tells the implementation that `node` and the elements rendered into
    /// it will not be used again.
    fn release(&self, node: NodeId) {
        let _ = node;
    }
}

/// Shared handle to a [`Dom`] implementation.
pub type DomRef = Rc<dyn Dom>;
