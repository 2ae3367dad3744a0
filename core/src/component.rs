//! The component lifecycle engine.
//!
//! A component owns one root element for its whole life. Every render pass
//! replaces the *content* of that element, never the element itself:
//!
//! ```text
//! construct ──mount──▶ mounted ──update_state──▶ mounted ──unmount──▶ unmounted
//!                       │  render, attach,          │  merge, render,
//!                       │  children, `mounted`      │  children, `updated`
//! ```
//!
//! Configuration (`&self` of the [`Component`] implementation) is immutable
//! after construction. State is only changed through
//! [`ComponentRef::update_state`], which runs synchronously to completion.

use alloc::{
    rc::{Rc, Weak},
    string::String,
    vec::Vec,
};
use core::{
    any::{Any, type_name},
    cell::{Ref, RefCell},
    fmt,
    mem,
};

use crate::{
    ChildRegistry, Merge,
    dom::{DomEvent, DomRef, EventHandler, EventKind, ListenerToken, MountPoints, NodeId},
    markup::Markup,
};

/// A unit owning one DOM subtree, its configuration and its mutable state.
///
/// The implementing type is the component's configuration. [`render`] must
/// be pure: it may not touch the DOM or mutate anything. DOM work belongs in
/// the hooks, which run after the rendered markup has been committed.
///
/// [`render`]: Component::render
pub trait Component: Sized + 'static {
    /// Mutable state, updated through shallow merges.
    type State: Merge + 'static;

    /// Computes the markup for the current configuration and state.
    fn render(&self, state: &Self::State) -> Markup;

    /// Runs once, after the first render is attached and children are mounted.
    fn mounted(&self, this: &ComponentRef<Self>) {
        let _ = this;
    }

    /// Runs after every state update has been rendered and children re-attached.
    fn updated(&self, this: &ComponentRef<Self>) {
        let _ = this;
    }

    /// Runs before children are unmounted and the root element is detached.
    fn unmounting(&self, this: &ComponentRef<Self>) {
        let _ = this;
    }
}

/// Lifecycle phase of a component instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Constructed but never mounted.
    #[default]
    Constructed,
    /// Attached under a parent element.
    Mounted,
    /// Unmounted for good.
    Unmounted,
}

struct Inner<C: Component> {
    config: C,
    dom: DomRef,
    root: NodeId,
    state: RefCell<C::State>,
    cycle: RefCell<Cycle>,
}

#[derive(Default)]
struct Cycle {
    phase: Phase,
    mounts: MountPoints,
    /// Bumped every time `mounts` is replaced by a render pass.
    epoch: u64,
    listeners: Vec<ListenerToken>,
    children: ChildRegistry,
}

/// Shared handle to a component instance.
pub struct ComponentRef<C: Component>(Rc<Inner<C>>);

impl<C: Component> Clone for ComponentRef<C> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<C: Component> fmt::Debug for ComponentRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRef")
            .field("component", &type_name::<C>())
            .field("root", &self.0.root)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<C: Component> ComponentRef<C> {
    /// Allocates the root element and stores configuration and state.
    ///
    /// Nothing is rendered and nothing is attached.
    pub fn construct(dom: &DomRef, tag: &str, config: C, state: C::State) -> Self {
        let root = dom.create_element(tag);
        tracing::trace!(component = type_name::<C>(), %root, "constructed");
        Self(Rc::new(Inner {
            config,
            dom: Rc::clone(dom),
            root,
            state: RefCell::new(state),
            cycle: RefCell::new(Cycle::default()),
        }))
    }

    /// Renders, attaches the root element under `parent`, mounts registered
    /// children and runs [`Component::mounted`].
    ///
    /// Mounting an instance that is not freshly constructed is ignored.
    pub fn mount(&self, parent: NodeId) {
        let phase = self.phase();
        if phase != Phase::Constructed {
            tracing::warn!(component = type_name::<C>(), ?phase, "mount ignored");
            return;
        }
        let mounts = self.commit();
        self.0.dom.append_child(parent, self.0.root);
        {
            let mut cycle = self.0.cycle.borrow_mut();
            cycle.mounts = mounts;
            cycle.epoch += 1;
            cycle.phase = Phase::Mounted;
        }
        self.attach_children();
        tracing::debug!(component = type_name::<C>(), root = %self.0.root, %parent, "mounted");
        self.0.config.mounted(self);
    }

    /// Shallow-merges `patch` into the state and, when mounted, re-renders,
    /// re-attaches children and runs [`Component::updated`].
    ///
    /// Before the first mount the patch is merged without rendering. After
    /// unmount the patch is dropped.
    ///
    /// # Panics
    ///
    /// Panics if a [`Ref`] obtained from [`ComponentRef::state`] is still
    /// alive.
    pub fn update_state(&self, patch: <C::State as Merge>::Patch) {
        match self.phase() {
            Phase::Unmounted => {
                tracing::warn!(component = type_name::<C>(), "state update after unmount ignored");
                return;
            }
            Phase::Constructed => {
                self.0.state.borrow_mut().merge(patch);
                return;
            }
            Phase::Mounted => {}
        }
        self.0.state.borrow_mut().merge(patch);
        self.release_listeners();
        let mounts = self.commit();
        {
            let mut cycle = self.0.cycle.borrow_mut();
            cycle.mounts = mounts;
            cycle.epoch += 1;
        }
        self.attach_children();
        tracing::trace!(component = type_name::<C>(), "updated");
        self.0.config.updated(self);
    }

    /// Runs [`Component::unmounting`], unmounts every child, releases
    /// listeners and detaches the root element.
    ///
    /// The instance counts as unmounted as soon as the hook returns, so state
    /// updates triggered while children unmount are dropped.
    pub fn unmount(&self) {
        match self.phase() {
            Phase::Unmounted => return,
            Phase::Constructed => {
                let children = {
                    let mut cycle = self.0.cycle.borrow_mut();
                    cycle.phase = Phase::Unmounted;
                    mem::take(&mut cycle.children)
                };
                children.unmount_all();
                self.0.dom.release(self.0.root);
                return;
            }
            Phase::Mounted => {}
        }
        self.0.config.unmounting(self);
        let children = {
            let mut cycle = self.0.cycle.borrow_mut();
            cycle.phase = Phase::Unmounted;
            mem::take(&mut cycle.children)
        };
        children.unmount_all();
        self.release_listeners();
        self.0.dom.detach(self.0.root);
        {
            let mut cycle = self.0.cycle.borrow_mut();
            cycle.mounts = MountPoints::new();
            cycle.epoch += 1;
        }
        self.0.dom.release(self.0.root);
        tracing::debug!(component = type_name::<C>(), root = %self.0.root, "unmounted");
    }

    /// Registers `child` under `key`, to be mounted on every future mount
    /// or update into the slot with the same key.
    ///
    /// Returns the child previously registered under `key`. It is *not*
    /// unmounted; that is the caller's job.
    pub fn add_child(
        &self,
        key: impl Into<String>,
        child: impl Into<AnyComponent>,
    ) -> Option<AnyComponent> {
        let mut cycle = self.0.cycle.borrow_mut();
        if cycle.phase == Phase::Unmounted {
            tracing::warn!(component = type_name::<C>(), "child added after unmount ignored");
            return None;
        }
        cycle.children.insert(key, child.into())
    }

    /// Unregisters and returns the child under `key` without unmounting it.
    pub fn remove_child(&self, key: &str) -> Option<AnyComponent> {
        self.0.cycle.borrow_mut().children.remove(key)
    }

    /// Returns the child registered under `key`.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<AnyComponent> {
        self.0.cycle.borrow().children.get(key).cloned()
    }

    /// Returns the keys of the registered children in registration order.
    #[must_use]
    pub fn child_keys(&self) -> Vec<String> {
        self.0
            .cycle
            .borrow()
            .children
            .keys()
            .map(String::from)
            .collect()
    }

    /// Attaches `handler` to the element rendered under `name`.
    ///
    /// The listener is released automatically before the next render and at
    /// unmount. Returns `None` when the current markup has no such element.
    pub fn listen(
        &self,
        name: &str,
        kind: EventKind,
        handler: impl Fn(&Self, &DomEvent) + 'static,
    ) -> Option<ListenerToken> {
        let node = self.named(name)?;
        self.listen_node(node, kind, handler)
    }

    /// Attaches `handler` to an arbitrary element. See [`ComponentRef::listen`].
    ///
    /// Returns `None` unless the component is mounted.
    pub fn listen_node(
        &self,
        node: NodeId,
        kind: EventKind,
        handler: impl Fn(&Self, &DomEvent) + 'static,
    ) -> Option<ListenerToken> {
        if self.phase() != Phase::Mounted {
            return None;
        }
        let weak = self.downgrade();
        let handler: EventHandler = Rc::new(move |event: &DomEvent| {
            if let Some(this) = weak.upgrade()
                && this.phase() == Phase::Mounted
            {
                handler(&this, event);
            }
        });
        let token = self.0.dom.listen(node, kind, handler);
        self.0.cycle.borrow_mut().listeners.push(token);
        Some(token)
    }

    /// Detaches the listener registered under `token`.
    pub fn unlisten(&self, token: ListenerToken) {
        self.0.cycle.borrow_mut().listeners.retain(|t| *t != token);
        self.0.dom.unlisten(token);
    }

    /// Number of listeners currently held by this instance.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.0.cycle.borrow().listeners.len()
    }

    /// Returns the element rendered under `name` in the latest render pass.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<NodeId> {
        self.0.cycle.borrow().mounts.named(name)
    }

    /// Returns the live value of the form control rendered under `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<String> {
        self.named(name).and_then(|node| self.0.dom.value(node))
    }

    /// Borrows the current state.
    ///
    /// Drop the guard before calling [`ComponentRef::update_state`].
    #[must_use]
    pub fn state(&self) -> Ref<'_, C::State> {
        self.0.state.borrow()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &C {
        &self.0.config
    }

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.0.root
    }

    /// Returns the DOM this instance renders into.
    #[must_use]
    pub fn dom(&self) -> &DomRef {
        &self.0.dom
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.0.cycle.borrow().phase
    }

    /// Creates a weak handle that does not keep the instance alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakRef<C> {
        WeakRef(Rc::downgrade(&self.0))
    }

    /// Type-erases the handle.
    #[must_use]
    pub fn erase(&self) -> AnyComponent {
        AnyComponent(Rc::clone(&self.0) as Rc<dyn Lifecycle>)
    }

    fn commit(&self) -> MountPoints {
        let markup = {
            let state = self.0.state.borrow();
            self.0.config.render(&state)
        };
        self.0.dom.replace_content(self.0.root, &markup)
    }

    /// Attaches children to the mount points of the latest render pass.
    ///
    /// A child hook may re-render this component while the loop runs; the
    /// nested pass attaches every child itself, so this one stops.
    fn attach_children(&self) {
        let (children, mounts, epoch) = {
            let cycle = self.0.cycle.borrow();
            (cycle.children.clone(), cycle.mounts.clone(), cycle.epoch)
        };
        children.attach_while(self.0.dom.as_ref(), &mounts, || {
            self.0.cycle.borrow().epoch == epoch
        });
    }

    fn release_listeners(&self) {
        let tokens = mem::take(&mut self.0.cycle.borrow_mut().listeners);
        for token in tokens {
            self.0.dom.unlisten(token);
        }
    }
}

/// Weak counterpart of [`ComponentRef`], used by listeners and async tasks.
pub struct WeakRef<C: Component>(Weak<Inner<C>>);

impl<C: Component> WeakRef<C> {
    /// Upgrades to a strong handle if the instance is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ComponentRef<C>> {
        self.0.upgrade().map(ComponentRef)
    }
}

impl<C: Component> Clone for WeakRef<C> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<C: Component> fmt::Debug for WeakRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakRef").field(&type_name::<C>()).finish()
    }
}

trait Lifecycle {
    fn mount(self: Rc<Self>, parent: NodeId);
    fn unmount(self: Rc<Self>);
    fn root(&self) -> NodeId;
    fn phase(&self) -> Phase;
    fn type_name(&self) -> &'static str;
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<C: Component> Lifecycle for Inner<C> {
    fn mount(self: Rc<Self>, parent: NodeId) {
        ComponentRef(self).mount(parent);
    }

    fn unmount(self: Rc<Self>) {
        ComponentRef(self).unmount();
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn phase(&self) -> Phase {
        self.cycle.borrow().phase
    }

    fn type_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A type-erased component handle, as stored by child registries and the router.
#[derive(Clone)]
pub struct AnyComponent(Rc<dyn Lifecycle>);

impl AnyComponent {
    /// See [`ComponentRef::mount`].
    pub fn mount(&self, parent: NodeId) {
        Rc::clone(&self.0).mount(parent);
    }

    /// See [`ComponentRef::unmount`].
    pub fn unmount(&self) {
        Rc::clone(&self.0).unmount();
    }

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.0.root()
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.0.phase()
    }

    /// Returns the type name of the component.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Recovers the typed handle when the component is a `C`.
    #[must_use]
    pub fn downcast<C: Component>(&self) -> Option<ComponentRef<C>> {
        Rc::clone(&self.0)
            .into_any()
            .downcast::<Inner<C>>()
            .ok()
            .map(ComponentRef)
    }

    /// Returns `true` when both handles point at the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyComponent")
            .field("component", &self.type_name())
            .field("root", &self.root())
            .field("phase", &self.phase())
            .finish()
    }
}

impl<C: Component> From<ComponentRef<C>> for AnyComponent {
    fn from(value: ComponentRef<C>) -> Self {
        Self(value.0 as Rc<dyn Lifecycle>)
    }
}

impl<C: Component> From<&ComponentRef<C>> for AnyComponent {
    fn from(value: &ComponentRef<C>) -> Self {
        value.erase()
    }
}
