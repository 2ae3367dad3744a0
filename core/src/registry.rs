//! Keyed child components.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::{
    component::{AnyComponent, Phase},
    dom::{Dom, MountPoints},
};

/// Per-component mapping from slot key to child instance.
///
/// Keys keep their registration order; re-registering a key replaces the
/// entry in place.
#[derive(Clone, Default)]
pub struct ChildRegistry {
    entries: Vec<(String, AnyComponent)>,
}

impl ChildRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `child` under `key` and returns the child it replaced.
    pub fn insert(&mut self, key: impl Into<String>, child: AnyComponent) -> Option<AnyComponent> {
        let key = key.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(core::mem::replace(existing, child));
        }
        self.entries.push((key, child));
        None
    }

    /// Returns the child registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AnyComponent> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, child)| child)
    }

    /// Unregisters the child under `key`.
    pub fn remove(&mut self, key: &str) -> Option<AnyComponent> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates over the keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterates over the entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnyComponent)> {
        self.entries.iter().map(|(key, child)| (key.as_str(), child))
    }

    /// Number of registered children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no child is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Places every child into the slot carrying its key.
    ///
    /// A child seen for the first time is mounted. A child that is already
    /// mounted is moved into the new placeholder without re-rendering, so
    /// its live elements keep focus and typed values. A child whose slot is
    /// missing from `mounts` is detached and stays registered.
    pub fn attach(&self, dom: &dyn Dom, mounts: &MountPoints) {
        self.attach_while(dom, mounts, || true);
    }

    /// Like [`ChildRegistry::attach`], but stops before the next child as
    /// soon as `current` reports that `mounts` has been superseded.
    pub fn attach_while(&self, dom: &dyn Dom, mounts: &MountPoints, current: impl Fn() -> bool) {
        for (key, child) in &self.entries {
            if !current() {
                tracing::trace!(key = key.as_str(), "mount points superseded, attach stopped");
                return;
            }
            match (mounts.slot(key), child.phase()) {
                (Some(slot), Phase::Constructed) => child.mount(slot),
                (Some(slot), Phase::Mounted) => dom.append_child(slot, child.root()),
                (None, Phase::Mounted) => {
                    tracing::trace!(key = key.as_str(), "no placeholder, detaching child");
                    dom.detach(child.root());
                }
                (None, Phase::Constructed) => {
                    tracing::trace!(key = key.as_str(), "no placeholder, child not mounted");
                }
                (_, Phase::Unmounted) => {
                    tracing::warn!(key = key.as_str(), "registered child was already unmounted");
                }
            }
        }
    }

    /// Unmounts every child in registration order.
    pub fn unmount_all(&self) {
        for (_, child) in &self.entries {
            child.unmount();
        }
    }
}

impl fmt::Debug for ChildRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, child)| (key, child.type_name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;

    use super::*;
    use crate::{Component, ComponentRef, DomRef, MemoryDom, Markup, element};

    struct Tile(&'static str);

    impl Component for Tile {
        type State = ();

        fn render(&self, _: &()) -> Markup {
            element("span").text(self.0).into()
        }
    }

    fn tile(dom: &DomRef, label: &'static str) -> AnyComponent {
        ComponentRef::construct(dom, "div", Tile(label), ()).erase()
    }

    #[test]
    fn insert_replaces_in_place_and_returns_previous() {
        let dom: DomRef = Rc::new(MemoryDom::new());
        let mut registry = ChildRegistry::new();
        let first = tile(&dom, "first");
        assert!(registry.insert("a", first.clone()).is_none());
        assert!(registry.insert("b", tile(&dom, "b")).is_none());

        let previous = registry.insert("a", tile(&dom, "second")).expect("replaced");
        assert!(previous.ptr_eq(&first));
        assert_eq!(registry.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_unregisters() {
        let dom: DomRef = Rc::new(MemoryDom::new());
        let mut registry = ChildRegistry::new();
        registry.insert("a", tile(&dom, "a"));
        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn attach_skips_keys_without_slot() {
        let memory = Rc::new(MemoryDom::new());
        let dom: DomRef = memory.clone();
        let host = memory.create_root("app");
        let mut registry = ChildRegistry::new();
        let present = tile(&dom, "present");
        let absent = tile(&dom, "absent");
        registry.insert("present", present.clone());
        registry.insert("absent", absent.clone());

        let mounts = dom.replace_content(host, &crate::slot("present").into());
        registry.attach(dom.as_ref(), &mounts);

        assert_eq!(present.phase(), Phase::Mounted);
        assert_eq!(absent.phase(), Phase::Constructed);
        assert!(memory.contains(host, present.root()));
        assert_eq!(memory.text_content(host), "present");
    }
}
