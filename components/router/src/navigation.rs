//! The navigation port.
//!
//! A [`Navigation`] exposes the current location as a path, accepts new
//! paths and notifies subscribers when the location changes. Notifications
//! are always delivered later, from the event loop, never from inside
//! [`Navigation::write`].

use alloc::{format, rc::Rc, string::String, vec::Vec};
use core::{cell::RefCell, fmt, mem};

/// Callback invoked when the location changes.
pub type NavigationListener = Rc<dyn Fn()>;

/// Registration handle returned by [`Navigation::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl Subscription {
    /// Wraps an implementation-defined identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Read/write access to the navigation location.
pub trait Navigation {
    /// Returns the current path, such as `/photo/42`. Empty when the
    /// location carries no path.
    fn read(&self) -> String;

    /// Moves to `path`. Writing the current path again notifies nobody.
    fn write(&self, path: &str);

    /// Registers `listener` for location changes.
    fn subscribe(&self, listener: NavigationListener) -> Subscription;

    /// Removes the listener registered under `subscription`.
    fn unsubscribe(&self, subscription: Subscription);
}

/// Shared handle to a [`Navigation`] implementation.
pub type NavigationRef = Rc<dyn Navigation>;

/// Builds the `href` of a link pointing at `path`.
///
/// ```
/// assert_eq!(marsview_router::href("/photo/42"), "#/photo/42");
/// assert_eq!(marsview_router::href("photo/42"), "#/photo/42");
/// ```
#[must_use]
pub fn href(path: &str) -> String {
    if path.starts_with('/') {
        format!("#{path}")
    } else {
        format!("#/{path}")
    }
}

/// Cloneable handle pages use to request navigation.
#[derive(Clone)]
pub struct Navigator(NavigationRef);

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Navigator").field(&self.0.read()).finish()
    }
}

impl Navigator {
    /// Wraps a navigation port.
    #[must_use]
    pub const fn new(navigation: NavigationRef) -> Self {
        Self(navigation)
    }

    /// Requests navigation to `path`. The page swap happens when the change
    /// notification is delivered.
    pub fn navigate(&self, path: &str) {
        tracing::debug!(path, "navigate");
        self.0.write(path);
    }

    /// Returns the current path.
    #[must_use]
    pub fn current(&self) -> String {
        self.0.read()
    }
}

struct MemoryState {
    path: String,
    history: Vec<String>,
    listeners: Vec<(u64, NavigationListener)>,
    next_id: u64,
    pending: usize,
}

/// A [`Navigation`] living in memory.
///
/// Change notifications queue up until [`MemoryNavigation::flush`] runs,
/// which plays the part of the browser event loop.
pub struct MemoryNavigation {
    state: RefCell<MemoryState>,
}

impl fmt::Debug for MemoryNavigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryNavigation")
            .field("path", &state.path)
            .field("listeners", &state.listeners.len())
            .field("pending", &state.pending)
            .finish()
    }
}

impl Default for MemoryNavigation {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryNavigation {
    /// Starts at `path`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            state: RefCell::new(MemoryState {
                path: path.into(),
                history: Vec::new(),
                listeners: Vec::new(),
                next_id: 0,
                pending: 0,
            }),
        }
    }

    /// Delivers queued change notifications, including the ones raised by
    /// listeners while flushing. Returns how many were delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let listeners: Vec<NavigationListener> = {
                let mut state = self.state.borrow_mut();
                if state.pending == 0 {
                    break;
                }
                state.pending -= 1;
                state.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
            };
            for listener in listeners {
                listener();
            }
            delivered += 1;
        }
        delivered
    }

    /// Notifications waiting for [`MemoryNavigation::flush`].
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.borrow().pending
    }

    /// Every path written so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl Navigation for MemoryNavigation {
    fn read(&self) -> String {
        self.state.borrow().path.clone()
    }

    fn write(&self, path: &str) {
        let mut state = self.state.borrow_mut();
        if state.path == path {
            return;
        }
        let previous = mem::replace(&mut state.path, path.into());
        state.history.push(previous);
        state.pending += 1;
    }

    fn subscribe(&self, listener: NavigationListener) -> Subscription {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.listeners.push((id, listener));
        Subscription::new(id)
    }

    fn unsubscribe(&self, subscription: Subscription) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|(id, _)| *id != subscription.id());
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    #[test]
    fn write_is_delivered_on_flush_only() {
        let navigation = MemoryNavigation::new("/");
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        navigation.subscribe(Rc::new(move || counter.set(counter.get() + 1)));

        navigation.write("/photo/1");
        assert_eq!(hits.get(), 0);
        assert_eq!(navigation.read(), "/photo/1");

        assert_eq!(navigation.flush(), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn writing_current_path_is_silent() {
        let navigation = MemoryNavigation::new("/a");
        navigation.write("/a");
        assert_eq!(navigation.pending(), 0);
        assert!(navigation.history().is_empty());
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let navigation = MemoryNavigation::default();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let subscription = navigation.subscribe(Rc::new(move || counter.set(counter.get() + 1)));
        navigation.unsubscribe(subscription);

        navigation.write("/b");
        navigation.flush();
        assert_eq!(hits.get(), 0);
        assert_eq!(navigation.listener_count(), 0);
    }

    #[test]
    fn navigator_writes_through() {
        let navigation = Rc::new(MemoryNavigation::new("/"));
        let navigator = Navigator::new(navigation.clone());
        navigator.navigate("/photo/7");
        assert_eq!(navigator.current(), "/photo/7");
        assert_eq!(navigation.history(), ["/"]);
    }
}
