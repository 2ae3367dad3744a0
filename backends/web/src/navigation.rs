//! `location.hash` as a [`Navigation`] port.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use marsview_router::{Navigation, NavigationListener, Subscription};
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::Window;

use crate::error::js_message;

type Listeners = Rc<RefCell<Vec<(u64, NavigationListener)>>>;

/// Navigation backed by the URL fragment. Paths are stored as `#/path`.
///
/// One `hashchange` handler is installed on the window for the lifetime of
/// this value and fans out to the subscribed listeners.
pub struct HashNavigation {
    window: Window,
    listeners: Listeners,
    next_id: Cell<u64>,
    on_change: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl fmt::Debug for HashNavigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashNavigation")
            .field("path", &self.read())
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

impl HashNavigation {
    /// Follows the fragment of `window`'s location.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            listeners: Rc::default(),
            next_id: Cell::new(0),
            on_change: RefCell::new(None),
        }
    }

    fn install(&self) {
        if self.on_change.borrow().is_some() {
            return;
        }
        let listeners = Rc::clone(&self.listeners);
        let callback = Closure::<dyn FnMut()>::new(move || {
            let snapshot: Vec<NavigationListener> = listeners
                .borrow()
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            for listener in snapshot {
                listener();
            }
        });
        match self
            .window
            .add_event_listener_with_callback("hashchange", callback.as_ref().unchecked_ref())
        {
            Ok(()) => *self.on_change.borrow_mut() = Some(callback),
            Err(error) => tracing::error!(error = %js_message(&error), "hashchange listener not installed"),
        }
    }
}

impl Navigation for HashNavigation {
    fn read(&self) -> String {
        let hash = self.window.location().hash().unwrap_or_default();
        hash.strip_prefix('#').unwrap_or(&hash).to_owned()
    }

    fn write(&self, path: &str) {
        if let Err(error) = self.window.location().set_hash(path) {
            tracing::warn!(path, error = %js_message(&error), "navigation failed");
        }
    }

    fn subscribe(&self, listener: NavigationListener) -> Subscription {
        self.install();
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));
        Subscription::new(id)
    }

    fn unsubscribe(&self, subscription: Subscription) {
        self.listeners
            .borrow_mut()
            .retain(|(id, _)| *id != subscription.id());
    }
}

impl Drop for HashNavigation {
    fn drop(&mut self) {
        if let Some(callback) = self.on_change.get_mut().take()
            && let Err(error) = self
                .window
                .remove_event_listener_with_callback("hashchange", callback.as_ref().unchecked_ref())
        {
            tracing::warn!(error = %js_message(&error), "hashchange listener not removed");
        }
    }
}
