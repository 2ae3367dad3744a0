//! `window.sessionStorage` as a [`Storage`] port.

use marsview_core::Storage;
use web_sys::Window;

use crate::error::js_message;

/// Session-scoped browser storage.
///
/// When the browser refuses access (private mode, sandboxed frames) every
/// read misses and every write is dropped.
#[derive(Debug, Clone)]
pub struct SessionStorage(Option<web_sys::Storage>);

impl SessionStorage {
    /// Opens the session storage of `window`.
    #[must_use]
    pub fn new(window: &Window) -> Self {
        match window.session_storage() {
            Ok(storage) => Self(storage),
            Err(error) => {
                tracing::warn!(error = %js_message(&error), "session storage unavailable");
                Self(None)
            }
        }
    }
}

impl Storage for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.0
            && let Err(error) = storage.set_item(key, value)
        {
            tracing::warn!(key, error = %js_message(&error), "storage write failed");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.0
            && let Err(error) = storage.remove_item(key)
        {
            tracing::warn!(key, error = %js_message(&error), "storage remove failed");
        }
    }
}
