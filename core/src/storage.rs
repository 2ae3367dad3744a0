//! Key/value persistence port.
//!
//! Pages use it to stash a snapshot of their state across route changes.
//! The web backend persists into `sessionStorage`; [`MemoryStorage`] keeps
//! values for the lifetime of the process.

use alloc::{collections::BTreeMap, rc::Rc, string::String};
use core::cell::RefCell;

/// String key/value store.
pub trait Storage {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Removes the value stored under `key`.
    fn remove(&self, key: &str);

    /// Returns and removes the value stored under `key`.
    fn take(&self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        self.remove(key);
        Some(value)
    }
}

/// Shared handle to a [`Storage`] implementation.
pub type StorageRef = Rc<dyn Storage>;

/// A [`Storage`] living in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn take(&self, key: &str) -> Option<String> {
        self.entries.borrow_mut().remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_the_value() {
        let storage = MemoryStorage::new();
        storage.set("page", "{\"sol\":12}");
        assert_eq!(storage.take("page").as_deref(), Some("{\"sol\":12}"));
        assert_eq!(storage.take("page"), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn default_take_goes_through_get_and_remove() {
        struct Wrapped(MemoryStorage);

        impl Storage for Wrapped {
            fn get(&self, key: &str) -> Option<String> {
                self.0.get(key)
            }
            fn set(&self, key: &str, value: &str) {
                self.0.set(key, value);
            }
            fn remove(&self, key: &str) {
                self.0.remove(key);
            }
        }

        let storage = Wrapped(MemoryStorage::new());
        storage.set("a", "1");
        storage.set("b", "2");
        assert_eq!(storage.take("a").as_deref(), Some("1"));
        assert_eq!(storage.0.len(), 1);
    }
}
