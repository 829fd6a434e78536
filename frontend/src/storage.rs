use thiserror::Error;
use web_sys::{window, Storage};

#[derive(Debug, Error, PartialEq)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("storage rejected the write: {0}")]
    Rejected(String),
}

/// Minimal string key-value store. Browser code uses [`LocalStore`];
/// tests inject an in-memory map.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`, looked up on every call so a store that appears
/// late (or never, e.g. in locked-down private windows) is handled per access.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Result<Storage, StorageError> {
        window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage().ok()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
pub use memory::MemoryStore;


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn memory_store_round_trips_and_removes() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a"), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a"), Some("1".to_string()));
        store.remove("a").unwrap();
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn rc_store_shares_entries() {
        let store = Rc::new(MemoryStore::new());
        let other = Rc::clone(&store);
        other.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".to_string()));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn read_only_store_rejects_writes() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        assert!(matches!(store.set("a", "1"), Err(StorageError::Rejected(_))));
        assert_eq!(store.writes(), 0);
    }
}
