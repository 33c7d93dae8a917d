//! In-memory store.

use dashmap::DashMap;

use crate::store::{KeyValueStore, StoreResult};

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get("authToken").is_none());

        store.set("authToken", "abc").unwrap();
        assert_eq!(store.get("authToken").as_deref(), Some("abc"));

        store.set("authToken", "def").unwrap();
        assert_eq!(store.get("authToken").as_deref(), Some("def"));
        assert_eq!(store.len(), 1);

        store.remove("authToken").unwrap();
        store.remove("authToken").unwrap();
        assert!(store.is_empty());
    }
}
