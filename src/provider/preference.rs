//! Persisted backend preference.

use crate::backend::BackendKind;
use crate::store::{KeyValueStore, StoreResult, BACKEND_TYPE_KEY};

/// Current preference. Unset or unreadable values mean Primary.
pub fn load_preference(store: &dyn KeyValueStore) -> BackendKind {
    match store.get(BACKEND_TYPE_KEY) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable backend preference");
            BackendKind::Primary
        }),
        None => BackendKind::Primary,
    }
}

/// Overwrite the preference.
pub fn save_preference(store: &dyn KeyValueStore, kind: BackendKind) -> StoreResult<()> {
    store.set(BACKEND_TYPE_KEY, kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_defaults_to_primary() {
        let store = MemoryStore::new();
        assert_eq!(load_preference(&store), BackendKind::Primary);

        store.set(BACKEND_TYPE_KEY, "garbage").unwrap();
        assert_eq!(load_preference(&store), BackendKind::Primary);
    }

    #[test]
    fn test_legacy_values() {
        let store = MemoryStore::new();
        store.set(BACKEND_TYPE_KEY, "mongodb").unwrap();
        assert_eq!(load_preference(&store), BackendKind::Fallback);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save_preference(&store, BackendKind::Fallback).unwrap();
        assert_eq!(store.get(BACKEND_TYPE_KEY).as_deref(), Some("fallback"));
        assert_eq!(load_preference(&store), BackendKind::Fallback);
    }
}
