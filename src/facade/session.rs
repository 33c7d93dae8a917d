//! Session credential persisted in the client store.

use crate::backend::BackendKind;
use crate::store::{KeyValueStore, StoreResult, AUTH_BACKEND_KEY, AUTH_TOKEN_KEY};

/// Opaque token plus the provider that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredential {
    pub token: String,
    pub issuer: BackendKind,
}

impl SessionCredential {
    /// Read the credential, if any.
    ///
    /// A token without a readable issuer is attributed to the primary, which is
    /// what clients that stored only `authToken` were talking to.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let token = store.get(AUTH_TOKEN_KEY)?;
        let issuer = store
            .get(AUTH_BACKEND_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        Some(Self { token, issuer })
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> StoreResult<()> {
        store.set(AUTH_TOKEN_KEY, &self.token)?;
        store.set(AUTH_BACKEND_KEY, self.issuer.as_str())
    }

    /// Remove whatever credential is stored.
    pub fn clear(store: &dyn KeyValueStore) -> StoreResult<()> {
        store.remove(AUTH_TOKEN_KEY)?;
        store.remove(AUTH_BACKEND_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_save_load_clear() {
        let store = MemoryStore::new();
        assert!(SessionCredential::load(&store).is_none());

        let cred = SessionCredential {
            token: "mongodb-token-1".into(),
            issuer: BackendKind::Fallback,
        };
        cred.save(&store).unwrap();
        assert_eq!(SessionCredential::load(&store), Some(cred));

        SessionCredential::clear(&store).unwrap();
        assert!(SessionCredential::load(&store).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_token_without_issuer_defaults_to_primary() {
        let store = MemoryStore::new();
        store.set(AUTH_TOKEN_KEY, "legacy").unwrap();
        assert_eq!(SessionCredential::load(&store).unwrap().issuer, BackendKind::Primary);
    }
}
