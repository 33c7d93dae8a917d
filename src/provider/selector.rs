//! Provider selector.
//!
//! # Responsibilities
//! - Pick Primary or Fallback for each facade request
//! - Describe the effective backend for settings screens
//! - Apply explicit backend switches

use std::sync::Arc;

use serde::Serialize;

use crate::backend::{BackendKind, SimulatedBackend};
use crate::facade::{AuthFacade, ContentFacade, SessionCredential};
use crate::health::{BackendEvent, EventBus, LivenessProbe};
use crate::provider::preference::{load_preference, save_preference};
use crate::store::{KeyValueStore, StoreError};

/// Which facade a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Auth,
    Content,
}

/// A resolved facade.
#[derive(Clone)]
pub enum Facade {
    Auth(Arc<dyn AuthFacade>),
    Content(Arc<dyn ContentFacade>),
}

impl Facade {
    pub fn backend(&self) -> BackendKind {
        match self {
            Facade::Auth(auth) => auth.backend(),
            Facade::Content(content) => content.backend(),
        }
    }
}

/// Where a provider lives, as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendDescriptor {
    pub kind: BackendKind,
    pub name: String,
    pub endpoint: String,
    pub has_api_key: bool,
}

/// Both facades of one provider.
#[derive(Clone)]
pub struct ProviderHandles {
    pub auth: Arc<dyn AuthFacade>,
    pub content: Arc<dyn ContentFacade>,
    pub descriptor: BackendDescriptor,
}

impl ProviderHandles {
    pub fn from_backend(backend: Arc<SimulatedBackend>) -> Self {
        let descriptor = BackendDescriptor {
            kind: backend.kind(),
            name: backend.namespace().to_string(),
            endpoint: backend.endpoint().to_string(),
            has_api_key: backend.api_key().is_some(),
        };
        Self {
            auth: backend.clone(),
            content: backend,
            descriptor,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    #[error("primary backend is currently not available")]
    PrimaryUnavailable,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Chooses the provider behind each facade request.
pub struct ProviderSelector {
    store: Arc<dyn KeyValueStore>,
    probe: Arc<dyn LivenessProbe>,
    primary: ProviderHandles,
    fallback: ProviderHandles,
    events: EventBus,
}

impl ProviderSelector {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        probe: Arc<dyn LivenessProbe>,
        primary: ProviderHandles,
        fallback: ProviderHandles,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            probe,
            primary,
            fallback,
            events,
        }
    }

    /// Persisted preference, without looking at liveness.
    pub fn preference(&self) -> BackendKind {
        load_preference(self.store.as_ref())
    }

    /// Primary only when it is preferred and reachable right now.
    pub async fn resolve_kind(&self) -> BackendKind {
        let preference = self.preference();
        if preference == BackendKind::Primary && self.probe.probe().await {
            BackendKind::Primary
        } else {
            if preference == BackendKind::Primary {
                tracing::debug!("Primary preferred but unreachable, resolving to fallback");
            }
            BackendKind::Fallback
        }
    }

    fn handles(&self, kind: BackendKind) -> &ProviderHandles {
        match kind {
            BackendKind::Primary => &self.primary,
            BackendKind::Fallback => &self.fallback,
        }
    }

    /// Resolve a facade for `capability`.
    pub async fn resolve(&self, capability: Capability) -> Facade {
        let handles = self.handles(self.resolve_kind().await);
        tracing::debug!(backend = %handles.descriptor.kind, ?capability, "Resolved facade");
        match capability {
            Capability::Auth => Facade::Auth(handles.auth.clone()),
            Capability::Content => Facade::Content(handles.content.clone()),
        }
    }

    pub async fn auth(&self) -> Arc<dyn AuthFacade> {
        self.handles(self.resolve_kind().await).auth.clone()
    }

    pub async fn content(&self) -> Arc<dyn ContentFacade> {
        self.handles(self.resolve_kind().await).content.clone()
    }

    /// The provider the next request would go to.
    pub async fn effective_backend(&self) -> BackendDescriptor {
        self.handles(self.resolve_kind().await).descriptor.clone()
    }

    pub fn descriptor(&self, kind: BackendKind) -> &BackendDescriptor {
        &self.handles(kind).descriptor
    }

    /// Is the primary reachable right now?
    pub async fn primary_reachable(&self) -> bool {
        self.probe.probe().await
    }

    /// Explicit user choice of backend.
    ///
    /// Switching to Primary is refused while it is unreachable. A real change
    /// signs the user out, since the stored session belongs to the old provider.
    /// Returns whether the preference changed.
    pub async fn switch_backend(&self, kind: BackendKind) -> Result<bool, SwitchError> {
        if kind == BackendKind::Primary && !self.probe.probe().await {
            tracing::warn!("Refusing switch to unreachable primary backend");
            return Err(SwitchError::PrimaryUnavailable);
        }

        let previous = self.preference();
        if previous == kind {
            save_preference(self.store.as_ref(), kind)?;
            return Ok(false);
        }

        // Sign out before the preference moves, so a failed sign-out leaves both untouched.
        SessionCredential::clear(self.store.as_ref())?;
        save_preference(self.store.as_ref(), kind)?;
        tracing::info!(from = %previous, to = %kind, "Backend switched by user");
        self.events.publish(BackendEvent::ManualSwitch { from: previous, to: kind });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::StaticProbe;
    use crate::store::{MemoryStore, StoreResult, AUTH_TOKEN_KEY};

    /// Accepts writes but fails every removal.
    struct StuckCredentialStore(MemoryStore);

    impl KeyValueStore for StuckCredentialStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            self.0.set(key, value)
        }

        fn remove(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::other("read-only")))
        }
    }

    fn selector(reachable: bool) -> (ProviderSelector, Arc<StaticProbe>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let probe = Arc::new(StaticProbe::new(reachable));
        let primary = Arc::new(SimulatedBackend::in_memory(BackendKind::Primary, "supabase", store.clone()));
        let fallback = Arc::new(SimulatedBackend::in_memory(BackendKind::Fallback, "mongodb", store.clone()));
        let selector = ProviderSelector::new(
            store.clone(),
            probe.clone(),
            ProviderHandles::from_backend(primary),
            ProviderHandles::from_backend(fallback),
            EventBus::default(),
        );
        (selector, probe, store)
    }

    #[tokio::test]
    async fn test_resolution_table() {
        let (selector, probe, store) = selector(true);
        assert_eq!(selector.resolve_kind().await, BackendKind::Primary);

        probe.set(false);
        assert_eq!(selector.resolve_kind().await, BackendKind::Fallback);

        save_preference(store.as_ref(), BackendKind::Fallback).unwrap();
        assert_eq!(selector.resolve_kind().await, BackendKind::Fallback);
        probe.set(true);
        assert_eq!(selector.resolve_kind().await, BackendKind::Fallback);
    }

    #[tokio::test]
    async fn test_resolve_by_capability() {
        let (selector, probe, _) = selector(true);
        let facade = selector.resolve(Capability::Content).await;
        assert!(matches!(facade, Facade::Content(_)));
        assert_eq!(facade.backend(), BackendKind::Primary);

        probe.set(false);
        assert_eq!(selector.resolve(Capability::Auth).await.backend(), BackendKind::Fallback);
    }

    #[tokio::test]
    async fn test_effective_backend_descriptor() {
        let (selector, probe, _) = selector(false);
        let descriptor = selector.effective_backend().await;
        assert_eq!(descriptor.kind, BackendKind::Fallback);
        assert_eq!(descriptor.name, "mongodb");

        probe.set(true);
        assert_eq!(selector.effective_backend().await.name, "supabase");
    }

    #[tokio::test]
    async fn test_switch_signs_out_and_notifies() {
        let (selector, _, store) = selector(true);
        let mut events = selector.events.subscribe();
        selector.auth().await.login("ada@example.com", "pw").await.into_result().unwrap();

        assert!(selector.switch_backend(BackendKind::Fallback).await.unwrap());
        assert!(store.get(AUTH_TOKEN_KEY).is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            BackendEvent::ManualSwitch { from: BackendKind::Primary, to: BackendKind::Fallback }
        );

        // Same choice again changes nothing.
        assert!(!selector.switch_backend(BackendKind::Fallback).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_sign_out_keeps_preference() {
        let store = Arc::new(StuckCredentialStore(MemoryStore::new()));
        let primary = Arc::new(SimulatedBackend::in_memory(BackendKind::Primary, "supabase", store.clone()));
        let fallback = Arc::new(SimulatedBackend::in_memory(BackendKind::Fallback, "mongodb", store.clone()));
        let selector = ProviderSelector::new(
            store.clone(),
            Arc::new(StaticProbe::new(true)),
            ProviderHandles::from_backend(primary),
            ProviderHandles::from_backend(fallback),
            EventBus::default(),
        );
        let mut events = selector.events.subscribe();

        let err = selector.switch_backend(BackendKind::Fallback).await.unwrap_err();
        assert!(matches!(err, SwitchError::Store(_)));
        assert_eq!(selector.preference(), BackendKind::Primary);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_switch_to_unreachable_primary_is_refused() {
        let (selector, probe, store) = selector(true);
        save_preference(store.as_ref(), BackendKind::Fallback).unwrap();
        probe.set(false);

        let err = selector.switch_backend(BackendKind::Primary).await.unwrap_err();
        assert!(matches!(err, SwitchError::PrimaryUnavailable));
        assert_eq!(selector.preference(), BackendKind::Fallback);
    }
}
