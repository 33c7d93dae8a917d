//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the client store and each provider's datastore
//! - Build links, probe, providers, selector and monitor in dependency order
//! - Hand everything back as one [`Runtime`]

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::backend::{BackendKind, Datastore, SimulatedBackend, SimulatedLink};
use crate::config::{BlogConfig, ProbeKind, ProviderConfig};
use crate::health::{AvailabilityMonitor, EventBus, HttpProbe, LivenessProbe};
use crate::lifecycle::Shutdown;
use crate::provider::{ProviderHandles, ProviderSelector};
use crate::store::{FileStore, KeyValueStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to open {what} at {path}: {source}")]
    Store {
        what: &'static str,
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("http probe requires availability.probe.url")]
    MissingProbeUrl,

    #[error("failed to build http probe: {0}")]
    Probe(#[from] reqwest::Error),
}

/// Every long-lived component, wired together.
pub struct Runtime {
    pub config: BlogConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub primary: Arc<SimulatedBackend>,
    pub fallback: Arc<SimulatedBackend>,
    pub selector: Arc<ProviderSelector>,
    pub monitor: Arc<AvailabilityMonitor>,
    pub events: EventBus,
}

impl Runtime {
    /// Run the monitor in the background until `shutdown` fires.
    pub fn spawn_monitor(&self, shutdown: &Shutdown) -> JoinHandle<()> {
        let monitor = self.monitor.clone();
        let rx = shutdown.subscribe();
        tokio::spawn(async move { monitor.run(rx).await })
    }
}

/// Build the runtime with the file store named in the config.
pub fn build_runtime(config: BlogConfig) -> Result<Runtime, StartupError> {
    let store = FileStore::open(&config.store.path).map_err(|source| StartupError::Store {
        what: "client state",
        path: config.store.path.clone(),
        source,
    })?;
    build_runtime_with_store(config, Arc::new(store))
}

/// Build the runtime around an existing client store.
pub fn build_runtime_with_store(
    config: BlogConfig,
    store: Arc<dyn KeyValueStore>,
) -> Result<Runtime, StartupError> {
    let latency = Duration::from_millis(config.simulation.latency_ms);
    let jitter = config.simulation.jitter_ms;

    let primary_link = Arc::new(SimulatedLink::new(BackendKind::Primary, latency, jitter));
    primary_link.set_reachable(config.simulation.primary_reachable);
    let fallback_link = Arc::new(SimulatedLink::new(BackendKind::Fallback, latency, jitter));

    let primary = Arc::new(
        SimulatedBackend::new(
            BackendKind::Primary,
            &config.backends.primary,
            primary_link.clone(),
            open_datastore(&config.backends.primary)?,
            store.clone(),
        )
        .with_excerpt_length(config.content.excerpt_length),
    );
    let fallback = Arc::new(
        SimulatedBackend::new(
            BackendKind::Fallback,
            &config.backends.fallback,
            fallback_link,
            open_datastore(&config.backends.fallback)?,
            store.clone(),
        )
        .with_excerpt_length(config.content.excerpt_length),
    );

    let probe: Arc<dyn LivenessProbe> = match config.availability.probe.kind {
        ProbeKind::Simulated => primary_link,
        ProbeKind::Http => {
            let url = config
                .availability
                .probe
                .url
                .clone()
                .ok_or(StartupError::MissingProbeUrl)?;
            let timeout = Duration::from_secs(config.availability.probe.timeout_secs);
            Arc::new(HttpProbe::new(url, timeout)?)
        }
    };

    let events = EventBus::default();
    let selector = Arc::new(ProviderSelector::new(
        store.clone(),
        probe.clone(),
        ProviderHandles::from_backend(primary.clone()),
        ProviderHandles::from_backend(fallback.clone()),
        events.clone(),
    ));
    let monitor = Arc::new(AvailabilityMonitor::new(
        store.clone(),
        probe,
        events.clone(),
        config.availability.clone(),
    ));

    tracing::info!(
        primary = %config.backends.primary.name,
        fallback = %config.backends.fallback.name,
        probe = ?config.availability.probe.kind,
        "Runtime initialized"
    );

    Ok(Runtime {
        config,
        store,
        primary,
        fallback,
        selector,
        monitor,
        events,
    })
}

fn open_datastore(provider: &ProviderConfig) -> Result<Arc<Datastore>, StartupError> {
    let datastore = match &provider.data_path {
        Some(path) => Datastore::open(path).map_err(|source| StartupError::Store {
            what: "backend data",
            path: path.clone(),
            source,
        })?,
        None => Datastore::new(),
    };
    Ok(Arc::new(datastore))
}
