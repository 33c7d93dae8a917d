//! Backend change notifications.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::backend::BackendKind;

/// Something changed the persisted backend preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BackendEvent {
    /// The monitor gave up on the primary.
    AutomaticDowngrade {
        from: BackendKind,
        to: BackendKind,
        consecutive_failures: usize,
    },
    /// The user picked a backend in settings.
    ManualSwitch { from: BackendKind, to: BackendKind },
}

/// Fan-out channel for [`BackendEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BackendEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BackendEvent> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. Having none is fine.
    pub fn publish(&self, event: BackendEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        tracing::trace!(delivered, "Backend event published");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
