//! Simulated network hop to a provider.
//!
//! # Responsibilities
//! - Add configurable latency (+ jitter) to each remote call
//! - Fail calls while the link is marked unreachable (fault injection)

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::backend::BackendKind;
use crate::facade::FacadeError;

/// Transport state for one provider.
#[derive(Debug)]
pub struct SimulatedLink {
    kind: BackendKind,
    reachable: AtomicBool,
    latency: Duration,
    jitter_ms: u64,
}

impl SimulatedLink {
    pub fn new(kind: BackendKind, latency: Duration, jitter_ms: u64) -> Self {
        Self {
            kind,
            reachable: AtomicBool::new(true),
            latency,
            jitter_ms,
        }
    }

    /// A link with no delay.
    pub fn instant(kind: BackendKind) -> Self {
        Self::new(kind, Duration::ZERO, 0)
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Relaxed)
    }

    /// Flip reachability. Returns the previous value.
    pub fn set_reachable(&self, reachable: bool) -> bool {
        let prev = self.reachable.swap(reachable, Ordering::Relaxed);
        if prev != reachable {
            tracing::info!(backend = %self.kind, reachable, "Simulated link state changed");
        }
        prev
    }

    /// Delay for one round trip.
    fn round_trip(&self) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            fastrand::u64(0..=self.jitter_ms)
        } else {
            0
        };
        self.latency + Duration::from_millis(jitter)
    }

    /// Perform the network part of a remote call.
    pub async fn transmit(&self, operation: &'static str) -> Result<(), FacadeError> {
        let delay = self.round_trip();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.is_reachable() {
            Ok(())
        } else {
            tracing::debug!(backend = %self.kind, operation, "Remote call dropped: link down");
            Err(FacadeError::BackendUnavailable(self.kind))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transmit_follows_reachability() {
        let link = SimulatedLink::instant(BackendKind::Primary);
        assert!(link.transmit("login").await.is_ok());

        assert!(link.set_reachable(false));
        let err = link.transmit("login").await.unwrap_err();
        assert!(matches!(err, FacadeError::BackendUnavailable(BackendKind::Primary)));
        assert_eq!(err.to_string(), "primary backend is unreachable");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let link = SimulatedLink::new(BackendKind::Fallback, Duration::from_millis(200), 50);
        let start = tokio::time::Instant::now();
        link.transmit("get_all_posts").await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed <= Duration::from_millis(250));
    }
}
