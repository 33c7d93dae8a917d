//! Availability monitor.
//!
//! # Responsibilities
//! - Periodically probe the primary while it is the preferred backend
//! - Downgrade the persisted preference to Fallback once the primary is unreachable
//! - Announce the downgrade (log, metric, event)

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::backend::BackendKind;
use crate::config::AvailabilityConfig;
use crate::health::events::{BackendEvent, EventBus};
use crate::health::probe::LivenessProbe;
use crate::health::state::MonitorState;
use crate::observability::metrics;
use crate::provider::{load_preference, save_preference};
use crate::store::KeyValueStore;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Monitor is stopped.
    Suspended,
    /// Preference is already Fallback; nothing to check.
    Skipped,
    /// Primary answered.
    Healthy,
    /// Primary missed, but not often enough to act yet.
    Degraded { consecutive_failures: usize },
    /// Preference was switched to Fallback.
    Downgraded,
}

pub struct AvailabilityMonitor {
    store: Arc<dyn KeyValueStore>,
    probe: Arc<dyn LivenessProbe>,
    events: EventBus,
    config: AvailabilityConfig,
    state: AtomicU8,
    consecutive_failures: AtomicUsize,
}

impl AvailabilityMonitor {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        probe: Arc<dyn LivenessProbe>,
        events: EventBus,
        config: AvailabilityConfig,
    ) -> Self {
        Self {
            store,
            probe,
            events,
            config,
            state: AtomicU8::new(MonitorState::MonitoringPrimary as u8),
            consecutive_failures: AtomicUsize::new(0),
        }
    }

    pub fn state(&self) -> MonitorState {
        MonitorState::from(self.state.load(Ordering::Relaxed))
    }

    /// Enter Suspended. Later ticks are no-ops.
    pub fn stop(&self) {
        let prev = self.state.swap(MonitorState::Suspended as u8, Ordering::Relaxed);
        if MonitorState::from(prev) != MonitorState::Suspended {
            tracing::info!("Availability monitor suspended");
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval_secs)
    }

    /// Tick every `interval_secs` until `shutdown` fires. The first tick comes
    /// one full interval after start.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Availability monitor disabled");
            self.stop();
            return;
        }

        let period = self.interval();
        tracing::info!(
            interval_secs = self.config.interval_secs,
            unhealthy_threshold = self.config.unhealthy_threshold,
            "Availability monitor starting"
        );

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.tick().await == TickOutcome::Suspended {
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Availability monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
        self.stop();
    }

    /// Run one check.
    pub async fn tick(&self) -> TickOutcome {
        if self.state() == MonitorState::Suspended {
            return TickOutcome::Suspended;
        }

        if load_preference(self.store.as_ref()) == BackendKind::Fallback {
            self.consecutive_failures.store(0, Ordering::Relaxed);
            return TickOutcome::Skipped;
        }

        let reachable = self.probe.probe().await;
        metrics::record_primary_reachable(reachable);

        if reachable {
            let prev = self.consecutive_failures.swap(0, Ordering::Relaxed);
            if prev > 0 {
                tracing::info!(missed = prev, "Primary backend reachable again");
            }
            return TickOutcome::Healthy;
        }

        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        let threshold = self.config.unhealthy_threshold.max(1) as usize;
        if failures < threshold {
            tracing::warn!(consecutive_failures = failures, threshold, "Primary backend probe failed");
            return TickOutcome::Degraded { consecutive_failures: failures };
        }

        if let Err(e) = save_preference(self.store.as_ref(), BackendKind::Fallback) {
            tracing::error!(error = %e, "Failed to persist fallback preference");
            return TickOutcome::Degraded { consecutive_failures: failures };
        }

        self.consecutive_failures.store(0, Ordering::Relaxed);
        tracing::warn!(
            consecutive_failures = failures,
            "Primary backend is not available, switched to fallback backend"
        );
        metrics::record_downgrade(BackendKind::Primary, BackendKind::Fallback);
        self.events.publish(BackendEvent::AutomaticDowngrade {
            from: BackendKind::Primary,
            to: BackendKind::Fallback,
            consecutive_failures: failures,
        });
        TickOutcome::Downgraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::StaticProbe;
    use crate::store::MemoryStore;

    fn monitor(threshold: u32) -> (Arc<AvailabilityMonitor>, Arc<StaticProbe>, Arc<MemoryStore>, EventBus) {
        let store = Arc::new(MemoryStore::new());
        let probe = Arc::new(StaticProbe::new(true));
        let events = EventBus::default();
        let config = AvailabilityConfig {
            unhealthy_threshold: threshold,
            ..Default::default()
        };
        let monitor = AvailabilityMonitor::new(store.clone(), probe.clone(), events.clone(), config);
        (Arc::new(monitor), probe, store, events)
    }

    #[tokio::test]
    async fn test_single_failure_downgrades() {
        let (monitor, probe, store, events) = monitor(1);
        let mut rx = events.subscribe();

        assert_eq!(monitor.tick().await, TickOutcome::Healthy);
        assert_eq!(load_preference(store.as_ref()), BackendKind::Primary);

        probe.set(false);
        assert_eq!(monitor.tick().await, TickOutcome::Downgraded);
        assert_eq!(load_preference(store.as_ref()), BackendKind::Fallback);
        assert!(matches!(rx.recv().await.unwrap(), BackendEvent::AutomaticDowngrade { consecutive_failures: 1, .. }));
    }

    #[tokio::test]
    async fn test_never_upgrades() {
        let (monitor, probe, store, _) = monitor(1);
        probe.set(false);
        monitor.tick().await;

        probe.set(true);
        for _ in 0..3 {
            assert_eq!(monitor.tick().await, TickOutcome::Skipped);
        }
        assert_eq!(load_preference(store.as_ref()), BackendKind::Fallback);
    }

    #[tokio::test]
    async fn test_threshold_requires_consecutive_failures() {
        let (monitor, probe, store, _) = monitor(3);
        probe.set(false);
        assert_eq!(monitor.tick().await, TickOutcome::Degraded { consecutive_failures: 1 });
        assert_eq!(monitor.tick().await, TickOutcome::Degraded { consecutive_failures: 2 });

        // A success in between resets the count.
        probe.set(true);
        assert_eq!(monitor.tick().await, TickOutcome::Healthy);
        probe.set(false);
        assert_eq!(monitor.tick().await, TickOutcome::Degraded { consecutive_failures: 1 });
        assert_eq!(monitor.tick().await, TickOutcome::Degraded { consecutive_failures: 2 });
        assert_eq!(load_preference(store.as_ref()), BackendKind::Primary);
        assert_eq!(monitor.tick().await, TickOutcome::Downgraded);
    }

    #[tokio::test]
    async fn test_stopped_monitor_does_nothing() {
        let (monitor, probe, store, _) = monitor(1);
        monitor.stop();
        probe.set(false);
        assert_eq!(monitor.tick().await, TickOutcome::Suspended);
        assert_eq!(load_preference(store.as_ref()), BackendKind::Primary);
        assert_eq!(monitor.state(), MonitorState::Suspended);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_ticks_on_interval_and_stops() {
        let (monitor, probe, store, _) = monitor(1);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        probe.set(false);

        let task = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.run(shutdown_rx).await })
        };

        // Nothing happens before the first full interval.
        time::sleep(Duration::from_secs(29)).await;
        assert_eq!(load_preference(store.as_ref()), BackendKind::Primary);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(load_preference(store.as_ref()), BackendKind::Fallback);
        assert_eq!(monitor.state(), MonitorState::MonitoringPrimary);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
        assert_eq!(monitor.state(), MonitorState::Suspended);
    }

    #[tokio::test]
    async fn test_disabled_monitor_returns_immediately() {
        let store = Arc::new(MemoryStore::new());
        let config = AvailabilityConfig {
            enabled: false,
            ..Default::default()
        };
        let monitor = AvailabilityMonitor::new(store, Arc::new(StaticProbe::new(false)), EventBus::default(), config);
        let (_tx, rx) = broadcast::channel(1);
        monitor.run(rx).await;
        assert_eq!(monitor.state(), MonitorState::Suspended);
    }
}
