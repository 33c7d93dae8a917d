//! Liveness probes for the primary provider.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use crate::backend::SimulatedLink;

/// "Is the primary reachable right now?"
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self) -> bool;
}

#[async_trait]
impl LivenessProbe for SimulatedLink {
    async fn probe(&self) -> bool {
        self.transmit("probe").await.is_ok()
    }
}

/// Probes an HTTP health endpoint; any 2xx within the timeout counts as reachable.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent("pennedpost-health-check")
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn probe(&self) -> bool {
        let request = self.client.get(&self.url).send();

        match time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(url = %self.url, status = %response.status(), "Liveness probe failed: non-success status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(url = %self.url, error = %e, "Liveness probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(url = %self.url, "Liveness probe failed: timeout");
                false
            }
        }
    }
}

/// A probe whose answer is set by hand (offline mode, tests).
#[derive(Debug)]
pub struct StaticProbe {
    reachable: AtomicBool,
}

impl StaticProbe {
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: AtomicBool::new(reachable),
        }
    }

    pub fn set(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Relaxed);
    }
}

#[async_trait]
impl LivenessProbe for StaticProbe {
    async fn probe(&self) -> bool {
        self.reachable.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendKind;

    #[tokio::test]
    async fn test_static_probe() {
        let probe = StaticProbe::new(true);
        assert!(probe.probe().await);
        probe.set(false);
        assert!(!probe.probe().await);
    }

    #[tokio::test]
    async fn test_link_probe_tracks_reachability() {
        let link = SimulatedLink::instant(BackendKind::Primary);
        assert!(link.probe().await);
        link.set_reachable(false);
        assert!(!link.probe().await);
    }

    #[tokio::test]
    async fn test_http_probe_connection_refused() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpProbe::new(format!("http://{}/health", addr), Duration::from_secs(2)).unwrap();
        assert!(!probe.probe().await);
    }
}
