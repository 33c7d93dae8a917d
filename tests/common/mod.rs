//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use pennedpost::backend::{BackendKind, SimulatedBackend};
use pennedpost::health::{EventBus, StaticProbe};
use pennedpost::provider::{ProviderHandles, ProviderSelector};
use pennedpost::store::MemoryStore;

/// Start a mock health endpoint that always answers `status` with `body`.
/// Binds an ephemeral port and returns it.
pub async fn start_mock_backend(status: u16, body: &'static str) -> SocketAddr {
    start_programmable_backend(move || async move { (status, body.to_string()) }).await
}

/// Start a mock health endpoint whose response is computed per request.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    204 => "204 No Content",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    502 => "502 Bad Gateway",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
}

/// A selector over two in-memory providers sharing one client store.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub probe: Arc<StaticProbe>,
    pub primary: Arc<SimulatedBackend>,
    pub fallback: Arc<SimulatedBackend>,
    pub events: EventBus,
    pub selector: ProviderSelector,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let probe = Arc::new(StaticProbe::new(true));
    let primary = Arc::new(SimulatedBackend::in_memory(BackendKind::Primary, "supabase", store.clone()));
    let fallback = Arc::new(SimulatedBackend::in_memory(BackendKind::Fallback, "mongodb", store.clone()));
    let events = EventBus::default();
    let selector = ProviderSelector::new(
        store.clone(),
        probe.clone(),
        ProviderHandles::from_backend(primary.clone()),
        ProviderHandles::from_backend(fallback.clone()),
        events.clone(),
    );

    Harness {
        store,
        probe,
        primary,
        fallback,
        events,
        selector,
    }
}
