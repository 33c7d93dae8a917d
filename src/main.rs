//! PennedPost availability daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   UI / pennedpost-cli                      persisted client state
//!          │                              (backendType, authToken, ...)
//!          ▼                                     ▲        ▲
//!  ┌────────────────┐   preference + probe       │        │
//!  │ ProviderSelector├───────────────────────────┘        │
//!  └───────┬────────┘                                     │
//!          │ Arc<dyn AuthFacade> / Arc<dyn ContentFacade> │
//!          ▼                                              │
//!  ┌───────────────┐      ┌────────────────┐              │
//!  │ Primary       │      │ Fallback       │              │
//!  │ (supabase)    │      │ (mongodb)      │              │
//!  └───────────────┘      └────────────────┘              │
//!                                                         │
//!  ┌──────────────────────────┐  every 30s: Primary       │
//!  │ AvailabilityMonitor      ├── unreachable? ───────────┘
//!  │ (this daemon)            │   preference := Fallback
//!  └──────────────────────────┘
//! ```
//!
//! The daemon owns the monitor; the CLI shares the same state files.

use std::path::PathBuf;

use clap::Parser;

use pennedpost::config::load_or_default;
use pennedpost::lifecycle::signals::wait_for_signal;
use pennedpost::lifecycle::{build_runtime, Shutdown};
use pennedpost::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "pennedpost")]
#[command(about = "Runs the PennedPost backend availability monitor", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("pennedpost v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        store = %config.store.path,
        interval_secs = config.availability.interval_secs,
        probe = ?config.availability.probe.kind,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let runtime = build_runtime(config)?;
    let mut events = runtime.events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(?event, "Backend event");
        }
    });

    let shutdown = Shutdown::new();
    let monitor = runtime.spawn_monitor(&shutdown);

    wait_for_signal().await;
    shutdown.trigger();
    monitor.await?;

    tracing::info!(preference = %runtime.selector.preference(), "Shutdown complete");
    Ok(())
}
