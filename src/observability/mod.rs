//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (backend, operation, ...)
//!     → metrics.rs (facade call counters, downgrade counter, liveness gauge)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, plain or JSON)
//!     → Prometheus scrape endpoint (daemon only, optional)
//! ```
//!
//! # Design Decisions
//! - Metrics go through the `metrics` facade; without an installed recorder they cost nothing
//! - Log level comes from RUST_LOG first, config second

pub mod logging;
pub mod metrics;
