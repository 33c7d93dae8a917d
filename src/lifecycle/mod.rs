//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → client store → provider datastores & links → probe
//!     → selector → availability monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → monitor leaves its loop → Suspended
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: stores first, then providers, then selector and monitor
//! - Fail fast: any startup error is fatal
//! - Store writes are synchronous, so shutdown has nothing left to flush

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_runtime, Runtime, StartupError};
