//! Availability subsystem.
//!
//! # Data Flow
//! ```text
//! Availability monitor (monitor.rs):
//!     Periodic timer
//!     → read persisted preference
//!     → Primary? probe.rs (simulated link or HTTP)
//!     → unreachable for `unhealthy_threshold` ticks
//!     → preference := Fallback, events.rs publishes AutomaticDowngrade
//!
//! Monitor state (state.rs):
//!     MonitoringPrimary → Suspended (on shutdown only)
//! ```
//!
//! # Design Decisions
//! - Failover is one-directional; going back to Primary is a user decision
//! - A failed probe is never an error for anyone, it only changes future resolutions
//! - The selector uses the same probe, so both agree on what "reachable" means

pub mod events;
pub mod monitor;
pub mod probe;
pub mod state;

pub use events::{BackendEvent, EventBus};
pub use monitor::{AvailabilityMonitor, TickOutcome};
pub use probe::{HttpProbe, LivenessProbe, StaticProbe};
pub use state::MonitorState;
