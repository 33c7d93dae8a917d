//! Monitor state machine.
//!
//! # States
//! - MonitoringPrimary: ticks probe the primary while it is preferred
//! - Suspended: ticks do nothing; entered only when the monitor is stopped
//!
//! # State Transitions
//! ```text
//! MonitoringPrimary → Suspended: stop() / shutdown signal
//! ```

/// Monitor state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    MonitoringPrimary = 0,
    Suspended = 1,
}

impl From<u8> for MonitorState {
    fn from(val: u8) -> Self {
        match val {
            0 => MonitorState::MonitoringPrimary,
            _ => MonitorState::Suspended,
        }
    }
}
