//! Simulated backend providers.
//!
//! # Data Flow
//! ```text
//! Facade call on SimulatedBackend (simulated.rs)
//!     → link.rs (latency, reachability: the would-be network hop)
//!     → datastore.rs (users, sessions, posts owned by that provider)
//!     → Envelope back to the caller
//! ```
//!
//! # Design Decisions
//! - Primary and Fallback are two instances of one implementation
//! - They differ only in identifier namespace, endpoint and link
//! - Each provider owns its data; nothing is shared between them

pub mod datastore;
pub mod link;
pub mod simulated;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use datastore::Datastore;
pub use link::SimulatedLink;
pub use simulated::SimulatedBackend;

/// Which of the two providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Primary,
    Fallback,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Primary => "primary",
            BackendKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend: {0}")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    /// Accepts the current names and the provider names stored by older clients.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "supabase" => Ok(BackendKind::Primary),
            "fallback" | "mongodb" => Ok(BackendKind::Fallback),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}
