//! Persisted client state.
//!
//! # Data Flow
//! ```text
//! Selector / Monitor / Facades
//!     → KeyValueStore::get/set/remove
//!         - memory.rs (ephemeral, tests)
//!         - file.rs (write-through JSON file, survives restarts)
//! ```
//!
//! # Design Decisions
//! - The store is injected everywhere, never reached through globals
//! - Values are plain strings; last write wins
//! - Writes are synchronous so a facade's side effect is visible on return

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Persisted backend preference.
pub const BACKEND_TYPE_KEY: &str = "backendType";
/// Opaque session token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Backend that issued the session token.
pub const AUTH_BACKEND_KEY: &str = "authBackend";

/// Errors raised by store writes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value state shared by every subsystem.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}
