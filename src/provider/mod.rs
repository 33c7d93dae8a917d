//! Provider selection.
//!
//! # Data Flow
//! ```text
//! Caller asks for a facade
//!     → preference.rs (persisted backendType, default Primary)
//!     → LivenessProbe (is Primary reachable now?)
//!     → selector.rs: Primary iff preferred AND reachable, else Fallback
//!     → Arc<dyn AuthFacade> / Arc<dyn ContentFacade> bound to that provider
//! ```
//!
//! # Design Decisions
//! - Decided fresh on every request; nothing is cached between resolutions
//! - Resolution cannot fail: Fallback is assumed to be available
//! - Explicit switches go through the selector so the session is cleared with them

pub mod preference;
pub mod selector;

pub use preference::{load_preference, save_preference};
pub use selector::{BackendDescriptor, Capability, Facade, ProviderHandles, ProviderSelector, SwitchError};
