//! PennedPost blog client core.
//!
//! Two interchangeable backend providers behind one pair of facades, a
//! selector that picks between them on every request, and a background
//! monitor that moves the persisted preference to the fallback when the
//! primary stops answering.

pub mod config;
pub mod store;
pub mod backend;
pub mod facade;
pub mod provider;
pub mod health;
pub mod lifecycle;
pub mod observability;

pub use backend::BackendKind;
pub use config::BlogConfig;
pub use facade::{AuthFacade, ContentFacade, Envelope, Post, PostDraft, User};
pub use lifecycle::{build_runtime, Runtime, Shutdown};
pub use provider::ProviderSelector;
