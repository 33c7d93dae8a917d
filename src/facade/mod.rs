//! Service facades.
//!
//! # Data Flow
//! ```text
//! UI / CLI
//!     → provider::ProviderSelector::auth() / content()
//!     → Arc<dyn AuthFacade> / Arc<dyn ContentFacade>
//!     → operation runs against the bound provider
//!     → Envelope<T> (success / data / error)
//! ```
//!
//! # Design Decisions
//! - One contract, two implementations; callers never learn which one
//! - Failures become the Envelope's error string, nothing else escapes
//! - A facade stays bound to its provider even if the preference changes

pub mod envelope;
pub mod error;
pub mod excerpt;
pub mod session;
pub mod types;

use async_trait::async_trait;

use crate::backend::BackendKind;

pub use envelope::Envelope;
pub use error::{FacadeError, FacadeResult};
pub use excerpt::derive_excerpt;
pub use session::SessionCredential;
pub use types::{Post, PostDraft, User};

/// Authentication capability.
#[async_trait]
pub trait AuthFacade: Send + Sync {
    /// Provider backing this facade.
    fn backend(&self) -> BackendKind;

    /// Sign in and store a session credential.
    ///
    /// The email is trimmed and matched case-insensitively. The returned user
    /// carries the email as it was first registered, which can differ from
    /// `email` in case and surrounding whitespace.
    async fn login(&self, email: &str, password: &str) -> Envelope<User>;

    /// Create an identity and sign it in. Name and email are stored trimmed.
    async fn register(&self, name: &str, email: &str, password: &str) -> Envelope<User>;

    /// Drop the session credential.
    async fn logout(&self) -> Envelope<()>;

    /// The user behind the stored credential.
    async fn get_current_user(&self) -> Envelope<User>;
}

/// Post capability.
#[async_trait]
pub trait ContentFacade: Send + Sync {
    /// Provider backing this facade.
    fn backend(&self) -> BackendKind;

    async fn get_all_posts(&self) -> Envelope<Vec<Post>>;

    async fn get_post_by_id(&self, id: &str) -> Envelope<Post>;

    /// Requires a session.
    async fn create_post(&self, draft: PostDraft) -> Envelope<Post>;

    /// Requires a session. Replaces every draft-controlled field.
    async fn update_post(&self, id: &str, draft: PostDraft) -> Envelope<Post>;

    /// Requires a session. Succeeds whether or not `id` exists.
    async fn delete_post(&self, id: &str) -> Envelope<()>;
}
