//! Failure taxonomy for facade operations.
//!
//! None of these cross the facade boundary as values: every operation turns
//! them into the `error` string of an [`Envelope`](crate::facade::Envelope).

use crate::backend::BackendKind;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    /// Caller-supplied input rejected before touching the backend.
    #[error("{0}")]
    Validation(String),

    /// Operation needs an active session credential.
    #[error("Authentication required")]
    AuthRequired,

    /// No credential is stored.
    #[error("No authenticated user")]
    NotAuthenticated,

    /// The stored credential belongs to the other provider.
    #[error("Session was issued by the {0} backend")]
    ForeignSession(BackendKind),

    /// Email/password pair does not match.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already registered.
    #[error("User already exists")]
    Conflict,

    /// Lookup miss.
    #[error("{0}")]
    NotFound(String),

    /// The provider could not be reached.
    #[error("{0} backend is unreachable")]
    BackendUnavailable(BackendKind),

    /// Anything else.
    #[error("{0}")]
    Unknown(String),
}

impl FacadeError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FacadeError::Validation(_) => "validation",
            FacadeError::AuthRequired
            | FacadeError::NotAuthenticated
            | FacadeError::ForeignSession(_)
            | FacadeError::InvalidCredentials => "auth",
            FacadeError::Conflict => "conflict",
            FacadeError::NotFound(_) => "not_found",
            FacadeError::BackendUnavailable(_) => "unavailable",
            FacadeError::Unknown(_) => "unknown",
        }
    }
}

impl From<StoreError> for FacadeError {
    fn from(e: StoreError) -> Self {
        FacadeError::Unknown(e.to_string())
    }
}

pub type FacadeResult<T> = Result<T, FacadeError>;
