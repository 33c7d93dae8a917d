//! Uniform result wrapper.

use serde::{Deserialize, Serialize};

use crate::facade::error::FacadeError;

/// `{ success, data?, error? }` returned by every facade operation.
///
/// Operations without a payload use `Envelope<()>`; on success `data` is
/// `Some(())` and serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// `success` with no `data` is a broken contract, not a valid state.
    pub fn is_contract_violation(&self) -> bool {
        self.success && self.data.is_none()
    }

    /// Collapse the envelope into a `Result`, flagging contract violations.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (true, None, _) => Err("contract violation: success without data".to_string()),
            (false, _, Some(error)) => Err(error),
            (false, _, None) => Err("Unknown error".to_string()),
        }
    }
}

impl<T> From<Result<T, FacadeError>> for Envelope<T> {
    fn from(result: Result<T, FacadeError>) -> Self {
        match result {
            Ok(data) => Envelope::ok(data),
            Err(e) => Envelope::err(e.to_string()),
        }
    }
}
