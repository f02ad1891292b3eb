//! Uniform failure payload returned to callers.

use serde::{Deserialize, Serialize};

use nearby_eats_lib::Error as LibError;

/// Message carried by every internal failure response.
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// Failure response body: `{ "message": ..., "error": ... }`.
///
/// `error` holds the caller-safe description of what went wrong. Upstream
/// response bodies never appear here; they are only logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Create an internal-error body with the given detail.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            message: INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
            error: Some(detail.into()),
        }
    }
}

impl From<&LibError> for ErrorBody {
    fn from(err: &LibError) -> Self {
        Self::internal(err.public_message())
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => write!(f, "{}", self.message),
        }
    }
}
