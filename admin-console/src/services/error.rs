use crate::store::StoreError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered but reported a failure.
    #[error("{message}")]
    RequestFailed {
        status: Option<StatusCode>,
        message: String,
    },

    /// No response: connection failure or timeout.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Credentials were rejected and could not be refreshed. The token store
    /// has been cleared.
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Failed to encode request: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ApiError {
    pub fn request_failed(status: impl Into<Option<StatusCode>>, message: impl Into<String>) -> Self {
        ApiError::RequestFailed {
            status: status.into(),
            message: message.into(),
        }
    }

    /// HTTP status of a server-reported failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::RequestFailed { status, .. } => *status,
            ApiError::Network(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
