//! Application error types

use prepdesk_domain::{ApiResponse, DomainError, StatusCode};
use thiserror::Error;

use crate::ports::HttpClientError;

/// Errors surfaced by calls against the backend API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request was rejected with 401 and could not be recovered.
    #[error("unauthorized")]
    Unauthorized {
        /// The 401 response.
        response: ApiResponse,
    },

    /// The server answered with a non-success status other than 401.
    #[error("server responded with {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body as text.
        body: String,
    },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(#[from] HttpClientError),

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),
}

impl ApiError {
    /// Converts a non-success response into the matching error.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for 401 and `Status` for any other non-2xx.
    pub fn check(response: ApiResponse) -> ApiResult<ApiResponse> {
        if response.status.is_success() {
            Ok(response)
        } else if response.status.is_unauthorized() {
            Err(Self::Unauthorized { response })
        } else {
            Err(Self::Status {
                status: response.status,
                body: response.text(),
            })
        }
    }

    /// Returns the HTTP status, if the error carries one.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { response } => Some(response.status),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for 401 errors.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Response bodies that fail to deserialize. Request bodies are encoded in
/// the domain and surface as `InvalidRequest`.
impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Result type alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
