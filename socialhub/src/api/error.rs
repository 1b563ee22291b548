use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single remote call
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Any non-success status without a dedicated variant
    #[error("API error: {0}")]
    Api(String),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build the error for a non-success response body.
    ///
    /// HTML bodies (proxy and gateway pages) are replaced with a short
    /// message naming the status code.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let detail = if body.contains("<html>") || body.contains("<!DOCTYPE") {
            format!("Server returned {} error. Please check the server URL.", status.as_u16())
        } else {
            body
        };

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(detail),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(detail),
            _ => ApiError::Api(detail),
        }
    }

    /// Server-provided detail text, for the status variants that carry one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Api(detail)
            | ApiError::NotFound(detail)
            | ApiError::Unauthorized(detail)
            | ApiError::BadRequest(detail) => Some(detail),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }
}
