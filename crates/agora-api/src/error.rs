//! API error types.

use agora_access::{AccessError, OutcomeClass};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for every access verification failure.
pub const VERIFICATION_FAILED: &str = "An error occurred while verifying access";

/// API error.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request (400).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error (500).
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Timestamp.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            timestamp: chrono::Utc::now(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<AccessError> for ApiError {
    fn from(e: AccessError) -> Self {
        match e.class() {
            OutcomeClass::Authentication => Self::Unauthorized(e.to_string()),
            OutcomeClass::Authorization => Self::Forbidden(e.to_string()),
            OutcomeClass::NotFound => Self::NotFound(e.to_string()),
            // Policy structure never reaches the caller.
            OutcomeClass::Verification => Self::Internal(VERIFICATION_FAILED.to_string()),
        }
    }
}

impl From<agora_core::CoreError> for ApiError {
    fn from(e: agora_core::CoreError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_access::AuthFailure;
    use agora_core::{RoleLabel, UserKey};

    #[test]
    fn test_access_error_translation() {
        assert_eq!(
            ApiError::from(AccessError::from(AuthFailure::Expired)).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AccessError::NoMatchingRole { role: RoleLabel::User }).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AccessError::OwnershipDenied).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AccessError::TargetNotFound(UserKey::from("t1"))).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_verification_detail_is_hidden() {
        let err = ApiError::from(AccessError::EngineMisconfiguration(
            "no list of role alternatives was supplied".into(),
        ));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("alternatives"));
        assert!(err.to_string().contains(VERIFICATION_FAILED));

        let err = ApiError::from(AccessError::Directory("connection reset".into()));
        assert!(!err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_core_error_is_bad_request() {
        let err = ApiError::from(agora_core::CoreError::InvalidKey(String::new()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "BAD_REQUEST");
    }
}
