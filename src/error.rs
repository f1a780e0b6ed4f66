//! Error taxonomy shared by the gateway and the service operations.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::{PasswordError, TokenError};

/// Errors surfaced to callers.
///
/// Every variant carries a stable `kind()` and a caller-safe message.
/// `Internal` detail is logged, never returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Username is already taken
    AlreadyExists(String),
    /// Login failed; deliberately does not say whether the user exists
    InvalidCredentials,
    /// Missing, invalid, expired or superseded bearer token
    Unauthenticated(String),
    /// Request is missing a required field
    InvalidArgument(String),
    /// Requested resource does not exist
    NotFound(String),
    /// Hashing, signing or other server-side failure
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to show the caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists(msg) => write!(f, "{}", msg),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::Unauthenticated(msg) => write!(f, "{}", msg),
            Self::InvalidArgument(msg) => write!(f, "{}", msg),
            Self::NotFound(msg) => write!(f, "{}", msg),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => Self::Internal(msg),
            _ => Self::Unauthenticated("invalid token".to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(detail = %detail, "request failed with internal error");
        }

        let body = serde_json::json!({
            "error": {
                "kind": self.kind(),
                "message": self.public_message(),
            }
        });

        (self.status(), Json(body)).into_response()
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
