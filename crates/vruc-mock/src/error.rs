//! OAuth error responses
//!
//! Every rejection the endpoints produce is one of these. They render as
//! `{"error": ..., "error_description": ...}` with a matching status code.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthError {
    #[error("Invalid client credentials")]
    InvalidClient,

    #[error("Unsupported grant_type")]
    UnsupportedGrantType,

    /// Unknown, used or expired authorization code
    #[error("{0}")]
    InvalidGrant(String),

    /// Missing, unknown or expired bearer token
    #[error("{0}")]
    InvalidToken(String),

    #[error("Insufficient scope")]
    InsufficientScope,

    #[error("{0}")]
    Server(String),
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub error_description: String,
}

impl OAuthError {
    /// RFC 6749 / RFC 6750 error code
    pub fn code(&self) -> &'static str {
        match self {
            OAuthError::InvalidClient => "invalid_client",
            OAuthError::UnsupportedGrantType => "unsupported_grant_type",
            OAuthError::InvalidGrant(_) => "invalid_grant",
            OAuthError::InvalidToken(_) => "invalid_token",
            OAuthError::InsufficientScope => "insufficient_scope",
            OAuthError::Server(_) => "server_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            OAuthError::InvalidClient | OAuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            OAuthError::UnsupportedGrantType | OAuthError::InvalidGrant(_) => {
                StatusCode::BAD_REQUEST
            }
            OAuthError::InsufficientScope => StatusCode::FORBIDDEN,
            OAuthError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.code(),
            error_description: self.to_string(),
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(OAuthError::InvalidClient.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            OAuthError::UnsupportedGrantType.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OAuthError::InvalidGrant("Code expired".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OAuthError::InvalidToken("Token expired".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(OAuthError::InsufficientScope.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = OAuthError::InvalidToken("Token expired".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let response = OAuthError::InsufficientScope.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_description_is_display() {
        let err = OAuthError::InvalidGrant("load authorize not found".into());
        assert_eq!(err.code(), "invalid_grant");
        assert_eq!(err.to_string(), "load authorize not found");
    }
}
