//! Protected user endpoints
//!
//! Both endpoints take `Authorization: Bearer <token>` and check the token
//! against the stored expiry. The signed `exp` claim is not re-verified.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};

use crate::error::OAuthError;
use crate::storage::{LookupError, StoredToken};
use crate::user::{FakeUser, UserSummary};
use crate::AppState;

/// Handler for `GET /apis/oauth2/v1/user`
///
/// Returns the basic identity regardless of scope.
pub async fn user_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserSummary>, OAuthError> {
    authenticate(&state, &headers)?;
    Ok(Json(state.user.summary()))
}

/// Handler for `GET /apis/oauth2/v1/profile`
///
/// Requires "profile" somewhere in the token's scope string.
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<FakeUser>, OAuthError> {
    let token = authenticate(&state, &headers)?;

    // Plain substring match, not scope-token parsing
    if !token.scope.contains("profile") {
        tracing::debug!("Token scope {:?} lacks profile", token.scope);
        return Err(OAuthError::InsufficientScope);
    }

    Ok(Json(state.user.clone()))
}

/// Resolve the request's bearer token to its stored record
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<StoredToken, OAuthError> {
    let token = bearer_token(headers).ok_or_else(|| {
        tracing::debug!("Missing or malformed Authorization header");
        OAuthError::InvalidToken("Invalid authorization header".to_string())
    })?;

    state
        .storage
        .validate_token(token, state.clock.now())
        .map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            match e {
                LookupError::Missing => {
                    OAuthError::InvalidToken("Invalid or expired token".to_string())
                }
                LookupError::Expired => OAuthError::InvalidToken("Token expired".to_string()),
            }
        })
}

/// The first space-separated segment after `Bearer `
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let rest = value.strip_prefix("Bearer ")?;
    rest.split(' ').next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn test_bearer_token_takes_first_segment() {
        assert_eq!(bearer_token(&headers_with("Bearer abc extra")), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("bearer abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_bearer_token_empty() {
        // "Bearer " with nothing after it yields an empty token, which is then unknown
        assert_eq!(bearer_token(&headers_with("Bearer ")), Some(""));
    }
}
