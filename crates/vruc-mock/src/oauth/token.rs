//! OAuth 2.0 Token Endpoint
//!
//! Exchanges an authorization code for a signed bearer token.

use std::sync::Arc;

use axum::{extract::State, Form, Json};
use jsonwebtoken::{encode, Algorithm, Header};
use serde::{Deserialize, Serialize};

use crate::error::OAuthError;
use crate::storage::{LookupError, StoredToken};
use crate::AppState;

/// Token request (form-encoded)
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
    /// Only "authorization_code" is supported
    pub grant_type: String,
    pub code: String,
}

/// Successful token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub uid: String,
    pub token_type: String,
    pub scope: String,
}

/// Claims carried by the signed access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub scope: String,
    /// Unix timestamp
    pub exp: i64,
}

/// Handler for `POST /token`
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, OAuthError> {
    if !state
        .config
        .client_matches(&request.client_id, &request.client_secret)
    {
        tracing::warn!("Rejected token request for client {}", request.client_id);
        return Err(OAuthError::InvalidClient);
    }

    if request.grant_type != "authorization_code" {
        tracing::debug!("Unsupported grant_type {}", request.grant_type);
        return Err(OAuthError::UnsupportedGrantType);
    }

    let now = state.clock.now();
    let auth_code = state
        .storage
        .consume_auth_code(&request.code, now)
        .map_err(|e| match e {
            LookupError::Missing => OAuthError::InvalidGrant("load authorize not found".to_string()),
            LookupError::Expired => OAuthError::InvalidGrant("Code expired".to_string()),
        })?;

    let lifetime = state.config.access_token_lifetime();
    let expires_in = lifetime.num_seconds() as u64;
    let expires_at = now + lifetime;
    let uid = state.user.uid.clone();

    let claims = AccessTokenClaims {
        sub: uid.clone(),
        scope: auth_code.scope.clone(),
        exp: expires_at.timestamp(),
    };
    let access_token = encode(&Header::new(Algorithm::HS256), &claims, state.signing_key())
        .map_err(|e| {
            tracing::error!("Failed to sign access token: {}", e);
            OAuthError::Server("Failed to generate token".to_string())
        })?;

    state.storage.store_token(
        &access_token,
        StoredToken {
            uid: uid.clone(),
            scope: auth_code.scope.clone(),
            expires_at,
        },
    );

    tracing::info!(
        "Issued access token for client {} (uid: {}, scope: {})",
        auth_code.client_id,
        uid,
        auth_code.scope
    );

    Ok(Json(TokenResponse {
        access_token,
        expires_in,
        uid,
        token_type: "Bearer".to_string(),
        scope: auth_code.scope,
    }))
}
