//! RFC 8414: OAuth 2.0 Authorization Server Metadata
//!
//! Provides the `/.well-known/oauth-authorization-server` endpoint that clients
//! use to discover the mock's endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// OAuth 2.0 Authorization Server Metadata (RFC 8414)
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizationServerMetadata {
    /// The authorization server's issuer identifier (URL)
    pub issuer: String,

    /// URL of the authorization endpoint
    pub authorization_endpoint: String,

    /// URL of the token endpoint
    pub token_endpoint: String,

    /// URL of the basic user info endpoint
    pub userinfo_endpoint: String,

    pub response_types_supported: Vec<String>,

    pub grant_types_supported: Vec<String>,

    /// Client credentials are sent as form fields
    pub token_endpoint_auth_methods_supported: Vec<String>,

    pub scopes_supported: Vec<String>,
}

/// Handler for `GET /.well-known/oauth-authorization-server`
pub async fn handler(State(state): State<Arc<AppState>>) -> Json<AuthorizationServerMetadata> {
    let base_url = state.public_url.trim_end_matches('/');

    let metadata = AuthorizationServerMetadata {
        issuer: base_url.to_string(),
        authorization_endpoint: format!("{}/authorize", base_url),
        token_endpoint: format!("{}/token", base_url),
        userinfo_endpoint: format!("{}/apis/oauth2/v1/user", base_url),
        response_types_supported: vec!["code".to_string()],
        grant_types_supported: vec!["authorization_code".to_string()],
        token_endpoint_auth_methods_supported: vec!["client_secret_post".to_string()],
        scopes_supported: vec!["userinfo".to_string(), "profile".to_string()],
    };

    tracing::debug!("Serving authorization server metadata");
    Json(metadata)
}
