//! Mock VRUC OAuth 2.0 identity provider
//!
//! Provides:
//! - Authorization code issuance (`/authorize`)
//! - Code exchange for signed bearer tokens (`/token`)
//! - Canned user and profile data (`/apis/oauth2/v1/user`, `/apis/oauth2/v1/profile`)
//! - RFC 8414 metadata discovery
//! - A driver that runs the whole flow against a live server ([`flow`])

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod flow;
pub mod oauth;
pub mod storage;
pub mod user;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use jsonwebtoken::EncodingKey;
use tower_http::trace::TraceLayer;

use crate::clock::Clock;
use crate::config::Config;
use crate::storage::{generate_random_string, Storage};
use crate::user::FakeUser;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
    pub user: FakeUser,
    pub clock: Arc<dyn Clock>,
    pub public_url: String,
    signing_key: EncodingKey,
}

impl AppState {
    pub fn new(
        config: Config,
        user: FakeUser,
        clock: Arc<dyn Clock>,
        public_url: impl Into<String>,
    ) -> Self {
        let secret = match &config.signing_secret {
            Some(secret) => secret.clone(),
            None => generate_random_string(32),
        };

        Self {
            signing_key: EncodingKey::from_secret(secret.as_bytes()),
            config,
            storage: Storage::new(),
            user,
            clock,
            public_url: public_url.into(),
        }
    }

    pub fn signing_key(&self) -> &EncodingKey {
        &self.signing_key
    }
}

/// Build the provider's router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // OAuth metadata (RFC 8414)
        .route(
            "/.well-known/oauth-authorization-server",
            get(oauth::metadata::handler),
        )
        .route("/authorize", get(oauth::authorize::handler))
        .route("/token", post(oauth::token::handler))
        // Protected resources
        .route("/apis/oauth2/v1/user", get(api::user_handler))
        .route("/apis/oauth2/v1/profile", get(api::profile_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
