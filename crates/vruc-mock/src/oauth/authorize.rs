//! OAuth 2.0 Authorization Endpoint
//!
//! Auto-approves every well-formed request from the configured client.
//! There is no redirect URI allow-list: the caller's `redirect_uri` is trusted.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::storage::{generate_random_string, StoredAuthCode};
use crate::AppState;

/// Authorization request parameters
#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    /// The client identifier
    pub client_id: String,

    /// Must be "code" for authorization code flow
    pub response_type: String,

    /// Requested scopes, stored verbatim with the code
    pub scope: String,

    /// Where to send the user back to
    pub redirect_uri: String,

    /// Client state (passed through to redirect)
    #[serde(default)]
    pub state: Option<String>,

    /// Cosmetic: which school's login page to show
    #[serde(default = "default_school_code")]
    pub school_code: String,

    /// Cosmetic: login page theme
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_school_code() -> String {
    "ruc".to_string()
}

fn default_theme() -> String {
    "schools".to_string()
}

/// Handler for `GET /authorize`
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthorizeRequest>,
) -> Redirect {
    let client_state = params.state.as_deref().unwrap_or("");

    if params.client_id != state.config.client_id {
        tracing::warn!("Rejected authorization for unknown client {}", params.client_id);
        return redirect_with(
            &params.redirect_uri,
            &[("error", "access_denied"), ("state", client_state)],
        );
    }

    if params.response_type != "code" {
        tracing::debug!("Unsupported response_type {}", params.response_type);
        return redirect_with(
            &params.redirect_uri,
            &[("error", "unsupported_response_type"), ("state", client_state)],
        );
    }

    let code = generate_random_string(16);
    let expires_at = state.clock.now() + state.config.code_lifetime();

    state.storage.store_auth_code(
        &code,
        StoredAuthCode {
            client_id: params.client_id.clone(),
            redirect_uri: params.redirect_uri.clone(),
            scope: params.scope.clone(),
            expires_at,
        },
    );

    tracing::info!(
        school_code = %params.school_code,
        theme = %params.theme,
        "Issued authorization code for client {} (scope: {})",
        params.client_id,
        params.scope
    );

    redirect_with(
        &params.redirect_uri,
        &[("code", code.as_str()), ("state", client_state)],
    )
}

/// 307 redirect to `redirect_uri` with `params` appended to its query
fn redirect_with(redirect_uri: &str, params: &[(&str, &str)]) -> Redirect {
    Redirect::temporary(&append_query(redirect_uri, params))
}

fn append_query(redirect_uri: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let separator = if redirect_uri.contains('?') { '&' } else { '?' };
    format!("{}{separator}{query}", escape_header_unsafe(redirect_uri))
}

/// Percent-encode bytes a `Location` header cannot carry (controls, space, non-ASCII).
/// Everything else, including existing `%XX` escapes, passes through untouched.
fn escape_header_unsafe(uri: &str) -> String {
    let mut out = String::with_capacity(uri.len());
    for byte in uri.bytes() {
        if byte.is_ascii_graphic() {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_query_plain_uri() {
        let url = append_query(
            "http://localhost:3000/auth/callback/vruc",
            &[("code", "abc"), ("state", "test_state")],
        );
        assert_eq!(
            url,
            "http://localhost:3000/auth/callback/vruc?code=abc&state=test_state"
        );
    }

    #[test]
    fn test_append_query_existing_query() {
        let url = append_query("http://app/cb?next=home", &[("error", "access_denied"), ("state", "")]);
        assert_eq!(url, "http://app/cb?next=home&error=access_denied&state=");
    }

    #[test]
    fn test_append_query_escapes_control_bytes() {
        let url = append_query("http://a/cb\r\nX-Injected:1", &[("state", "s")]);
        assert_eq!(url, "http://a/cb%0D%0AX-Injected:1?state=s");
    }

    #[test]
    fn test_append_query_escapes_non_ascii() {
        let url = append_query("http://a/回调 x", &[("state", "s")]);
        assert_eq!(url, "http://a/%E5%9B%9E%E8%B0%83%20x?state=s");
    }

    #[test]
    fn test_append_query_encodes_state() {
        let url = append_query("http://app/cb", &[("state", "a b&c")]);
        assert_eq!(url, "http://app/cb?state=a+b%26c");
    }
}
