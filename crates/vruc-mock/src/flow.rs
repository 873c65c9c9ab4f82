//! End-to-end driver for the authorization code flow
//!
//! Runs the same sequence a real client application would: authorize,
//! exchange the code, then fetch user info and profile with the token.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::config::{DEFAULT_CLIENT_ID, DEFAULT_CLIENT_SECRET};
use crate::oauth::token::TokenResponse;
use crate::user::{FakeUser, UserSummary};

/// Parameters for one run of the flow
#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub state: String,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            redirect_uri: "http://localhost:3000/auth/callback/vruc".to_string(),
            scope: "userinfo profile".to_string(),
            state: "test_state".to_string(),
        }
    }
}

/// Everything the flow collected along the way
#[derive(Debug, Clone)]
pub struct FlowReport {
    pub redirect_location: String,
    pub code: String,
    /// `state` as echoed back in the redirect
    pub returned_state: String,
    pub token: TokenResponse,
    pub user: UserSummary,
    pub profile: FakeUser,
}

/// A client that never follows redirects, so the authorize step can read `Location`
pub fn http_client() -> Result<Client> {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Failed to build HTTP client")
}

/// Run the four requests in order. Fails on the first step that does not succeed.
pub async fn run_flow(client: &Client, options: &FlowOptions) -> Result<FlowReport> {
    let base_url = options.base_url.trim_end_matches('/');

    // Step 1: authorization code
    tracing::info!("Step 1: Requesting authorization code");
    let response = client
        .get(format!("{base_url}/authorize"))
        .query(&[
            ("client_id", options.client_id.as_str()),
            ("response_type", "code"),
            ("scope", options.scope.as_str()),
            ("redirect_uri", options.redirect_uri.as_str()),
            ("state", options.state.as_str()),
        ])
        .send()
        .await
        .context("authorize request failed")?;
    if response.status() != StatusCode::TEMPORARY_REDIRECT {
        return Err(step_failure("authorize", response).await);
    }
    let redirect_location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| anyhow!("authorize response has no Location header"))?
        .to_string();
    let (code, returned_state) = parse_redirect(&redirect_location)?;
    tracing::info!("Redirected to {}", redirect_location);
    tracing::info!("Authorization code: {}", code);

    // Step 2: exchange
    tracing::info!("Step 2: Exchanging code for access token");
    let response = client
        .post(format!("{base_url}/token"))
        .form(&[
            ("client_id", options.client_id.as_str()),
            ("client_secret", options.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
        ])
        .send()
        .await
        .context("token request failed")?;
    if response.status() != StatusCode::OK {
        return Err(step_failure("token", response).await);
    }
    let token: TokenResponse = response
        .json()
        .await
        .context("token response is not valid JSON")?;

    tracing::info!(
        "Token response: {}",
        serde_json::to_string(&token).unwrap_or_default()
    );

    let (user, profile) = fetch_resources(client, base_url, &token.access_token)
        .await
        .with_context(|| {
            format!(
                "flow stopped after code {} was exchanged for access token {}",
                code, token.access_token
            )
        })?;

    Ok(FlowReport {
        redirect_location,
        code,
        returned_state,
        token,
        user,
        profile,
    })
}

/// Steps 3 and 4: user info, then profile
async fn fetch_resources(
    client: &Client,
    base_url: &str,
    access_token: &str,
) -> Result<(UserSummary, FakeUser)> {
    // Step 3: user info
    tracing::info!("Step 3: Fetching user info");
    let response = client
        .get(format!("{base_url}/apis/oauth2/v1/user"))
        .bearer_auth(access_token)
        .send()
        .await
        .context("user request failed")?;
    if response.status() != StatusCode::OK {
        return Err(step_failure("user", response).await);
    }
    let user: UserSummary = response.json().await.context("user response is not valid JSON")?;
    tracing::info!(
        "User info: {}",
        serde_json::to_string(&user).unwrap_or_default()
    );

    // Step 4: profile
    tracing::info!("Step 4: Fetching profile info");
    let response = client
        .get(format!("{base_url}/apis/oauth2/v1/profile"))
        .bearer_auth(access_token)
        .send()
        .await
        .context("profile request failed")?;
    if response.status() != StatusCode::OK {
        return Err(step_failure("profile", response).await);
    }
    let profile: FakeUser = response
        .json()
        .await
        .context("profile response is not valid JSON")?;

    tracing::info!(
        "Profile info: {}",
        serde_json::to_string(&profile).unwrap_or_default()
    );

    Ok((user, profile))
}

/// Pull `code` and `state` out of the authorize redirect
fn parse_redirect(location: &str) -> Result<(String, String)> {
    let url = Url::parse(location)
        .with_context(|| format!("redirect location is not a URL: {location}"))?;

    let mut code = None;
    let mut state = String::new();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = value.into_owned(),
            "error" => bail!("authorization denied: {value}"),
            _ => {}
        }
    }

    let code = code.ok_or_else(|| anyhow!("no code found in redirect URL {location}"))?;
    Ok((code, state))
}

async fn step_failure(step: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    anyhow!("{step} step failed: {status} - {body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redirect_code_and_state() {
        let (code, state) =
            parse_redirect("http://localhost:3000/auth/callback/vruc?code=abc-_1&state=test_state")
                .unwrap();
        assert_eq!(code, "abc-_1");
        assert_eq!(state, "test_state");
    }

    #[test]
    fn test_parse_redirect_error() {
        let err = parse_redirect("http://localhost:3000/cb?error=access_denied&state=x").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn test_parse_redirect_without_code() {
        assert!(parse_redirect("http://localhost:3000/cb?state=x").is_err());
    }

    #[test]
    fn test_default_options() {
        let options = FlowOptions::default();
        assert_eq!(options.client_id, "vruc_test_client");
        assert_eq!(options.scope, "userinfo profile");
        assert_eq!(options.state, "test_state");
    }
}
