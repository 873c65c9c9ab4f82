//! vruc-flow: runs the authorization code flow against a running vruc-mock
//! and prints what each step returned.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vruc_mock::flow::{http_client, run_flow, FlowOptions};

#[derive(Parser, Debug)]
#[command(name = "vruc-flow")]
#[command(about = "Exercise the mock VRUC OAuth 2.0 flow end to end")]
struct Args {
    /// Base URL of the mock server
    #[arg(long, default_value = "http://localhost:8000", env = "VRUC_BASE_URL")]
    base_url: String,

    #[arg(long, default_value = vruc_mock::config::DEFAULT_CLIENT_ID, env = "VRUC_CLIENT_ID")]
    client_id: String,

    #[arg(long, default_value = vruc_mock::config::DEFAULT_CLIENT_SECRET, env = "VRUC_CLIENT_SECRET")]
    client_secret: String,

    #[arg(long, default_value = "http://localhost:3000/auth/callback/vruc", env = "VRUC_REDIRECT_URI")]
    redirect_uri: String,

    #[arg(long, default_value = "userinfo profile", env = "VRUC_SCOPE")]
    scope: String,

    #[arg(long, default_value = "test_state", env = "VRUC_STATE")]
    state: String,

    /// Seconds to wait before the first request, to let the server come up
    #[arg(long, default_value_t = 0)]
    wait: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vruc_mock=info")),
        )
        .init();

    let args = Args::parse();
    let options = FlowOptions {
        base_url: args.base_url,
        client_id: args.client_id,
        client_secret: args.client_secret,
        redirect_uri: args.redirect_uri,
        scope: args.scope,
        state: args.state,
    };

    println!("Starting VRUC OAuth 2.0 flow against {}", options.base_url);
    if args.wait > 0 {
        tokio::time::sleep(Duration::from_secs(args.wait)).await;
    }

    let client = http_client()?;
    let report = run_flow(&client, &options).await?;

    println!("Redirected to: {}", report.redirect_location);
    println!("Authorization Code: {}", report.code);
    println!("State: {}", report.returned_state);
    println!("Access Token: {}", report.token.access_token);
    println!(
        "Token Response: {}",
        serde_json::to_string_pretty(&report.token)?
    );
    println!("User Info: {}", serde_json::to_string_pretty(&report.user)?);
    println!(
        "Profile Info: {}",
        serde_json::to_string_pretty(&report.profile)?
    );
    println!("VRUC OAuth 2.0 flow completed successfully");

    Ok(())
}
