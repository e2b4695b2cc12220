use clap::Parser; // for cli
use std::sync::Arc;

use openrouter_relay::config::{Config, RATE_LIMIT_SWEEP_INTERVAL};
use openrouter_relay::rate_limit::sweeper;
use openrouter_relay::{AppState, serve};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // parse flags / environment
    let config = Config::parse();

    // keep running without the key; the upstream will reject our calls
    if config.openrouter_api_key.is_none() {
        tracing::error!("Missing OPENROUTER_API_KEY");
    }
    if config.proxy_secret.is_none() {
        tracing::warn!("PROXY_SECRET is not set, every /api/chat call will be rejected");
    }

    let state = Arc::new(AppState::new(&config));

    // spawn the background sweeper
    tokio::spawn(sweeper(
        Arc::clone(&state.rate_limiter),
        RATE_LIMIT_SWEEP_INTERVAL,
    ));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    tracing::info!(
        port = config.port,
        upstream = %state.upstream_url,
        rate_limit = state.rate_limiter.limit(),
        rate_window_secs = state.rate_limiter.window().as_secs(),
        "Proxy listening"
    );

    if let Err(e) = serve(listener, state).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
