pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod upstream;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub use config::Config;
pub use error::RelayError;
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use state::AppState;

use handlers::{chat_handler, health_handler, metrics_handler};

// Routes: /health and /metrics are never throttled, /api/chat sits behind
// the rate limiter and the body size cap.
pub fn router(state: Arc<AppState>) -> Router {
    let relay = Router::new()
        .route("/api/chat", post(chat_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            rate_limit::rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(config::BODY_LIMIT_BYTES));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(relay)
        .layer(middleware::from_fn(cors::cors_middleware))
        .with_state(state)
}

// Serve until the listener fails. Peer addresses are attached to each
// request so the rate limiter can key on them.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
