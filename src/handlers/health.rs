use axum::{Json, response::IntoResponse};

// Liveness only: never touches the upstream or the rate limiter
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}
