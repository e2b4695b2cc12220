use axum::http::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Instant;

use crate::error::RelayError;
use crate::metrics::{UPSTREAM_FAILURES_TOTAL, UPSTREAM_LATENCY};
use crate::models::OutboundRequest;

// Status and JSON payload exactly as the upstream returned them
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

// One POST to the chat-completions endpoint. Any HTTP status counts as a
// completed round-trip; only transport failures and non-JSON bodies are errors.
pub async fn forward(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    request: &OutboundRequest,
) -> Result<UpstreamResponse, RelayError> {
    let start_time = Instant::now();

    let result = send(client, url, api_key, request).await;
    UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

    match &result {
        Ok(res) => tracing::debug!(
            status = res.status.as_u16(),
            model = %request.model,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Upstream responded"
        ),
        Err(_) => UPSTREAM_FAILURES_TOTAL.inc(),
    }

    result
}

async fn send(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    request: &OutboundRequest,
) -> Result<UpstreamResponse, RelayError> {
    let res = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {}", api_key))
        .json(request)
        .send()
        .await?;

    // reqwest and axum share the same http crate
    let status = res.status();
    let body = res.json::<Value>().await?;

    Ok(UpstreamResponse { status, body })
}
