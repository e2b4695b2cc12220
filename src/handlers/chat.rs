use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;

use crate::error::RelayError;
use crate::metrics::CHAT_REQUESTS_TOTAL;
use crate::models::InboundRequest;
use crate::state::AppState;
use crate::upstream;

fn parse_body(body: &[u8]) -> Result<InboundRequest, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InboundRequest::default());
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|e| RelayError::InvalidBody(e.to_string()))?;
    // derived struct impls would also accept a JSON array
    if !value.is_object() {
        return Err(RelayError::InvalidBody("expected a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| RelayError::InvalidBody(e.to_string()))
}

// POST /api/chat
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    CHAT_REQUESTS_TOTAL.inc();

    // auth comes before anything in the body is looked at
    if !state.secret.verify_headers(&headers) {
        return Err(RelayError::Unauthorized);
    }

    let outbound = parse_body(&body)?
        .into_outbound()
        .ok_or(RelayError::MissingContent)?;

    let upstream = upstream::forward(
        &state.client,
        &state.upstream_url,
        &state.upstream_key,
        &outbound,
    )
    .await?;

    Ok((upstream.status, Json(upstream.body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reads_as_empty_object() {
        let request = parse_body(b"").unwrap();
        assert!(request.into_outbound().is_none());

        let request = parse_body(b"  \n").unwrap();
        assert!(request.into_outbound().is_none());
    }

    #[test]
    fn malformed_json_is_invalid_body() {
        assert!(matches!(
            parse_body(b"{not json"),
            Err(RelayError::InvalidBody(_))
        ));
    }

    #[test]
    fn non_object_json_is_invalid_body() {
        assert!(matches!(
            parse_body(b"[1, 2, 3]"),
            Err(RelayError::InvalidBody(_))
        ));
        assert!(matches!(parse_body(b"\"hi\""), Err(RelayError::InvalidBody(_))));
    }
}
