use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

// Failures produced by the relay itself. Upstream error statuses are not
// represented here: they are forwarded as-is.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("no prompt/messages provided")]
    MissingContent,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("rate limit exceeded, retry in {}s", .retry_after.as_secs())]
    RateLimited {
        retry_after: Duration,
        reset_at: DateTime<Utc>,
    },

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingContent | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        match self {
            Self::Unauthorized | Self::MissingContent => {
                (status, Json(json!({ "error": message }))).into_response()
            }
            Self::InvalidBody(details) => (
                status,
                Json(json!({ "error": "invalid_body", "details": details })),
            )
                .into_response(),
            Self::RateLimited {
                retry_after,
                reset_at,
            } => {
                let secs = retry_after.as_secs().max(1);
                let mut response = (
                    status,
                    Json(json!({
                        "error": "too_many_requests",
                        "retry_after_secs": secs,
                        "reset_at": reset_at.to_rfc3339(),
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            Self::Upstream(err) => {
                tracing::error!(error = ?err, "Upstream call failed");
                (
                    status,
                    Json(json!({ "error": "internal_error", "details": message })),
                )
                    .into_response()
            }
        }
    }
}
