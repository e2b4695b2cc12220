use std::sync::Arc;

use crate::auth::SharedSecret;
use crate::config::{Config, OPENROUTER_URL, RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW};
use crate::rate_limit::RateLimiter;

// app's shared state, built once at startup
pub struct AppState {
    pub client: reqwest::Client,
    pub upstream_url: String,
    pub upstream_key: String,
    pub secret: SharedSecret,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream_url: OPENROUTER_URL.to_string(),
            upstream_key: config.upstream_key().to_string(),
            secret: SharedSecret::new(config.proxy_secret.as_deref()),
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW)),
        }
    }

    // Point the relay at another chat-completions endpoint
    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Arc::new(limiter);
        self
    }
}
