use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, interval};

use crate::error::RelayError;
use crate::metrics::RATE_LIMITED_TOTAL;
use crate::state::AppState;

// Rate limit entry - tracks requests per client identity
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

// Fixed-window counter per identity
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // Count one request for `identity`. The entry guard holds the shard lock,
    // so the increment and the comparison cannot interleave with another
    // request from the same identity.
    pub fn check(&self, identity: &str) -> RateLimitDecision {
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(identity.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // window expired..? start a new one
        if now.duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count = entry.count.saturating_add(1);

        RateLimitDecision {
            allowed: entry.count <= self.limit,
            limit: self.limit,
            remaining: self.limit.saturating_sub(entry.count),
            reset_after: self
                .window
                .saturating_sub(now.duration_since(entry.window_start)),
        }
    }

    // Drop entries whose window has already elapsed
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        let window = self.window;
        self.entries
            .retain(|_, entry| entry.window_start.elapsed() < window);
        before.saturating_sub(self.entries.len())
    }

    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}

// Periodically evicts expired windows so one-off clients don't pile up
pub async fn sweeper(limiter: Arc<RateLimiter>, every: Duration) {
    let mut interval = interval(every);

    tracing::debug!(interval = ?every, "Rate limit sweeper started");

    loop {
        interval.tick().await;
        let removed = limiter.sweep();
        if removed > 0 {
            tracing::debug!(removed, remaining = limiter.tracked(), "Swept rate limit entries");
        }
    }
}

fn client_identity(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn insert_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let reset_secs = decision.reset_after.as_secs_f64().ceil() as u64;
    headers.insert("x-ratelimit-limit", HeaderValue::from(decision.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(reset_secs));
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let identity = client_identity(&request);
    let decision = state.rate_limiter.check(&identity);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        RATE_LIMITED_TOTAL.inc();
        tracing::warn!(client = %identity, limit = decision.limit, "Rate limit exceeded");

        let reset_at = Utc::now()
            + TimeDelta::from_std(decision.reset_after).unwrap_or(TimeDelta::zero());
        RelayError::RateLimited {
            retry_after: decision.reset_after,
            reset_at,
        }
        .into_response()
    };

    insert_limit_headers(response.headers_mut(), &decision);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn allows_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("10.0.0.1");
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check("10.0.0.1");
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn identities_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.check("10.0.0.1").allowed);
        assert!(!limiter.check("10.0.0.1").allowed);
        assert!(limiter.check("10.0.0.2").allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn window_elapsing_resets_the_count() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        limiter.check("client");
        limiter.check("client");
        assert!(!limiter.check("client").allowed);

        tokio::time::advance(Duration::from_secs(30)).await;
        let decision = limiter.check("client");
        assert!(!decision.allowed);
        assert_eq!(decision.reset_after, Duration::from_secs(30));

        tokio::time::advance(Duration::from_secs(30)).await;
        let decision = limiter.check("client");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
        assert_eq!(decision.reset_after, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_drops_only_expired_entries() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));

        limiter.check("old");
        tokio::time::advance(Duration::from_secs(45)).await;
        limiter.check("fresh");
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.tracked(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_checks_never_exceed_the_limit() {
        let limiter = Arc::new(RateLimiter::new(50, Duration::from_secs(60)));
        let barrier = Arc::new(tokio::sync::Barrier::new(200));

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    // release every task at once so the checks contend on the same entry
                    barrier.wait().await;
                    limiter.check("shared")
                })
            })
            .collect();

        let mut allowed = 0;
        let mut seen_remaining = Vec::new();
        for handle in handles {
            let decision = handle.await.unwrap();
            if decision.allowed {
                allowed += 1;
                seen_remaining.push(decision.remaining);
            }
        }
        assert_eq!(allowed, 50);

        // each allowed request observed a distinct count
        seen_remaining.sort_unstable();
        assert_eq!(seen_remaining, (0..50).collect::<Vec<u32>>());
    }
}
