use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};


lazy_static! {
    pub static ref CHAT_REQUESTS_TOTAL: Counter =
        register_counter!("relay_chat_requests_total", "Total number of chat requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("relay_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref UPSTREAM_FAILURES_TOTAL: Counter =
        register_counter!("relay_upstream_failures_total", "Upstream calls that failed in transport").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "relay_upstream_latency_seconds",
        "Upstream round-trip latency in seconds"
    )
    .unwrap();
}
