//! Per-client rate limiting middleware.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::schema::RateLimitConfig;
use crate::http::error::ApiError;
use crate::observability::metrics;

/// Request count for one client within the current window.
struct ClientWindow {
    count: u32,
    window_start: Instant,
}

/// Fixed-window request counter keyed by client IP.
///
/// Each read-modify-write on a window happens under one lock, so concurrent
/// requests from the same client never lose an increment.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, ClientWindow>>,
    window: Duration,
    max_requests: u32,
    message: String,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            message: config.message.clone(),
        }
    }

    /// Check whether a request from `client_id` is allowed right now.
    pub fn allow(&self, client_id: &str) -> bool {
        self.allow_at(client_id, Instant::now())
    }

    fn allow_at(&self, client_id: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");

        match windows.get_mut(client_id) {
            None => {
                windows.insert(
                    client_id.to_string(),
                    ClientWindow {
                        count: 1,
                        window_start: now,
                    },
                );
                true
            }
            Some(window) => {
                if now.duration_since(window.window_start) > self.window {
                    window.count = 1;
                    window.window_start = now;
                    true
                } else {
                    window.count += 1;
                    window.count <= self.max_requests
                }
            }
        }
    }

    /// Drop windows that have expired. Run periodically so the table does
    /// not grow with every client IP ever seen.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    fn sweep_at(&self, now: Instant) {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.window_start) <= self.window);
        let removed = before - windows.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = windows.len(), "Swept expired rate windows");
        }
    }

    /// Number of client windows currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().expect("rate limiter mutex poisoned").len()
    }

    /// Message for the 429 body.
    pub fn message(&self) -> &str {
        &self.message
    }

    #[cfg(test)]
    fn count_for(&self, client_id: &str) -> Option<u32> {
        self.windows
            .lock()
            .unwrap()
            .get(client_id)
            .map(|w| w.count)
    }
}

/// Middleware consulting the limiter before dispatch.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = addr.ip().to_string();

    if limiter.allow(&client) {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, "Rate limit exceeded");
        metrics::record_rate_limited();
        ApiError::RateLimited(limiter.message().to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window_secs,
            max_requests,
            message: "Rate limit exceeded".into(),
        })
    }

    #[test]
    fn test_denies_request_over_limit() {
        let limiter = limiter(1000, 900);
        let now = Instant::now();

        for _ in 0..1000 {
            assert!(limiter.allow_at("10.0.0.1", now));
        }
        // 1001st request within the same window is denied.
        assert!(!limiter.allow_at("10.0.0.1", now));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let limiter = limiter(3, 900);
        let start = Instant::now();

        for _ in 0..3 {
            assert!(limiter.allow_at("10.0.0.1", start));
        }
        assert!(!limiter.allow_at("10.0.0.1", start));

        // First request after the window elapses is allowed and resets to 1.
        let later = start + Duration::from_secs(901);
        assert!(limiter.allow_at("10.0.0.1", later));
        assert_eq!(limiter.count_for("10.0.0.1"), Some(1));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = limiter(1, 900);
        let now = Instant::now();

        assert!(limiter.allow_at("10.0.0.1", now));
        assert!(!limiter.allow_at("10.0.0.1", now));
        assert!(limiter.allow_at("10.0.0.2", now));
    }

    #[test]
    fn test_sweep_drops_only_expired_windows() {
        let limiter = limiter(1000, 900);
        let start = Instant::now();

        limiter.allow_at("10.0.0.1", start);
        let later = start + Duration::from_secs(800);
        limiter.allow_at("10.0.0.2", later);
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.sweep_at(start + Duration::from_secs(1000));
        assert_eq!(limiter.tracked_clients(), 1);
        assert!(limiter.count_for("10.0.0.2").is_some());
    }
}
