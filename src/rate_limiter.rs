use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::ConnectInfo,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

/// Click-flood guard: token buckets keyed by player id when the request
/// carries one, by client ip otherwise.
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<DashMap<String, TokenBucket>>,
    requests_per_window: u32,
    window_duration: Duration,
}

#[derive(Debug)]
struct TokenBucket {
    window_start: Instant,
    request_count: u32,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            requests_per_window: requests_per_second * 60,
            window_duration: Duration::from_secs(60),
        }
    }

    pub fn check_rate_limit(&self, client_key: &str) -> bool {
        let now = Instant::now();

        let mut entry = self
            .buckets
            .entry(client_key.to_string())
            .or_insert(TokenBucket {
                window_start: now,
                request_count: 0,
            });

        if now.duration_since(entry.window_start) >= self.window_duration {
            entry.window_start = now;
            entry.request_count = 0;
        }

        if entry.request_count >= self.requests_per_window {
            return false;
        }

        entry.request_count += 1;
        true
    }
}

pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let rate_limiter = req
        .extensions()
        .get::<RateLimiter>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    let client_key = req
        .headers()
        .get("x-player-id")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| addr.ip().to_string());

    if !rate_limiter.check_rate_limit(&client_key) {
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_keys_get_separate_buckets() {
        let limiter = RateLimiter::new(1); // 60 per window
        for _ in 0..60 {
            assert!(limiter.check_rate_limit("player_a"));
        }
        assert!(!limiter.check_rate_limit("player_a"));
        assert!(limiter.check_rate_limit("player_b"));
    }
}
