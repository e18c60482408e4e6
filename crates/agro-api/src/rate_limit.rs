//! Fixed-window limiter for question requests.
//!
//! Each ask may trigger an embedding call and an LLM call, so the ask route
//! is limited to a configurable number of requests per second.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u64,
}

/// Shared limiter. `max_per_sec == 0` admits everything.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_per_sec: u64,
    window: Arc<Mutex<Window>>,
}

impl RateLimiter {
    pub fn new(max_per_sec: u64) -> Self {
        Self {
            max_per_sec,
            window: Arc::new(Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            })),
        }
    }

    /// Try to take a permit for the current one-second window.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        if self.max_per_sec == 0 {
            return true;
        }
        let mut window = self
            .window
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if now.saturating_duration_since(window.started) >= Duration::from_secs(1) {
            window.started = now;
            window.count = 0;
        }
        if window.count < self.max_per_sec {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// Axum middleware that rejects asks over the limit with 429.
pub async fn limit_asks(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.ask_limiter.try_acquire() {
        next.run(req).await
    } else {
        tracing::debug!("Ask rate limit exceeded");
        ApiError::TooManyRequests("Too many questions, try again shortly".to_string())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_within_window() {
        let limiter = RateLimiter::new(2);
        let t0 = Instant::now();
        assert!(limiter.try_acquire_at(t0));
        assert!(limiter.try_acquire_at(t0));
        assert!(!limiter.try_acquire_at(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(1);
        let t0 = Instant::now();
        assert!(limiter.try_acquire_at(t0));
        assert!(!limiter.try_acquire_at(t0));
        assert!(limiter.try_acquire_at(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_zero_disables() {
        let limiter = RateLimiter::new(0);
        for _ in 0..1000 {
            assert!(limiter.try_acquire());
        }
    }
}
