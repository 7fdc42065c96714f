//! Per-key sliding-window rate limiting.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{DatasightError, Result};

/// Admission control for expensive endpoints.
///
/// Implementations must be thread-safe so one limiter can guard every
/// request handler.
pub trait RateLimiter: Send + Sync {
    /// Admit or reject a request for the given key.
    ///
    /// Returns `DatasightError::RateLimited` with a retry hint on rejection.
    fn check(&self, key: &str) -> Result<()>;
}

/// Sliding-window limiter: at most `limit` requests per key within the
/// trailing window.
pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter allowing `limit` requests per `window` per key.
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<()> {
        let mut hits = self
            .hits
            .lock()
            .map_err(|_| DatasightError::Computation("rate limiter lock poisoned".to_string()))?;

        let window = hits.entry(key.to_string()).or_default();
        while let Some(&front) = window.front() {
            if now.duration_since(front) >= self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= self.limit {
            // Oldest hit in the window determines when capacity frees up
            let retry_after_secs = window
                .front()
                .map(|&front| {
                    let elapsed = now.duration_since(front);
                    self.window.saturating_sub(elapsed).as_secs().max(1)
                })
                .unwrap_or(1);
            return Err(DatasightError::RateLimited { retry_after_secs });
        }

        window.push_back(now);
        Ok(())
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn check(&self, key: &str) -> Result<()> {
        self.check_at(key, Instant::now())
    }
}

/// A limiter that admits everything, for tests and local tooling.
pub struct UnlimitedLimiter;

impl RateLimiter for UnlimitedLimiter {
    fn check(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}
