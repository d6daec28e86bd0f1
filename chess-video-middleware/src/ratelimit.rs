//! A simple async token-bucket rate limiter shared across all upstream callers.
//! Skipped entirely in test mode via [`RateLimiter::disabled`].

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::time::sleep;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket limiter at a configured requests-per-second rate.
pub struct RateLimiter {
    rate_per_sec: f64,
    capacity: f64,
    bucket: Option<Mutex<Bucket>>,
}

impl RateLimiter {
    /// Build a limiter allowing `requests_per_second` sustained throughput, with a
    /// burst capacity equal to one second's worth of tokens.
    #[must_use]
    pub fn new(requests_per_second: u32) -> Self {
        let rate = f64::from(requests_per_second.max(1));
        Self {
            rate_per_sec: rate,
            capacity: rate,
            bucket: Some(Mutex::new(Bucket {
                tokens: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// Build a limiter that never throttles; used in test mode.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            rate_per_sec: 0.0,
            capacity: 0.0,
            bucket: None,
        }
    }

    /// Wait until a token is available, consuming it.
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };
        loop {
            let wait = {
                let mut b = bucket.lock().expect("mutex poisoned");
                let now = Instant::now();
                let elapsed = now.duration_since(b.last_refill).as_secs_f64();
                b.tokens = (b.tokens + elapsed * self.rate_per_sec).min(self.capacity);
                b.last_refill = now;

                if b.tokens >= 1.0 {
                    b.tokens -= 1.0;
                    None
                } else {
                    let deficit = 1.0 - b.tokens;
                    Some(Duration::from_secs_f64(deficit / self.rate_per_sec))
                }
            };
            match wait {
                None => return,
                Some(d) => sleep(d).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_limiter_never_blocks() {
        let limiter = RateLimiter::disabled();
        for _ in 0..100 {
            limiter.acquire().await;
        }
    }

    #[tokio::test]
    async fn allows_burst_up_to_capacity() {
        let limiter = RateLimiter::new(5);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        // Five tokens were available immediately (one second of capacity).
        assert!(start.elapsed() < Duration::from_millis(200));
    }
}
