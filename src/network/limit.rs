//! Rate limiting for flood protection.
//!
//! Implements a token bucket algorithm for rate limiting client lines.
//! Off unless `limits.message_rate_per_second` is set above zero.

use crate::config::LimitsConfig;
use std::time::Instant;

/// Token bucket rate limiter.
///
/// Uses a token bucket algorithm where:
/// - Tokens are added at a fixed rate per second
/// - Each line costs 1 token
/// - If no tokens are available, the line is rejected (flood)
#[derive(Debug)]
pub struct RateLimiter {
    tokens: f32,
    last_check: Instant,
    rate: f32,
    capacity: f32,
}

impl RateLimiter {
    /// Create a new rate limiter.
    ///
    /// # Arguments
    /// * `rate` - Tokens added per second
    /// * `capacity` - Maximum token capacity (burst size)
    pub fn new(rate: f32, capacity: f32) -> Self {
        Self {
            tokens: capacity,
            last_check: Instant::now(),
            rate,
            capacity,
        }
    }

    /// Build a limiter from the configured per-connection limits.
    ///
    /// Returns `None` when the rate is zero, which disables flood control.
    pub fn from_limits(limits: &LimitsConfig) -> Option<Self> {
        (limits.message_rate_per_second > 0.0)
            .then(|| Self::new(limits.message_rate_per_second, limits.message_burst))
    }

    /// Check if a line can be processed.
    ///
    /// Returns `true` if the line is allowed (token consumed),
    /// `false` if the rate limit is exceeded.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_check).as_secs_f32();
        self.last_check = now;

        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_initial_capacity() {
        let mut limiter = RateLimiter::new(10.0, 5.0);
        for _ in 0..5 {
            assert!(limiter.check());
        }
        assert!(!limiter.check());
    }

    #[test]
    fn test_rate_replenish() {
        let mut limiter = RateLimiter::new(10.0, 5.0);
        for _ in 0..5 {
            limiter.check();
        }
        assert!(!limiter.check());

        // ~2 tokens
        sleep(Duration::from_millis(250));
        assert!(limiter.check());
        assert!(limiter.check());
    }

    #[test]
    fn test_from_limits_uses_burst() {
        let limits = LimitsConfig {
            message_rate_per_second: 0.001,
            message_burst: 3.0,
            ..LimitsConfig::default()
        };
        let mut limiter = RateLimiter::from_limits(&limits).unwrap();
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
    }

    #[test]
    fn test_zero_rate_disables_limiter() {
        assert!(RateLimiter::from_limits(&LimitsConfig::default()).is_none());

        let limits = LimitsConfig {
            message_rate_per_second: 0.0,
            message_burst: 1.0,
            ..LimitsConfig::default()
        };
        assert!(RateLimiter::from_limits(&limits).is_none());
    }
}
