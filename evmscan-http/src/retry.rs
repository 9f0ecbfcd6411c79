//! Exponential back-off retry policy.

use std::time::Duration;

use evmscan::error::Error;
use evmscan::ports::RetryPolicy;
use rand::RngExt;

/// [`RetryPolicy`] with exponential back-off and jitter.
///
/// Transient errors (transport failures, HTTP 429, provider 5xx) are
/// retried up to the attempt cap; the delay doubles each attempt, is capped,
/// and is scattered by a uniform ±50% jitter so synchronized callers do not
/// stampede the provider.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    max_attempts: u32,
    base: Duration,
    cap: Duration,
}

impl Backoff {
    /// A policy with explicit attempt cap, initial delay, and delay ceiling.
    #[must_use]
    pub const fn new(max_attempts: u32, base: Duration, cap: Duration) -> Self {
        Self {
            max_attempts,
            base,
            cap,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(4, Duration::from_millis(250), Duration::from_secs(10))
    }
}

impl RetryPolicy for Backoff {
    fn delay_before(&self, attempt: u32, error: &Error) -> Option<Duration> {
        if attempt >= self.max_attempts || !error.is_transient() {
            return None;
        }
        let exponent = attempt.saturating_sub(1).min(16);
        let raw = self.base.saturating_mul(1_u32 << exponent).min(self.cap);
        let jitter: f64 = rand::rng().random_range(0.5..1.5);
        Some(raw.mul_f64(jitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> Error {
        Error::Transport {
            message: "connection refused".to_owned(),
        }
    }

    #[test]
    fn test_delay_grows_and_stays_jittered() {
        let policy = Backoff::new(5, Duration::from_millis(100), Duration::from_secs(10));
        let first = policy.delay_before(1, &transport()).unwrap();
        assert!(first >= Duration::from_millis(50) && first <= Duration::from_millis(150));
        let third = policy.delay_before(3, &transport()).unwrap();
        assert!(third >= Duration::from_millis(200) && third <= Duration::from_millis(600));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = Backoff::new(20, Duration::from_secs(1), Duration::from_secs(2));
        let late = policy.delay_before(10, &transport()).unwrap();
        assert!(late <= Duration::from_secs(3));
    }

    #[test]
    fn test_gives_up_at_attempt_cap() {
        let policy = Backoff::new(3, Duration::from_millis(10), Duration::from_secs(1));
        assert!(policy.delay_before(2, &transport()).is_some());
        assert!(policy.delay_before(3, &transport()).is_none());
    }

    #[test]
    fn test_definitive_errors_are_not_retried() {
        let policy = Backoff::default();
        let err = Error::InvalidArgument("missing address".to_owned());
        assert!(policy.delay_before(1, &err).is_none());
    }
}
