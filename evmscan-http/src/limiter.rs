//! Token-bucket rate limiter.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use evmscan::error::Error;
use evmscan::ports::RateLimiter;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Token-bucket [`RateLimiter`]: a configured long-run rate with a burst
/// allowance.
///
/// The bucket starts full, refills continuously, and `acquire` sleeps until
/// a whole token is available or the cancellation token fires. Sharing one
/// bucket across clients enforces a global budget.
#[derive(Debug)]
pub struct TokenBucket {
    rate: f64,
    capacity: f64,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    tokens: f64,
    refreshed: Option<Instant>,
}

impl TokenBucket {
    /// A bucket refilling at `rate` tokens per second with a burst of
    /// `burst` tokens.
    #[must_use]
    pub fn new(rate: f64, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            rate: rate.max(0.001),
            capacity,
            state: Mutex::new(State {
                tokens: capacity,
                refreshed: None,
            }),
        }
    }

    /// A bucket matching the public-tier throughput of a bundled provider.
    #[must_use]
    pub fn for_provider(name: &str) -> Self {
        match name {
            "moralis" => Self::new(25.0, 25),
            "blockscout" => Self::new(10.0, 10),
            // Etherscan free tier and the conservative fallback.
            _ => Self::new(5.0, 5),
        }
    }

    /// Takes one token if available, otherwise returns how long to wait.
    fn try_take(&self) -> Option<Duration> {
        let mut state = self.state.lock().expect("limiter state poisoned");
        let now = Instant::now();
        let elapsed = state
            .refreshed
            .map_or(0.0, |last| now.duration_since(last).as_secs_f64());
        state.refreshed = Some(now);
        state.tokens = (state.tokens + elapsed * self.rate).min(self.capacity);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            None
        } else {
            Some(Duration::from_secs_f64((1.0 - state.tokens) / self.rate))
        }
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn acquire(&self, cancel: &CancellationToken) -> Result<(), Error> {
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Canceled);
            }
            let Some(wait) = self.try_take() else {
                return Ok(());
            };
            tokio::select! {
                () = cancel.cancelled() => return Err(Error::Canceled),
                () = tokio::time::sleep(wait) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_paced() {
        let bucket = TokenBucket::new(10.0, 2);
        let cancel = CancellationToken::new();

        let started = Instant::now();
        // Burst allowance admits the first two immediately.
        bucket.acquire(&cancel).await.unwrap();
        bucket.acquire(&cancel).await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(5));

        // The third token refills at 10/s, so roughly 100ms later.
        bucket.acquire(&cancel).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_wait() {
        let bucket = TokenBucket::new(0.01, 1);
        let cancel = CancellationToken::new();
        bucket.acquire(&cancel).await.unwrap();

        cancel.cancel();
        let err = bucket.acquire(&cancel).await.unwrap_err();
        assert!(matches!(err, Error::Canceled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_run_rate_is_enforced() {
        let bucket = TokenBucket::new(100.0, 1);
        let cancel = CancellationToken::new();
        let started = Instant::now();
        for _ in 0..11 {
            bucket.acquire(&cancel).await.unwrap();
        }
        // One burst token plus ten refills at 100/s.
        assert!(started.elapsed() >= Duration::from_millis(95));
    }
}
