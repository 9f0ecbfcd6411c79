//! Infrastructure ports.
//!
//! The client talks to the outside world exclusively through these traits:
//!
//! - [`HttpTransport`] - issues one HTTP request
//! - [`RateLimiter`] - admission control in front of the transport
//! - [`RetryPolicy`] - decides whether and when a failed attempt is retried
//! - [`Cache`] - optional result cache for final-block data
//! - [`Telemetry`] - structured per-call event sink
//!
//! Production implementations live in the `evmscan-http` crate; tests plug
//! in deterministic fakes. The bundled [`Unthrottled`], [`NoRetry`] and
//! [`NoopTelemetry`] defaults make a bare transport usable on its own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{Error, ErrorKind};
use crate::method::Method;

/// One outbound HTTP request, fully assembled.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP verb.
    pub method: http::Method,
    /// Complete URL including the encoded query string.
    pub url: Url,
    /// Extra headers (auth headers land here).
    pub headers: http::HeaderMap,
    /// JSON body bytes for POST calls.
    pub body: Option<Vec<u8>>,
}

/// One HTTP response, body unparsed.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: http::StatusCode,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// Issues HTTP requests.
///
/// Implementations surface transport-level failures (DNS, TCP, TLS, I/O) as
/// [`Error::Transport`]; an HTTP error status is a successful transport
/// outcome and comes back as `Ok` for the dispatch layer to interpret.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes one request.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}

/// Admission control in front of the transport.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Blocks until a token is available or the token is canceled.
    async fn acquire(&self, cancel: &CancellationToken) -> Result<(), Error>;
}

/// Decides whether a failed attempt is retried.
pub trait RetryPolicy: Send + Sync {
    /// The delay before the next attempt, or `None` to give up.
    ///
    /// `attempt` counts completed attempts, so the first failure arrives
    /// with `attempt == 1`.
    fn delay_before(&self, attempt: u32, error: &Error) -> Option<Duration>;
}

/// Optional result cache.
///
/// Absence and backend errors are both treated as a miss; the cache can
/// never fail a call.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetches a cached value.
    async fn get(&self, key: &str) -> Option<Value>;
    /// Stores a value under a time-to-live.
    async fn set(&self, key: &str, value: Value, ttl: Duration);
}

/// The final disposition of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The provider answered and the result parsed.
    Success,
    /// Served from the cache without touching the network.
    CacheHit,
    /// The call failed with the given kind.
    Failure(ErrorKind),
}

impl CallOutcome {
    /// Stable tag for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::CacheHit => "cache_hit",
            Self::Failure(_) => "failure",
        }
    }
}

/// Structured record of one completed call.
#[derive(Debug, Clone)]
pub struct CallEvent<'a> {
    /// Provider name.
    pub provider: &'a str,
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// The logical method.
    pub method: Method,
    /// How the call ended.
    pub outcome: CallOutcome,
    /// HTTP status, when one was observed.
    pub status: Option<u16>,
    /// Wall-clock duration of the whole call, retries included.
    pub duration: Duration,
}

/// Structured per-call event sink.
pub trait Telemetry: Send + Sync {
    /// Records one completed call.
    fn record(&self, event: &CallEvent<'_>);
}

/// Rate limiter that admits everything immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

#[async_trait]
impl RateLimiter for Unthrottled {
    async fn acquire(&self, cancel: &CancellationToken) -> Result<(), Error> {
        if cancel.is_cancelled() {
            return Err(Error::Canceled);
        }
        Ok(())
    }
}

/// Retry policy that never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn delay_before(&self, _attempt: u32, _error: &Error) -> Option<Duration> {
        None
    }
}

/// Telemetry sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn record(&self, _event: &CallEvent<'_>) {}
}

/// The infrastructure bundle one client borrows.
///
/// Ports are `Arc`-shared: several clients may sit behind one transport and
/// one limiter to enforce a global budget.
#[derive(Clone)]
#[allow(missing_debug_implementations)] // holds dyn trait objects
pub struct Ports {
    /// HTTP transport.
    pub http: Arc<dyn HttpTransport>,
    /// Rate limiter fronting the transport.
    pub limiter: Arc<dyn RateLimiter>,
    /// Retry policy for transient failures.
    pub retry: Arc<dyn RetryPolicy>,
    /// Optional result cache.
    pub cache: Option<Arc<dyn Cache>>,
    /// Time-to-live for cached results.
    pub cache_ttl: Duration,
    /// Per-call event sink.
    pub telemetry: Arc<dyn Telemetry>,
}

impl Ports {
    /// Wraps a transport with pass-through defaults for everything else.
    #[must_use]
    pub fn new(http: Arc<dyn HttpTransport>) -> Self {
        Self {
            http,
            limiter: Arc::new(Unthrottled),
            retry: Arc::new(NoRetry),
            cache: None,
            cache_ttl: Duration::from_secs(600),
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    /// Replaces the rate limiter.
    #[must_use]
    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: Arc<dyn RetryPolicy>) -> Self {
        self.retry = retry;
        self
    }

    /// Enables a result cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Overrides the cache time-to-live.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Replaces the telemetry sink.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }
}
