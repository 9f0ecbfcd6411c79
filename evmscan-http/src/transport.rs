//! Reqwest-backed HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use evmscan::error::Error;
use evmscan::ports::{HttpRequest, HttpResponse, HttpTransport};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`HttpTransport`] implementation on a shared [`reqwest::Client`].
///
/// The inner client pools connections, so one transport can back many
/// explorer clients concurrently. Transport-level failures (DNS, TCP, TLS,
/// timeouts, I/O) surface as [`Error::Transport`]; HTTP error statuses are
/// successful transport outcomes and are interpreted by the dispatch layer.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// A transport with the default per-request timeout.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("reqwest client initialization");
        Self { client }
    }

    /// Wraps a caller-configured [`reqwest::Client`].
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

fn transport_error(error: reqwest::Error) -> Error {
    Error::Transport {
        message: error.to_string(),
    }
}
