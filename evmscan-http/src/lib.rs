#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Production infrastructure stack for the `evmscan` explorer client.
//!
//! The core crate talks to the network only through its port traits; this
//! crate supplies the implementations a deployment actually wants:
//!
//! - [`ReqwestTransport`] - pooled HTTP transport on `reqwest`
//! - [`TokenBucket`] - token-bucket rate limiter with per-provider presets
//! - [`Backoff`] - exponential back-off retry with jitter
//! - [`MemoryCache`] - in-memory TTL cache
//! - [`TracingTelemetry`] - structured per-call `tracing` events
//!
//! [`connect`] wires all of them together:
//!
//! ```no_run
//! # async fn demo() -> Result<(), evmscan::Error> {
//! use evmscan::{Method, Params};
//!
//! let client = evmscan_http::connect("etherscan", "v2", "ethereum", Some("KEY"))?;
//! let balance = client
//!     .call(
//!         Method::AccountBalance,
//!         Params::new().set("address", "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use evmscan::chain::ChainRef;
use evmscan::error::Error;
use evmscan::{Client, Ports};

pub mod cache;
pub mod limiter;
pub mod retry;
pub mod telemetry;
pub mod transport;

pub use cache::MemoryCache;
pub use limiter::TokenBucket;
pub use retry::Backoff;
pub use telemetry::TracingTelemetry;
pub use transport::ReqwestTransport;

/// The default production stack for a provider: pooled transport, the
/// provider's throttle preset, back-off retries, an in-memory cache, and
/// tracing telemetry.
#[must_use]
pub fn default_ports(provider: &str) -> Ports {
    Ports::new(Arc::new(ReqwestTransport::new()))
        .with_limiter(Arc::new(TokenBucket::for_provider(provider)))
        .with_retry(Arc::new(Backoff::default()))
        .with_cache(Arc::new(MemoryCache::new()))
        .with_telemetry(Arc::new(TracingTelemetry))
}

/// Builds a [`Client`] on the default production stack.
///
/// # Errors
///
/// Propagates the construction errors of
/// [`evmscan::client::ClientBuilder::build`]: unknown provider or chain,
/// unsupported chain, or a missing required API key.
pub fn connect(
    provider: &str,
    version: &str,
    chain: impl Into<ChainRef>,
    api_key: Option<&str>,
) -> Result<Client, Error> {
    let mut builder = Client::builder()
        .provider(provider, version)
        .chain(chain)
        .ports(default_ports(provider));
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evmscan::error::ErrorKind;
    use evmscan::{Method, Params};
    use serde_json::json;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    fn mocked_client(provider: &str, version: &str, key: Option<&str>, server: &MockServer) -> Client {
        let mut builder = Client::builder()
            .provider(provider, version)
            .chain(1_u64)
            .base_url(server.uri().parse::<Url>().unwrap())
            .ports(Ports::new(Arc::new(ReqwestTransport::new())));
        if let Some(key) = key {
            builder = builder.api_key(key);
        }
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn test_etherscan_envelope_balance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/api"))
            .and(query_param("module", "account"))
            .and(query_param("action", "balance"))
            .and(query_param("address", VITALIK))
            .and(query_param("chainid", "1"))
            .and(query_param("apikey", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": "4780000000000000000"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mocked_client("etherscan", "v2", Some("KEY"), &server);
        let value = client
            .call(Method::AccountBalance, Params::new().set("address", VITALIK))
            .await
            .unwrap();
        assert_eq!(value, json!("4780000000000000000"));
    }

    #[tokio::test]
    async fn test_moralis_rest_balance() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{VITALIK}/balance")))
            .and(query_param("chain", "0x1"))
            .and(header("x-api-key", "KEY"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"balance": "4780000000000000000"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = mocked_client("moralis", "v1", Some("KEY"), &server);
        let value = client
            .call(Method::AccountBalance, Params::new().set("address", VITALIK))
            .await
            .unwrap();
        assert_eq!(value, json!("4780000000000000000"));
    }

    #[tokio::test]
    async fn test_empty_transaction_list_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/api"))
            .and(query_param("action", "txlist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "No transactions found",
                "result": []
            })))
            .mount(&server)
            .await;

        let client = mocked_client("etherscan", "v2", Some("KEY"), &server);
        let value = client
            .call(
                Method::AccountTransactions,
                Params::new().set("address", VITALIK),
            )
            .await
            .unwrap();
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_provider_error_keeps_raw_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Invalid API Key"
            })))
            .mount(&server)
            .await;

        let client = mocked_client("etherscan", "v2", Some("KEY"), &server);
        let err = client
            .call(
                Method::AccountTransactions,
                Params::new().set("address", VITALIK),
            )
            .await
            .unwrap_err();
        match err {
            Error::Provider { message, .. } => assert_eq!(message, "Invalid API Key"),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_429_retries_then_surfaces_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/api"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let ports = Ports::new(Arc::new(ReqwestTransport::new())).with_retry(Arc::new(
            Backoff::new(2, Duration::from_millis(1), Duration::from_millis(5)),
        ));
        let client = Client::builder()
            .provider("etherscan", "v2")
            .chain(1_u64)
            .api_key("KEY")
            .base_url(server.uri().parse::<Url>().unwrap())
            .ports(ports)
            .build()
            .unwrap();

        let err = client
            .call(Method::AccountBalance, Params::new().set("address", VITALIK))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinct_from_http_errors() {
        let ports = Ports::new(Arc::new(ReqwestTransport::new()));
        let client = Client::builder()
            .provider("etherscan", "v2")
            .chain(1_u64)
            .api_key("KEY")
            .base_url("http://name.invalid".parse::<Url>().unwrap())
            .ports(ports)
            .build()
            .unwrap();

        let err = client
            .call(Method::AccountBalance, Params::new().set("address", VITALIK))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_connect_validates_credentials() {
        let err = connect("etherscan", "v2", 1_u64, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthRequired);

        let err = connect("covalent", "v1", 1_u64, Some("KEY")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownProvider);
    }
}
