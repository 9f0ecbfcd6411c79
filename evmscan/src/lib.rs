#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Multi-provider client for EVM blockchain explorer APIs.
//!
//! This crate unifies heterogeneous explorer services (the Etherscan
//! family, Blockscout instances, and Moralis-style REST APIs) behind one
//! logical method surface. Providers are described declaratively: an
//! endpoint table maps each [`Method`] to a wire shape, and a small
//! interpreter performs dispatch, so adding a provider never changes the
//! dispatch code.
//!
//! # Modules
//!
//! - [`chain`] - chain metadata, references, and the chain registry
//! - [`networks`] - the built-in chain table
//! - [`method`] - the closed logical method enumeration
//! - [`params`] - logical call parameters
//! - [`endpoint`] - declarative endpoint specifications
//! - [`parser`] - response parsers
//! - [`provider`] - provider definitions, the scanner, and the registry
//! - [`client`] - the unified client
//! - [`ports`] - infrastructure port traits (HTTP, rate limit, retry,
//!   cache, telemetry)
//! - [`error`] - the error taxonomy
//!
//! Production port implementations (reqwest transport, token-bucket
//! limiter, back-off retry, TTL cache) live in the `evmscan-http` crate;
//! bulk harvesting over block ranges lives in `evmscan-harvest`.
//!
//! # Example
//!
//! ```no_run
//! use evmscan::{Client, Method, Params, Ports};
//! use std::sync::Arc;
//!
//! # #[derive(Debug)] struct MyTransport;
//! # #[async_trait::async_trait]
//! # impl evmscan::ports::HttpTransport for MyTransport {
//! #     async fn execute(
//! #         &self,
//! #         _request: evmscan::ports::HttpRequest,
//! #     ) -> Result<evmscan::ports::HttpResponse, evmscan::Error> {
//! #         unreachable!()
//! #     }
//! # }
//! # async fn demo() -> Result<(), evmscan::Error> {
//! let client = Client::builder()
//!     .provider("etherscan", "v2")
//!     .chain("ethereum")
//!     .api_key("KEY")
//!     .ports(Ports::new(Arc::new(MyTransport)))
//!     .build()?;
//! let balance = client
//!     .call(
//!         Method::AccountBalance,
//!         Params::new().set("address", "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod method;
pub mod networks;
pub mod params;
pub mod parser;
pub mod ports;
pub mod provider;

pub use chain::{ChainInfo, ChainRef, ChainRegistry, default_chain_registry};
pub use client::{Client, ClientBuilder};
pub use endpoint::EndpointSpec;
pub use error::{Error, ErrorKind};
pub use method::Method;
pub use params::{ParamValue, Params};
pub use parser::Parser;
pub use ports::Ports;
pub use provider::registry::{ProviderRegistry, default_provider_registry, supported_chains};
pub use provider::Scanner;
