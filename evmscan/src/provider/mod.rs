//! Provider adapters.
//!
//! - [`ProviderDef`] - the static description of one provider: auth mode,
//!   base-URL rule, chain-parameter injection, and its endpoint table
//! - [`Scanner`] - a provider bound to one chain and credential; builds
//!   requests and parses responses, but performs no I/O itself
//! - [`registry`] - process-wide lookup of definitions by (name, version)
//!
//! New providers are added by writing a new endpoint table; neither the
//! dispatch interpreter nor [`Scanner`] changes shape.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::chain::ChainInfo;
use crate::endpoint::EndpointSpec;
use crate::error::Error;
use crate::method::Method;
use crate::params::Params;
use crate::parser::ParseFault;
use crate::ports::{HttpRequest, HttpResponse};

pub mod blockscout;
pub mod etherscan;
pub mod moralis;
pub mod registry;

/// How a provider authenticates calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// No credential.
    None,
    /// Credential as a query parameter.
    Query {
        /// Wire name of the query parameter, e.g. `apikey`.
        param: &'static str,
        /// Whether the provider refuses keyless calls.
        required: bool,
    },
    /// Credential as an HTTP header.
    Header {
        /// Lowercase header name, e.g. `x-api-key`.
        name: &'static str,
        /// Whether the provider refuses keyless calls.
        required: bool,
    },
}

impl Auth {
    const fn requires_key(self) -> bool {
        match self {
            Self::None => false,
            Self::Query { required, .. } | Self::Header { required, .. } => required,
        }
    }
}

/// How a provider's base URL is derived for a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrl {
    /// One fixed host for every chain.
    Fixed(&'static str),
    /// Per-chain API host from the chain's Etherscan hint.
    EtherscanHost,
    /// Per-chain instance host from the chain's Blockscout hint.
    BlockscoutHost,
}

/// How the chain is conveyed on the wire, when the base URL alone does not
/// identify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainParam {
    /// The base URL already pins the chain.
    None,
    /// Decimal chain id under the given query key (Etherscan v2 `chainid`).
    QueryDecimal(&'static str),
    /// Hex chain id from the Moralis hint under the given query key.
    QueryHex(&'static str),
}

/// Which per-provider hint a chain must carry to be supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    /// Needs [`ChainInfo::etherscan`].
    Etherscan,
    /// Needs [`ChainInfo::blockscout`].
    Blockscout,
    /// Needs [`ChainInfo::moralis`].
    Moralis,
}

/// Static description of one provider.
#[derive(Debug, Clone)]
pub struct ProviderDef {
    /// Provider name, e.g. `etherscan`.
    pub name: &'static str,
    /// Provider API version, e.g. `v2`.
    pub version: &'static str,
    /// Authentication mode.
    pub auth: Auth,
    /// Base-URL derivation rule.
    pub base: BaseUrl,
    /// Chain-parameter injection rule.
    pub chain_param: ChainParam,
    /// The hint a chain must carry to be supported.
    pub hint: HintKind,
    /// Endpoint table: one spec per implemented logical method.
    pub methods: HashMap<Method, EndpointSpec>,
}

impl ProviderDef {
    /// Whether this provider serves the given chain.
    ///
    /// True exactly when the chain carries the hint this provider needs.
    #[must_use]
    pub const fn supports_chain(&self, chain: &ChainInfo) -> bool {
        match self.hint {
            HintKind::Etherscan => chain.etherscan.is_some(),
            HintKind::Blockscout => chain.blockscout.is_some(),
            HintKind::Moralis => chain.moralis.is_some(),
        }
    }

    fn base_url(&self, chain: &ChainInfo) -> Result<Url, Error> {
        let raw = match &self.base {
            BaseUrl::Fixed(host) => (*host).to_owned(),
            BaseUrl::EtherscanHost => {
                let hint = chain.etherscan.as_ref().ok_or_else(|| self.unsupported(chain))?;
                format!("https://{}", hint.host)
            }
            BaseUrl::BlockscoutHost => {
                let hint = chain.blockscout.as_ref().ok_or_else(|| self.unsupported(chain))?;
                format!("https://{}", hint.host)
            }
        };
        Url::parse(&raw).map_err(|e| {
            Error::InvalidArgument(format!("invalid base URL {raw:?} for {}: {e}", self.name))
        })
    }

    fn unsupported(&self, chain: &ChainInfo) -> Error {
        Error::ChainNotSupported {
            provider: self.name.to_owned(),
            chain: chain.display_name.clone(),
        }
    }
}

/// A provider bound to one chain and credential.
///
/// The scanner owns everything needed to translate a logical call into an
/// [`HttpRequest`] and a raw [`HttpResponse`] back into the logical result.
/// It never touches the network; the client drives the transport.
#[derive(Debug, Clone)]
pub struct Scanner {
    def: Arc<ProviderDef>,
    chain: Arc<ChainInfo>,
    base: Url,
    chain_query: Option<(&'static str, String)>,
    api_key: Option<String>,
}

impl Scanner {
    /// Binds a provider definition to a chain.
    ///
    /// # Errors
    ///
    /// [`Error::ChainNotSupported`] when the chain lacks the provider's
    /// hint; [`Error::AuthRequired`] when the provider demands a key and
    /// none was given.
    pub fn new(
        def: Arc<ProviderDef>,
        chain: Arc<ChainInfo>,
        api_key: Option<String>,
    ) -> Result<Self, Error> {
        if !def.supports_chain(&chain) {
            return Err(def.unsupported(&chain));
        }
        if def.auth.requires_key() && api_key.is_none() {
            return Err(Error::AuthRequired {
                provider: def.name.to_owned(),
            });
        }
        let base = def.base_url(&chain)?;
        let chain_query = match def.chain_param {
            ChainParam::None => None,
            ChainParam::QueryDecimal(key) => Some((key, chain.chain_id.to_string())),
            ChainParam::QueryHex(key) => {
                let hint = chain.moralis.as_ref().ok_or_else(|| def.unsupported(&chain))?;
                Some((key, hint.hex_id.clone()))
            }
        };
        Ok(Self {
            def,
            chain,
            base,
            chain_query,
            api_key,
        })
    }

    /// Provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.def.name
    }

    /// Provider API version.
    #[must_use]
    pub fn provider_version(&self) -> &'static str {
        self.def.version
    }

    /// The bound chain.
    #[must_use]
    pub fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    /// Overrides the base URL, e.g. to point at a self-hosted instance.
    pub fn set_base_url(&mut self, base: Url) {
        self.base = base;
    }

    /// Whether the provider implements the given logical method.
    #[must_use]
    pub fn supports(&self, method: Method) -> bool {
        self.def.methods.contains_key(&method)
    }

    /// The logical methods this provider implements, sorted.
    #[must_use]
    pub fn supported_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.def.methods.keys().copied().collect();
        methods.sort();
        methods
    }

    /// The endpoint spec for a method.
    ///
    /// # Errors
    ///
    /// [`Error::MethodNotSupported`] when the table has no entry; no call is
    /// issued in that case.
    pub fn spec(&self, method: Method) -> Result<&EndpointSpec, Error> {
        self.def
            .methods
            .get(&method)
            .ok_or_else(|| Error::MethodNotSupported {
                provider: self.def.name.to_owned(),
                chain: self.chain.display_name.clone(),
                method,
            })
    }

    /// Builds the full HTTP request for one logical call.
    ///
    /// # Errors
    ///
    /// [`Error::MethodNotSupported`] or [`Error::InvalidArgument`]; both
    /// fire before any network activity.
    pub fn prepare(&self, method: Method, params: &Params) -> Result<HttpRequest, Error> {
        let spec = self.spec(method)?;
        let call = spec.build(params)?;

        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidArgument("provider base URL has no path".into()))?;
            path.pop_if_empty();
            for segment in &call.segments {
                path.push(segment);
            }
        }

        let mut query = call.query;
        if let Some((key, value)) = &self.chain_query {
            query.push(((*key).to_owned(), value.clone()));
        }

        let mut headers = http::HeaderMap::new();
        match self.def.auth {
            Auth::None => {}
            Auth::Query { param, .. } => {
                if let Some(key) = &self.api_key {
                    query.push((param.to_owned(), key.clone()));
                }
            }
            Auth::Header { name, .. } => {
                if let Some(key) = &self.api_key {
                    let value = http::HeaderValue::from_str(key).map_err(|_| {
                        Error::InvalidArgument("API key is not a valid header value".into())
                    })?;
                    headers.insert(http::HeaderName::from_static(name), value);
                }
            }
        }

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &query {
                pairs.append_pair(key, value);
            }
        }

        Ok(HttpRequest {
            method: call.verb,
            url,
            headers,
            body: None,
        })
    }

    /// Interprets a raw response for one logical call.
    ///
    /// # Errors
    ///
    /// [`Error::RateLimited`] on HTTP 429, [`Error::Provider`] on other
    /// error statuses or structured provider errors, [`Error::Parse`] when
    /// the payload shape is wrong.
    pub fn parse(&self, method: Method, response: &HttpResponse) -> Result<serde_json::Value, Error> {
        let status = response.status;
        if status == http::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                provider: self.def.name.to_owned(),
                chain: self.chain.display_name.clone(),
                method,
            });
        }
        if status.is_server_error() || status.is_client_error() {
            return Err(Error::Provider {
                provider: self.def.name.to_owned(),
                chain: self.chain.display_name.clone(),
                method,
                status: Some(status.as_u16()),
                message: body_snippet(&response.body),
            });
        }

        let parser = self.spec(method)?.response_parser();
        parser.parse(&response.body).map_err(|fault| match fault {
            ParseFault::Provider { message } => Error::Provider {
                provider: self.def.name.to_owned(),
                chain: self.chain.display_name.clone(),
                method,
                status: None,
                message,
            },
            ParseFault::Shape { message } => Error::Parse {
                provider: self.def.name.to_owned(),
                method,
                message,
            },
        })
    }
}

fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "empty body".to_owned()
    } else {
        let mut snippet: String = trimmed.chars().take(200).collect();
        if snippet.len() < trimmed.len() {
            snippet.push('…');
        }
        snippet
    }
}
