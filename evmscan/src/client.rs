//! The unified client.
//!
//! A [`Client`] composes one [`Scanner`] with the shared infrastructure
//! [`Ports`]. Each call runs the same pipeline: telemetry span start →
//! rate-limit acquire → cache lookup → adapter dispatch under the retry
//! policy → cache store → telemetry span end. The client adds no
//! parallelism of its own and is safe to share across tasks as long as its
//! ports are.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::chain::{ChainInfo, ChainRef, default_chain_registry};
use crate::error::Error;
use crate::method::Method;
use crate::params::Params;
use crate::ports::{CallEvent, CallOutcome, HttpRequest, Ports};
use crate::provider::registry::default_provider_registry;
use crate::provider::Scanner;

/// A provider-bound explorer client.
pub struct Client {
    scanner: Scanner,
    ports: Ports,
    closed: AtomicBool,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

struct Dispatched {
    value: Value,
    cache_hit: bool,
    status: Option<u16>,
}

impl Client {
    /// Starts building a client.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The bound chain.
    #[must_use]
    pub fn chain(&self) -> &ChainInfo {
        self.scanner.chain()
    }

    /// Provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.scanner.provider_name()
    }

    /// Provider API version.
    #[must_use]
    pub fn provider_version(&self) -> &'static str {
        self.scanner.provider_version()
    }

    /// Whether the provider implements the given logical method.
    #[must_use]
    pub fn supports(&self, method: Method) -> bool {
        self.scanner.supports(method)
    }

    /// The logical methods the provider implements, sorted.
    #[must_use]
    pub fn supported_methods(&self) -> Vec<Method> {
        self.scanner.supported_methods()
    }

    /// Invokes a logical method.
    ///
    /// # Errors
    ///
    /// See [`crate::error::Error`]; domain errors from the provider are
    /// surfaced as-is, never swallowed or retried.
    pub async fn call(&self, method: Method, params: Params) -> Result<Value, Error> {
        self.call_with_cancel(method, params, &CancellationToken::new())
            .await
    }

    /// Invokes a logical method under a cancellation token.
    ///
    /// # Errors
    ///
    /// As [`Client::call`], plus [`Error::Canceled`] when the token fires
    /// before the call completes.
    pub async fn call_with_cancel(
        &self,
        method: Method,
        params: Params,
        cancel: &CancellationToken,
    ) -> Result<Value, Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::InvalidArgument("client is closed".into()));
        }

        let started = Instant::now();
        let dispatched = self.dispatch(method, &params, cancel).await;

        let (outcome, status) = match &dispatched {
            Ok(d) if d.cache_hit => (CallOutcome::CacheHit, d.status),
            Ok(d) => (CallOutcome::Success, d.status),
            Err(e) => (CallOutcome::Failure(e.kind()), e.http_status()),
        };
        self.ports.telemetry.record(&CallEvent {
            provider: self.scanner.provider_name(),
            chain_id: self.scanner.chain().chain_id,
            method,
            outcome,
            status,
            duration: started.elapsed(),
        });

        dispatched.map(|d| d.value)
    }

    /// Marks the client closed; further calls fail.
    ///
    /// Shared ports stay alive for other clients and are released when the
    /// last holder drops.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Whether [`Client::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn dispatch(
        &self,
        method: Method,
        params: &Params,
        cancel: &CancellationToken,
    ) -> Result<Dispatched, Error> {
        // Validates method support before spending a rate-limit token.
        let cacheable = self.scanner.spec(method)?.is_cacheable();

        self.ports.limiter.acquire(cancel).await?;

        let cache_key = (cacheable && self.ports.cache.is_some())
            .then(|| self.cache_key(method, params));
        if let (Some(key), Some(cache)) = (&cache_key, &self.ports.cache) {
            if let Some(value) = cache.get(key).await {
                return Ok(Dispatched {
                    value,
                    cache_hit: true,
                    status: None,
                });
            }
        }

        let request = self.scanner.prepare(method, params)?;
        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                self.ports.limiter.acquire(cancel).await?;
            }
            match self.attempt(&request, method, cancel).await {
                Ok((value, status)) => {
                    if let (Some(key), Some(cache)) = (&cache_key, &self.ports.cache) {
                        cache.set(key, value.clone(), self.ports.cache_ttl).await;
                    }
                    return Ok(Dispatched {
                        value,
                        cache_hit: false,
                        status: Some(status),
                    });
                }
                Err(Error::Canceled) => return Err(Error::Canceled),
                Err(error) => {
                    attempt += 1;
                    let Some(delay) = self.ports.retry.delay_before(attempt, &error) else {
                        return Err(error);
                    };
                    tracing::debug!(
                        provider = self.scanner.provider_name(),
                        method = %method,
                        attempt,
                        delay = ?delay,
                        error = %error,
                        "retrying explorer call"
                    );
                    tokio::select! {
                        () = cancel.cancelled() => return Err(Error::Canceled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &HttpRequest,
        method: Method,
        cancel: &CancellationToken,
    ) -> Result<(Value, u16), Error> {
        let response = tokio::select! {
            () = cancel.cancelled() => return Err(Error::Canceled),
            result = self.ports.http.execute(request.clone()) => result?,
        };
        let status = response.status.as_u16();
        let value = self.scanner.parse(method, &response)?;
        Ok((value, status))
    }

    fn cache_key(&self, method: Method, params: &Params) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.scanner.provider_name(),
            self.scanner.provider_version(),
            self.scanner.chain().chain_id,
            method,
            params.canonical()
        )
    }
}

/// Builder for [`Client`].
///
/// Registries default to the built-in tables; tests substitute their own
/// through [`ClientBuilder::chain_registry`] and
/// [`ClientBuilder::provider_registry`]. A transport (via
/// [`ClientBuilder::ports`]) is mandatory, as the core crate ships no HTTP
/// implementation.
#[allow(missing_debug_implementations)] // Ports holds dyn trait objects
#[derive(Default)]
pub struct ClientBuilder {
    provider: Option<(String, String)>,
    chain: Option<ChainRef>,
    api_key: Option<String>,
    base_url: Option<Url>,
    chains: Option<std::sync::Arc<crate::chain::ChainRegistry>>,
    providers: Option<std::sync::Arc<crate::provider::registry::ProviderRegistry>>,
    ports: Option<Ports>,
}

impl ClientBuilder {
    /// Selects the provider by name and version.
    #[must_use]
    pub fn provider(mut self, name: &str, version: &str) -> Self {
        self.provider = Some((name.to_owned(), version.to_owned()));
        self
    }

    /// Selects the chain by id, name, or alias.
    #[must_use]
    pub fn chain(mut self, chain: impl Into<ChainRef>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    /// Supplies the provider credential.
    #[must_use]
    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_owned());
        self
    }

    /// Overrides the provider base URL (self-hosted instances, tests).
    #[must_use]
    pub fn base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    /// Substitutes the chain registry.
    #[must_use]
    pub fn chain_registry(mut self, registry: std::sync::Arc<crate::chain::ChainRegistry>) -> Self {
        self.chains = Some(registry);
        self
    }

    /// Substitutes the provider registry.
    #[must_use]
    pub fn provider_registry(
        mut self,
        registry: std::sync::Arc<crate::provider::registry::ProviderRegistry>,
    ) -> Self {
        self.providers = Some(registry);
        self
    }

    /// Supplies the infrastructure ports.
    #[must_use]
    pub fn ports(mut self, ports: Ports) -> Self {
        self.ports = Some(ports);
        self
    }

    /// Resolves the chain, binds the provider, and assembles the client.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when a required piece is missing,
    /// [`Error::UnknownProvider`] / [`Error::UnknownChain`] on failed
    /// lookups, and the [`Scanner::new`] construction errors.
    pub fn build(self) -> Result<Client, Error> {
        let ports = self.ports.ok_or_else(|| {
            Error::InvalidArgument("an HTTP transport is required to build a client".into())
        })?;
        let (name, version) = self
            .provider
            .ok_or_else(|| Error::InvalidArgument("a provider is required".into()))?;
        let chain_ref = self
            .chain
            .ok_or_else(|| Error::InvalidArgument("a chain is required".into()))?;

        let providers = self.providers.unwrap_or_else(default_provider_registry);
        let chains = self.chains.unwrap_or_else(default_chain_registry);

        let def = providers.get(&name, &version)?;
        let chain = chains.resolve(&chain_ref)?;
        let mut scanner = Scanner::new(def, chain, self.api_key)?;
        if let Some(base) = self.base_url {
            scanner.set_base_url(base);
        }

        Ok(Client {
            scanner,
            ports,
            closed: AtomicBool::new(false),
        })
    }
}
