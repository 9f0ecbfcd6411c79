//! Error taxonomy shared by every layer of the client.
//!
//! Each variant corresponds to one failure kind a caller can act on; the
//! [`ErrorKind`] accessor gives a stable machine-readable tag for matching
//! and telemetry while the `Display` output stays human-readable.

use crate::method::Method;

/// Errors produced by chain resolution, provider dispatch, and the
/// infrastructure ports.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The chain reference did not resolve against the chain registry.
    #[error("unknown chain reference {input:?}{}", format_suggestions(.suggestions))]
    UnknownChain {
        /// The caller's input, verbatim.
        input: String,
        /// Closest known names by case-insensitive prefix.
        suggestions: Vec<String>,
    },

    /// No provider is registered under the given name and version.
    #[error("unknown provider {name:?} version {version:?}")]
    UnknownProvider {
        /// Requested provider name.
        name: String,
        /// Requested provider version.
        version: String,
    },

    /// The resolved chain carries no mapping hint for the chosen provider.
    #[error("chain {chain} is not supported by provider {provider}")]
    ChainNotSupported {
        /// Provider name.
        provider: String,
        /// Chain display name.
        chain: String,
    },

    /// The provider has no endpoint for the requested logical method.
    #[error("provider {provider} does not implement {method} on {chain}")]
    MethodNotSupported {
        /// Provider name.
        provider: String,
        /// Chain display name.
        chain: String,
        /// The unimplemented logical method.
        method: Method,
    },

    /// A required parameter is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The provider demands an API key and none was supplied.
    #[error("provider {provider} requires an API key")]
    AuthRequired {
        /// Provider name.
        provider: String,
    },

    /// The provider signaled quota exhaustion and retries gave up.
    #[error("rate limited by {provider} for {method} on {chain}")]
    RateLimited {
        /// Provider name.
        provider: String,
        /// Chain display name.
        chain: String,
        /// The throttled logical method.
        method: Method,
    },

    /// The provider returned a structured error; its raw message is kept
    /// verbatim.
    #[error("provider error from {provider} for {method} on {chain}: {message}")]
    Provider {
        /// Provider name.
        provider: String,
        /// Chain display name.
        chain: String,
        /// The failing logical method.
        method: Method,
        /// HTTP status, when the failure came with one.
        status: Option<u16>,
        /// The provider's raw error message.
        message: String,
    },

    /// DNS, TCP, TLS or I/O failure, surfaced after retries gave up.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },

    /// The response did not match the shape the parser expects.
    #[error("unexpected response shape from {provider} for {method}: {message}")]
    Parse {
        /// Provider name.
        provider: String,
        /// The logical method whose response failed to parse.
        method: Method,
        /// What was wrong with the payload.
        message: String,
    },

    /// The operation was canceled through its cancellation token.
    #[error("operation canceled")]
    Canceled,
}

impl Error {
    /// The stable machine-readable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownChain { .. } => ErrorKind::UnknownChain,
            Self::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            Self::ChainNotSupported { .. } => ErrorKind::ChainNotSupported,
            Self::MethodNotSupported { .. } => ErrorKind::MethodNotSupported,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::AuthRequired { .. } => ErrorKind::AuthRequired,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Canceled => ErrorKind::Canceled,
        }
    }

    /// Whether a retry policy may reasonably retry this error.
    ///
    /// Transport failures, rate limiting, and provider-side 5xx statuses are
    /// transient; everything else is definitive.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::RateLimited { .. } => true,
            Self::Provider {
                status: Some(status),
                ..
            } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status attached to this error, if any.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => *status,
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Stable machine-readable error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Chain reference does not resolve.
    UnknownChain,
    /// Provider name/version not registered.
    UnknownProvider,
    /// Chain lacks hints for the chosen provider.
    ChainNotSupported,
    /// Provider has no endpoint for the method.
    MethodNotSupported,
    /// Missing or malformed argument.
    InvalidArgument,
    /// API key required but absent.
    AuthRequired,
    /// Quota exhausted after retries.
    RateLimited,
    /// Structured provider-side error.
    Provider,
    /// Transport-level failure.
    Transport,
    /// Response shape mismatch.
    Parse,
    /// Canceled mid-operation.
    Canceled,
}

impl ErrorKind {
    /// Snake-case tag for logs and telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownChain => "unknown_chain",
            Self::UnknownProvider => "unknown_provider",
            Self::ChainNotSupported => "chain_not_supported",
            Self::MethodNotSupported => "method_not_supported",
            Self::InvalidArgument => "invalid_argument",
            Self::AuthRequired => "auth_required",
            Self::RateLimited => "rate_limited",
            Self::Provider => "provider_error",
            Self::Transport => "transport_error",
            Self::Parse => "parse_error",
            Self::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (closest matches: {})", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable() {
        let err = Error::RateLimited {
            provider: "etherscan".to_owned(),
            chain: "Ethereum".to_owned(),
            method: Method::AccountBalance,
        };
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.kind().as_str(), "rate_limited");
        assert_eq!(err.http_status(), Some(429));
    }

    #[test]
    fn test_transient_classification() {
        let transport = Error::Transport {
            message: "connection reset".to_owned(),
        };
        assert!(transport.is_transient());

        let server_error = Error::Provider {
            provider: "etherscan".to_owned(),
            chain: "Ethereum".to_owned(),
            method: Method::AccountBalance,
            status: Some(502),
            message: "HTTP 502".to_owned(),
        };
        assert!(server_error.is_transient());

        let client_error = Error::Provider {
            provider: "etherscan".to_owned(),
            chain: "Ethereum".to_owned(),
            method: Method::AccountBalance,
            status: Some(400),
            message: "bad request".to_owned(),
        };
        assert!(!client_error.is_transient());
        assert!(!Error::Canceled.is_transient());
    }

    #[test]
    fn test_unknown_chain_message_includes_input_and_suggestions() {
        let err = Error::UnknownChain {
            input: "pollygon".to_owned(),
            suggestions: vec!["polygon".to_owned()],
        };
        let message = err.to_string();
        assert!(message.contains("pollygon"));
        assert!(message.contains("polygon"));

        let bare = Error::UnknownChain {
            input: "999".to_owned(),
            suggestions: vec![],
        };
        assert!(!bare.to_string().contains("closest"));
    }
}
