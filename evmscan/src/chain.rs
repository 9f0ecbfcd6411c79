//! Chain metadata and resolution.
//!
//! - [`ChainInfo`] - immutable metadata for one EVM chain, including the
//!   per-provider mapping hints
//! - [`ChainRef`] - a caller-supplied chain reference (numeric id, canonical
//!   name, or alias)
//! - [`ChainRegistry`] - resolves references to [`ChainInfo`] and lists
//!   chains by filter
//!
//! The built-in registry (see [`crate::networks`]) is constructed once and
//! treated as immutable; tests inject their own through
//! [`crate::client::ClientBuilder`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use serde::Serialize;

use crate::error::Error;
use crate::networks;

/// Hint tying a chain to the Etherscan family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtherscanHint {
    /// v1 API host, e.g. `api.etherscan.io` or `api.bscscan.com`.
    pub host: String,
    /// Family brand serving this chain, e.g. `etherscan`, `bscscan`.
    pub kind: String,
}

/// Hint tying a chain to a Blockscout instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockscoutHint {
    /// Instance hostname, e.g. `eth.blockscout.com`.
    pub host: String,
}

/// Hint tying a chain to the Moralis Web3 data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoralisHint {
    /// Hex-encoded chain id as Moralis expects it, e.g. `0x1`.
    pub hex_id: String,
}

/// Immutable metadata for one chain.
///
/// A per-provider hint is present exactly when the chain is supported by
/// that provider; adapters derive both their support set and their base URLs
/// from the hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainInfo {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Canonical short name, lowercase.
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Lowercase aliases, unique across the registry.
    pub aliases: Vec<String>,
    /// Native currency ticker.
    pub ticker: String,
    /// Whether this is a test network.
    pub testnet: bool,
    /// Etherscan-family mapping hint, when supported.
    pub etherscan: Option<EtherscanHint>,
    /// Blockscout instance hint, when supported.
    pub blockscout: Option<BlockscoutHint>,
    /// Moralis mapping hint, when supported.
    pub moralis: Option<MoralisHint>,
}

/// A caller-supplied chain reference.
///
/// Strings made of ASCII digits convert to [`ChainRef::Id`]; anything else
/// is treated as a name or alias and matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChainRef {
    /// Numeric EIP-155 chain id.
    Id(u64),
    /// Canonical name or alias.
    Name(String),
}

impl From<u64> for ChainRef {
    fn from(value: u64) -> Self {
        Self::Id(value)
    }
}

impl From<&str> for ChainRef {
    fn from(value: &str) -> Self {
        value
            .parse::<u64>()
            .map_or_else(|_| Self::Name(value.to_owned()), Self::Id)
    }
}

impl From<String> for ChainRef {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&ChainInfo> for ChainRef {
    fn from(value: &ChainInfo) -> Self {
        Self::Id(value.chain_id)
    }
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Registry of known chains, resolvable by id, name, or alias.
#[derive(Debug)]
pub struct ChainRegistry {
    chains: Vec<Arc<ChainInfo>>,
    by_id: HashMap<u64, usize>,
    by_name: HashMap<String, usize>,
}

impl ChainRegistry {
    /// Builds a registry from a chain table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when two chains share an id, or
    /// when a name or alias appears more than once across the table.
    pub fn new(chains: Vec<ChainInfo>) -> Result<Self, Error> {
        let chains: Vec<Arc<ChainInfo>> = chains.into_iter().map(Arc::new).collect();
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();

        for (index, chain) in chains.iter().enumerate() {
            if by_id.insert(chain.chain_id, index).is_some() {
                return Err(Error::InvalidArgument(format!(
                    "duplicate chain id {}",
                    chain.chain_id
                )));
            }
            for key in std::iter::once(&chain.name).chain(chain.aliases.iter()) {
                let key = key.to_lowercase();
                if by_name.insert(key.clone(), index).is_some() {
                    return Err(Error::InvalidArgument(format!(
                        "duplicate chain name or alias {key:?}"
                    )));
                }
            }
        }

        Ok(Self {
            chains,
            by_id,
            by_name,
        })
    }

    /// Resolves a chain reference to its [`ChainInfo`].
    ///
    /// Numeric references look up the chain id directly; string references
    /// are lowercased and matched against canonical names, then aliases.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChain`] carrying the input verbatim and the
    /// closest known names by case-insensitive prefix.
    pub fn resolve(&self, chain: &ChainRef) -> Result<Arc<ChainInfo>, Error> {
        let index = match chain {
            ChainRef::Id(id) => self.by_id.get(id),
            ChainRef::Name(name) => self.by_name.get(&name.trim().to_lowercase()),
        };
        index
            .map(|&i| Arc::clone(&self.chains[i]))
            .ok_or_else(|| Error::UnknownChain {
                input: chain.to_string(),
                suggestions: match chain {
                    ChainRef::Id(_) => vec![],
                    ChainRef::Name(name) => self.suggestions(name),
                },
            })
    }

    /// Looks up a chain by numeric id.
    #[must_use]
    pub fn get(&self, chain_id: u64) -> Option<Arc<ChainInfo>> {
        self.by_id.get(&chain_id).map(|&i| Arc::clone(&self.chains[i]))
    }

    /// Iterates all chains in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ChainInfo>> {
        self.chains.iter()
    }

    /// Lists chains, optionally filtered by the testnet flag.
    #[must_use]
    pub fn list(&self, testnet: Option<bool>) -> Vec<Arc<ChainInfo>> {
        self.chains
            .iter()
            .filter(|c| testnet.is_none_or(|t| c.testnet == t))
            .cloned()
            .collect()
    }

    fn suggestions(&self, input: &str) -> Vec<String> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return vec![];
        }
        let mut matches: Vec<String> = self
            .by_name
            .keys()
            .filter(|known| known.starts_with(&needle) || needle.starts_with(known.as_str()))
            .cloned()
            .collect();
        matches.sort();
        matches.truncate(5);
        matches
    }
}

static DEFAULT: LazyLock<Arc<ChainRegistry>> = LazyLock::new(|| {
    Arc::new(
        ChainRegistry::new(networks::known_chains()).expect("built-in chain table is consistent"),
    )
});

/// The built-in chain registry, constructed once on first use.
#[must_use]
pub fn default_chain_registry() -> Arc<ChainRegistry> {
    Arc::clone(&DEFAULT)
}
