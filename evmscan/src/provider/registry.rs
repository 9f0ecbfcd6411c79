//! Provider registry.
//!
//! A process-wide mapping from `(provider name, version)` to a
//! [`ProviderDef`]. The built-in registry is populated once with the bundled
//! definitions and read-only afterwards. It holds no adapter instances;
//! scanners are constructed per client.

use std::sync::{Arc, LazyLock};

use crate::chain::{ChainInfo, default_chain_registry};
use crate::error::Error;
use crate::provider::{ProviderDef, blockscout, etherscan, moralis};

/// Lookup of provider definitions by name and version.
#[derive(Debug)]
pub struct ProviderRegistry {
    defs: Vec<Arc<ProviderDef>>,
}

impl ProviderRegistry {
    /// Builds a registry from explicit definitions.
    #[must_use]
    pub fn new(defs: Vec<ProviderDef>) -> Self {
        Self {
            defs: defs.into_iter().map(Arc::new).collect(),
        }
    }

    /// The bundled definitions: Etherscan v1 and v2, Blockscout, Moralis.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            etherscan::v1(),
            etherscan::v2(),
            blockscout::v1(),
            moralis::v1(),
        ])
    }

    /// Looks up a definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProvider`] when nothing is registered under
    /// the name/version pair.
    pub fn get(&self, name: &str, version: &str) -> Result<Arc<ProviderDef>, Error> {
        self.defs
            .iter()
            .find(|def| def.name == name && def.version == version)
            .cloned()
            .ok_or_else(|| Error::UnknownProvider {
                name: name.to_owned(),
                version: version.to_owned(),
            })
    }

    /// Lists registered (name, version) pairs in registration order.
    #[must_use]
    pub fn providers(&self) -> Vec<(&'static str, &'static str)> {
        self.defs.iter().map(|def| (def.name, def.version)).collect()
    }
}

static DEFAULT: LazyLock<Arc<ProviderRegistry>> =
    LazyLock::new(|| Arc::new(ProviderRegistry::builtin()));

/// The built-in provider registry, constructed once on first use.
#[must_use]
pub fn default_provider_registry() -> Arc<ProviderRegistry> {
    Arc::clone(&DEFAULT)
}

/// Lists the chains a provider serves, optionally filtered by the testnet
/// flag.
///
/// # Errors
///
/// Returns [`Error::UnknownProvider`] when the provider is not registered.
pub fn supported_chains(
    name: &str,
    version: &str,
    testnet: Option<bool>,
) -> Result<Vec<Arc<ChainInfo>>, Error> {
    let def = default_provider_registry().get(name, version)?;
    Ok(default_chain_registry()
        .iter()
        .filter(|chain| def.supports_chain(chain))
        .filter(|chain| testnet.is_none_or(|t| chain.testnet == t))
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_providers_are_registered() {
        let registry = default_provider_registry();
        let providers = registry.providers();
        assert!(providers.contains(&("etherscan", "v1")));
        assert!(providers.contains(&("etherscan", "v2")));
        assert!(providers.contains(&("blockscout", "v1")));
        assert!(providers.contains(&("moralis", "v1")));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let registry = default_provider_registry();
        let err = registry.get("covalent", "v1").unwrap_err();
        assert!(matches!(err, Error::UnknownProvider { .. }));
        let err = registry.get("etherscan", "v9").unwrap_err();
        assert!(matches!(err, Error::UnknownProvider { .. }));
    }

    #[test]
    fn test_supported_chains_follow_hints() {
        let chains = supported_chains("blockscout", "v1", None).unwrap();
        assert!(chains.iter().all(|c| c.blockscout.is_some()));
        assert!(chains.iter().any(|c| c.chain_id == 1));
        assert!(chains.iter().all(|c| c.chain_id != 81_457));

        let mainnets = supported_chains("moralis", "v1", Some(false)).unwrap();
        assert!(mainnets.iter().all(|c| !c.testnet && c.moralis.is_some()));
    }
}
