//! Blockscout provider definition.
//!
//! Blockscout instances expose an Etherscan-compatible API under
//! `https://{instance}/api`, so the definition is the Etherscan table with a
//! different base-URL rule. Instances take an optional `apikey` but never
//! require one. Endpoints Blockscout does not serve are removed from the
//! table, so calling them fails with `MethodNotSupported` before any I/O.

use crate::method::Method;
use crate::provider::{Auth, BaseUrl, ChainParam, HintKind, ProviderDef, etherscan};

/// The Blockscout definition.
#[must_use]
pub fn v1() -> ProviderDef {
    let mut methods = etherscan::methods("/api");
    // No gas-tracker module, and coin price lives outside the compat API.
    methods.remove(&Method::GasOracle);
    methods.remove(&Method::EthPrice);

    ProviderDef {
        name: "blockscout",
        version: "v1",
        auth: Auth::Query {
            param: "apikey",
            required: false,
        },
        base: BaseUrl::BlockscoutHost,
        chain_param: ChainParam::None,
        hint: HintKind::Blockscout,
        methods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_methods_are_absent() {
        let def = v1();
        assert!(!def.methods.contains_key(&Method::GasOracle));
        assert!(!def.methods.contains_key(&Method::EthPrice));
        assert!(def.methods.contains_key(&Method::AccountBalance));
        assert!(def.methods.contains_key(&Method::EventLogs));
    }

    #[test]
    fn test_key_is_optional() {
        assert_eq!(
            v1().auth,
            Auth::Query {
                param: "apikey",
                required: false
            }
        );
    }
}
