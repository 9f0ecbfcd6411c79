//! Built-in chain table.
//!
//! Chain ids, names, aliases and per-provider mapping hints for the networks
//! the bundled providers jointly serve. The table feeds
//! [`crate::chain::default_chain_registry`] and is immutable at runtime.

use crate::chain::{BlockscoutHint, ChainInfo, EtherscanHint, MoralisHint};

/// Ethereum Mainnet chain id.
pub const ETHEREUM: u64 = 1;

/// Sepolia testnet chain id.
pub const SEPOLIA: u64 = 11_155_111;

/// Holesky testnet chain id.
pub const HOLESKY: u64 = 17_000;

/// BNB Smart Chain chain id.
pub const BSC: u64 = 56;

/// Polygon PoS chain id.
pub const POLYGON: u64 = 137;

/// OP Mainnet chain id.
pub const OPTIMISM: u64 = 10;

/// Arbitrum One chain id.
pub const ARBITRUM: u64 = 42_161;

/// Base Mainnet chain id.
pub const BASE: u64 = 8453;

/// Base Sepolia testnet chain id.
pub const BASE_SEPOLIA: u64 = 84_532;

/// Gnosis chain id.
pub const GNOSIS: u64 = 100;

/// Fantom Opera chain id.
pub const FANTOM: u64 = 250;

/// Avalanche C-Chain chain id.
pub const AVALANCHE: u64 = 43_114;

/// Celo Mainnet chain id.
pub const CELO: u64 = 42_220;

/// Linea Mainnet chain id.
pub const LINEA: u64 = 59_144;

/// Scroll Mainnet chain id.
pub const SCROLL: u64 = 534_352;

/// Blast Mainnet chain id.
pub const BLAST: u64 = 81_457;

/// Returns the built-in chain table.
#[must_use]
pub fn known_chains() -> Vec<ChainInfo> {
    vec![
        chain(ETHEREUM, "ethereum", "Ethereum", "ETH")
            .aliases(&["eth", "mainnet"])
            .etherscan("api.etherscan.io", "etherscan")
            .blockscout("eth.blockscout.com")
            .moralis("0x1"),
        chain(SEPOLIA, "sepolia", "Ethereum Sepolia", "ETH")
            .aliases(&["ethereum-sepolia"])
            .testnet()
            .etherscan("api-sepolia.etherscan.io", "etherscan")
            .blockscout("eth-sepolia.blockscout.com")
            .moralis("0xaa36a7"),
        chain(HOLESKY, "holesky", "Ethereum Holesky", "ETH")
            .aliases(&["ethereum-holesky"])
            .testnet()
            .etherscan("api-holesky.etherscan.io", "etherscan")
            .blockscout("eth-holesky.blockscout.com")
            .moralis("0x4268"),
        chain(BSC, "bsc", "BNB Smart Chain", "BNB")
            .aliases(&["binance", "bnb"])
            .etherscan("api.bscscan.com", "bscscan")
            .moralis("0x38"),
        chain(POLYGON, "polygon", "Polygon PoS", "POL")
            .aliases(&["matic"])
            .etherscan("api.polygonscan.com", "polygonscan")
            .blockscout("polygon.blockscout.com")
            .moralis("0x89"),
        chain(OPTIMISM, "optimism", "OP Mainnet", "ETH")
            .aliases(&["op"])
            .etherscan("api-optimistic.etherscan.io", "etherscan")
            .blockscout("optimism.blockscout.com")
            .moralis("0xa"),
        chain(ARBITRUM, "arbitrum", "Arbitrum One", "ETH")
            .aliases(&["arb", "arbitrum-one"])
            .etherscan("api.arbiscan.io", "arbiscan")
            .blockscout("arbitrum.blockscout.com")
            .moralis("0xa4b1"),
        chain(BASE, "base", "Base", "ETH")
            .etherscan("api.basescan.org", "basescan")
            .blockscout("base.blockscout.com")
            .moralis("0x2105"),
        chain(BASE_SEPOLIA, "base-sepolia", "Base Sepolia", "ETH")
            .testnet()
            .etherscan("api-sepolia.basescan.org", "basescan")
            .blockscout("base-sepolia.blockscout.com")
            .moralis("0x14a34"),
        chain(GNOSIS, "gnosis", "Gnosis", "XDAI")
            .aliases(&["xdai"])
            .etherscan("api.gnosisscan.io", "gnosisscan")
            .blockscout("gnosis.blockscout.com")
            .moralis("0x64"),
        chain(FANTOM, "fantom", "Fantom Opera", "FTM")
            .aliases(&["ftm"])
            .etherscan("api.ftmscan.com", "ftmscan")
            .moralis("0xfa"),
        chain(AVALANCHE, "avalanche", "Avalanche C-Chain", "AVAX")
            .aliases(&["avax"])
            .etherscan("api.snowtrace.io", "snowtrace")
            .moralis("0xa86a"),
        chain(CELO, "celo", "Celo", "CELO")
            .etherscan("api.celoscan.io", "celoscan")
            .blockscout("celo.blockscout.com"),
        chain(LINEA, "linea", "Linea", "ETH")
            .etherscan("api.lineascan.build", "lineascan")
            .moralis("0xe708"),
        chain(SCROLL, "scroll", "Scroll", "ETH")
            .etherscan("api.scrollscan.com", "scrollscan")
            .blockscout("scroll.blockscout.com"),
        chain(BLAST, "blast", "Blast", "ETH").etherscan("api.blastscan.io", "blastscan"),
    ]
}

fn chain(chain_id: u64, name: &str, display_name: &str, ticker: &str) -> ChainInfo {
    ChainInfo {
        chain_id,
        name: name.to_owned(),
        display_name: display_name.to_owned(),
        aliases: vec![],
        ticker: ticker.to_owned(),
        testnet: false,
        etherscan: None,
        blockscout: None,
        moralis: None,
    }
}

impl ChainInfo {
    fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| (*a).to_owned()).collect();
        self
    }

    fn testnet(mut self) -> Self {
        self.testnet = true;
        self
    }

    fn etherscan(mut self, host: &str, kind: &str) -> Self {
        self.etherscan = Some(EtherscanHint {
            host: host.to_owned(),
            kind: kind.to_owned(),
        });
        self
    }

    fn blockscout(mut self, host: &str) -> Self {
        self.blockscout = Some(BlockscoutHint {
            host: host.to_owned(),
        });
        self
    }

    fn moralis(mut self, hex_id: &str) -> Self {
        self.moralis = Some(MoralisHint {
            hex_id: hex_id.to_owned(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_unique_ids_and_names() {
        let chains = known_chains();
        let mut ids: Vec<u64> = chains.iter().map(|c| c.chain_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), chains.len());

        let mut names: Vec<String> = chains
            .iter()
            .flat_map(|c| std::iter::once(c.name.clone()).chain(c.aliases.iter().cloned()))
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_hex_hints_match_chain_ids() {
        for info in known_chains() {
            if let Some(hint) = &info.moralis {
                let parsed =
                    u64::from_str_radix(hint.hex_id.trim_start_matches("0x"), 16).unwrap();
                assert_eq!(parsed, info.chain_id, "hex hint mismatch for {}", info.name);
            }
        }
    }

    #[test]
    fn test_aliases_are_lowercase() {
        for info in known_chains() {
            assert_eq!(info.name, info.name.to_lowercase());
            for alias in &info.aliases {
                assert_eq!(alias, &alias.to_lowercase());
            }
        }
    }
}
