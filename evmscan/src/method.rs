//! The provider-agnostic method surface.
//!
//! [`Method`] is a closed enumeration: every explorer operation the library
//! can dispatch is named here, and each provider advertises the subset it
//! implements through its endpoint table.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// A provider-agnostic explorer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Native-currency balance of an address.
    AccountBalance,
    /// Normal (external) transactions of an address.
    AccountTransactions,
    /// Internal (trace) transactions of an address.
    AccountInternalTransactions,
    /// ERC-20 transfer events touching an address.
    AccountErc20Transfers,
    /// ERC-20 token balance of an address for one contract.
    TokenBalance,
    /// A transaction looked up by hash.
    TransactionByHash,
    /// Execution status of a transaction receipt.
    TransactionReceiptStatus,
    /// A block looked up by number.
    BlockByNumber,
    /// Mining reward breakdown of a block.
    BlockReward,
    /// Event logs matching an address and block interval.
    EventLogs,
    /// Verified contract ABI.
    ContractAbi,
    /// Verified contract source code.
    ContractSource,
    /// Current gas price oracle readings.
    GasOracle,
    /// Native currency market price.
    EthPrice,
    /// Total native currency supply.
    EthSupply,
}

impl Method {
    /// Every logical method, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::AccountBalance,
        Self::AccountTransactions,
        Self::AccountInternalTransactions,
        Self::AccountErc20Transfers,
        Self::TokenBalance,
        Self::TransactionByHash,
        Self::TransactionReceiptStatus,
        Self::BlockByNumber,
        Self::BlockReward,
        Self::EventLogs,
        Self::ContractAbi,
        Self::ContractSource,
        Self::GasOracle,
        Self::EthPrice,
        Self::EthSupply,
    ];

    /// Snake-case name used in cache keys, logs and telemetry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccountBalance => "account_balance",
            Self::AccountTransactions => "account_transactions",
            Self::AccountInternalTransactions => "account_internal_transactions",
            Self::AccountErc20Transfers => "account_erc20_transfers",
            Self::TokenBalance => "token_balance",
            Self::TransactionByHash => "transaction_by_hash",
            Self::TransactionReceiptStatus => "transaction_receipt_status",
            Self::BlockByNumber => "block_by_number",
            Self::BlockReward => "block_reward",
            Self::EventLogs => "event_logs",
            Self::ContractAbi => "contract_abi",
            Self::ContractSource => "contract_source",
            Self::GasOracle => "gas_oracle",
            Self::EthPrice => "eth_price",
            Self::EthSupply => "eth_supply",
        }
    }

    /// Whether this method returns records scoped to a block interval and is
    /// therefore eligible for bulk harvesting.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(
            self,
            Self::AccountTransactions
                | Self::AccountInternalTransactions
                | Self::AccountErc20Transfers
                | Self::EventLogs
        )
    }

    /// Whether records of this method are identified by (transaction hash,
    /// log index) rather than transaction hash alone.
    #[must_use]
    pub const fn is_log_shaped(self) -> bool {
        matches!(self, Self::EventLogs)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidArgument(format!("unknown method {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for method in Method::ALL {
            let parsed: Method = method.as_str().parse().unwrap();
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let result: Result<Method, _> = "account_blance".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_ranged_methods() {
        assert!(Method::AccountTransactions.is_ranged());
        assert!(Method::EventLogs.is_ranged());
        assert!(!Method::AccountBalance.is_ranged());
        assert!(!Method::ContractAbi.is_ranged());
    }
}
