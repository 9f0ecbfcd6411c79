//! Etherscan-family provider definitions.
//!
//! Two generations share one endpoint table:
//!
//! - `v1` - one API host per chain (`api.etherscan.io`, `api.bscscan.com`,
//!   …), taken from the chain's Etherscan hint
//! - `v2` - a single multichain host with the decimal chain id injected as
//!   the `chainid` query parameter
//!
//! Every method is a GET against `/api` (v1) or `/v2/api` (v2) with a
//! `module` + `action` query skeleton and the `{status, message, result}`
//! envelope, except the `proxy` module calls which answer in JSON-RPC shape.

use std::collections::HashMap;

use crate::endpoint::EndpointSpec;
use crate::method::Method;
use crate::parser::Parser;
use crate::provider::{Auth, BaseUrl, ChainParam, HintKind, ProviderDef};

/// The Etherscan v1 definition: per-chain hosts, query-parameter auth.
#[must_use]
pub fn v1() -> ProviderDef {
    ProviderDef {
        name: "etherscan",
        version: "v1",
        auth: Auth::Query {
            param: "apikey",
            required: true,
        },
        base: BaseUrl::EtherscanHost,
        chain_param: ChainParam::None,
        hint: HintKind::Etherscan,
        methods: methods("/api"),
    }
}

/// The Etherscan v2 definition: one multichain host, `chainid` per call.
#[must_use]
pub fn v2() -> ProviderDef {
    ProviderDef {
        name: "etherscan",
        version: "v2",
        auth: Auth::Query {
            param: "apikey",
            required: true,
        },
        base: BaseUrl::Fixed("https://api.etherscan.io"),
        chain_param: ChainParam::QueryDecimal("chainid"),
        hint: HintKind::Etherscan,
        methods: methods("/v2/api"),
    }
}

/// The shared Etherscan-family endpoint table, rooted at the given path.
///
/// Blockscout reuses this table verbatim and overrides the handful of specs
/// its instances do not serve.
pub(crate) fn methods(path: &str) -> HashMap<Method, EndpointSpec> {
    let mut table = HashMap::new();

    table.insert(
        Method::AccountBalance,
        EndpointSpec::get(path)
            .query("module", "account")
            .query("action", "balance")
            .query("tag", "latest")
            .parser(Parser::Envelope),
    );
    table.insert(
        Method::AccountTransactions,
        EndpointSpec::get(path)
            .query("module", "account")
            .query("action", "txlist")
            .parser(Parser::Envelope),
    );
    table.insert(
        Method::AccountInternalTransactions,
        EndpointSpec::get(path)
            .query("module", "account")
            .query("action", "txlistinternal")
            .parser(Parser::Envelope),
    );
    table.insert(
        Method::AccountErc20Transfers,
        EndpointSpec::get(path)
            .query("module", "account")
            .query("action", "tokentx")
            .rename("contract_address", "contractaddress")
            .parser(Parser::Envelope),
    );
    table.insert(
        Method::TokenBalance,
        EndpointSpec::get(path)
            .query("module", "account")
            .query("action", "tokenbalance")
            .query("tag", "latest")
            .rename("contract_address", "contractaddress")
            .parser(Parser::Envelope),
    );
    table.insert(
        Method::TransactionByHash,
        EndpointSpec::get(path)
            .query("module", "proxy")
            .query("action", "eth_getTransactionByHash")
            .parser(Parser::Field("result"))
            .cacheable(),
    );
    table.insert(
        Method::TransactionReceiptStatus,
        EndpointSpec::get(path)
            .query("module", "transaction")
            .query("action", "gettxreceiptstatus")
            .parser(Parser::Envelope)
            .cacheable(),
    );
    table.insert(
        Method::BlockByNumber,
        EndpointSpec::get(path)
            .query("module", "proxy")
            .query("action", "eth_getBlockByNumber")
            .query("boolean", "true")
            .rename("block", "tag")
            .parser(Parser::Field("result"))
            .cacheable(),
    );
    table.insert(
        Method::BlockReward,
        EndpointSpec::get(path)
            .query("module", "block")
            .query("action", "getblockreward")
            .rename("block", "blockno")
            .parser(Parser::Envelope)
            .cacheable(),
    );
    table.insert(
        Method::EventLogs,
        EndpointSpec::get(path)
            .query("module", "logs")
            .query("action", "getLogs")
            .rename("startblock", "fromBlock")
            .rename("endblock", "toBlock")
            .parser(Parser::Envelope),
    );
    table.insert(
        Method::ContractAbi,
        EndpointSpec::get(path)
            .query("module", "contract")
            .query("action", "getabi")
            .parser(Parser::Envelope)
            .cacheable(),
    );
    table.insert(
        Method::ContractSource,
        EndpointSpec::get(path)
            .query("module", "contract")
            .query("action", "getsourcecode")
            .parser(Parser::Envelope)
            .cacheable(),
    );
    table.insert(
        Method::GasOracle,
        EndpointSpec::get(path)
            .query("module", "gastracker")
            .query("action", "gasoracle")
            .parser(Parser::Envelope),
    );
    table.insert(
        Method::EthPrice,
        EndpointSpec::get(path)
            .query("module", "stats")
            .query("action", "ethprice")
            .parser(Parser::Envelope),
    );
    table.insert(
        Method::EthSupply,
        EndpointSpec::get(path)
            .query("module", "stats")
            .query("action", "ethsupply")
            .parser(Parser::Envelope),
    );

    table
}
