//! Moralis provider definition.
//!
//! Moralis is a REST-style Web3 data API: one host, resource paths with
//! `{address}` / `{txhash}` / `{block_number}` placeholders, the chain
//! conveyed as a hex id in the `chain` query parameter, and an `x-api-key`
//! header for authentication. Responses are plain JSON; field-pick parsers
//! extract the logical value where the payload wraps it.

use std::collections::HashMap;

use crate::endpoint::EndpointSpec;
use crate::method::Method;
use crate::parser::Parser;
use crate::provider::{Auth, BaseUrl, ChainParam, HintKind, ProviderDef};

/// The Moralis definition.
#[must_use]
pub fn v1() -> ProviderDef {
    ProviderDef {
        name: "moralis",
        version: "v1",
        auth: Auth::Header {
            name: "x-api-key",
            required: true,
        },
        base: BaseUrl::Fixed("https://deep-index.moralis.io/api/v2.2"),
        chain_param: ChainParam::QueryHex("chain"),
        hint: HintKind::Moralis,
        methods: methods(),
    }
}

fn methods() -> HashMap<Method, EndpointSpec> {
    let mut table = HashMap::new();

    table.insert(
        Method::AccountBalance,
        EndpointSpec::get("/{address}/balance").parser(Parser::Field("balance")),
    );
    table.insert(
        Method::AccountTransactions,
        EndpointSpec::get("/{address}")
            .rename("startblock", "from_block")
            .rename("endblock", "to_block")
            .rename("offset", "limit")
            .parser(Parser::Field("result")),
    );
    table.insert(
        Method::AccountErc20Transfers,
        EndpointSpec::get("/{address}/erc20/transfers")
            .rename("startblock", "from_block")
            .rename("endblock", "to_block")
            .rename("offset", "limit")
            .parser(Parser::Field("result")),
    );
    table.insert(
        Method::TokenBalance,
        EndpointSpec::get("/{address}/erc20")
            .rename("contract_address", "token_addresses")
            .parser(Parser::Direct),
    );
    table.insert(
        Method::TransactionByHash,
        EndpointSpec::get("/transaction/{txhash}")
            .parser(Parser::Direct)
            .cacheable(),
    );
    table.insert(
        Method::BlockByNumber,
        EndpointSpec::get("/block/{block_number}")
            .parser(Parser::Direct)
            .cacheable(),
    );
    table.insert(
        Method::EventLogs,
        EndpointSpec::get("/{address}/logs")
            .rename("startblock", "from_block")
            .rename("endblock", "to_block")
            .rename("offset", "limit")
            .parser(Parser::Field("result")),
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parameters_are_bound() {
        let def = v1();
        assert_eq!(
            def.methods[&Method::AccountBalance].path_params(),
            ["address".to_owned()]
        );
        assert_eq!(
            def.methods[&Method::TransactionByHash].path_params(),
            ["txhash".to_owned()]
        );
        assert_eq!(
            def.methods[&Method::BlockByNumber].path_params(),
            ["block_number".to_owned()]
        );
    }

    #[test]
    fn test_unimplemented_methods_are_absent() {
        let def = v1();
        assert!(!def.methods.contains_key(&Method::AccountInternalTransactions));
        assert!(!def.methods.contains_key(&Method::ContractAbi));
        assert!(!def.methods.contains_key(&Method::GasOracle));
    }
}
