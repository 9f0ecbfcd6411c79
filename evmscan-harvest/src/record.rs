//! Record ordering and deduplication.
//!
//! Harvested records stay opaque JSON except for two derived keys: the
//! ordering key (block number, transaction index, log index) and the
//! deduplication key. Numeric fields arrive as hex or decimal strings
//! depending on the provider, so both encodings are parsed and compared
//! numerically.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

use alloy_primitives::U256;
use evmscan::method::Method;
use serde_json::Value;

/// (block number, transaction index, log index) of one record.
type OrderKey = (U256, U256, Option<U256>);

const BLOCK_FIELDS: [&str; 2] = ["blockNumber", "block_number"];
const TX_INDEX_FIELDS: [&str; 2] = ["transactionIndex", "transaction_index"];
const LOG_INDEX_FIELDS: [&str; 2] = ["logIndex", "log_index"];
const HASH_FIELDS: [&str; 3] = ["hash", "transactionHash", "transaction_hash"];
const TRACE_FIELDS: [&str; 2] = ["traceId", "trace_id"];

/// Deduplicates, then totally orders a batch of records.
///
/// Order is (block, transaction index, log index) ascending; records without
/// a derivable block number go to the end in insertion order. The first
/// occurrence wins on duplicate keys.
pub(crate) fn merge(records: Vec<Value>, method: Method) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut decorated: Vec<(Option<OrderKey>, Value)> = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(dedup_key(&record, method)) {
            decorated.push((order_key(&record), record));
        }
    }
    decorated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    decorated.into_iter().map(|(_, record)| record).collect()
}

/// Derives the ordering key, when the record carries a block number.
pub(crate) fn order_key(record: &Value) -> Option<OrderKey> {
    let block = numeric(field(record, &BLOCK_FIELDS)?)?;
    let tx_index = field(record, &TX_INDEX_FIELDS)
        .and_then(numeric)
        .unwrap_or(U256::ZERO);
    let log_index = field(record, &LOG_INDEX_FIELDS).and_then(numeric);
    Some((block, tx_index, log_index))
}

/// Derives the deduplication key.
///
/// Transactions dedup on the hash; logs on (hash, log index); internal
/// transactions on (hash, trace id). Records lacking the discriminating
/// fields fall back to the exact JSON rendering, which removes true
/// duplicates without collapsing distinct records.
pub(crate) fn dedup_key(record: &Value, method: Method) -> String {
    let hash = field(record, &HASH_FIELDS).and_then(Value::as_str);
    let Some(hash) = hash else {
        return format!("raw:{record}");
    };
    match method {
        Method::EventLogs => match field(record, &LOG_INDEX_FIELDS).and_then(numeric) {
            Some(index) => format!("log:{hash}:{index}"),
            None => format!("raw:{record}"),
        },
        Method::AccountInternalTransactions => match field(record, &TRACE_FIELDS) {
            Some(trace) => format!("itx:{hash}:{trace}"),
            None => format!("raw:{record}"),
        },
        // ERC-20 transfer rows carry no per-log discriminator; two distinct
        // transfers inside one transaction share the hash.
        Method::AccountErc20Transfers => format!("raw:{record}"),
        _ => format!("tx:{hash}"),
    }
}

fn field<'v>(record: &'v Value, names: &[&str]) -> Option<&'v Value> {
    names.iter().find_map(|name| record.get(name))
}

/// Parses a numeric field given as a hex string, decimal string, or number.
fn numeric(value: &Value) -> Option<U256> {
    match value {
        Value::String(s) => U256::from_str(s.trim()).ok(),
        Value::Number(n) => n.as_u64().map(U256::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx(block: &str, index: &str, hash: &str) -> Value {
        json!({"blockNumber": block, "transactionIndex": index, "hash": hash})
    }

    #[test]
    fn test_hex_and_decimal_compare_numerically() {
        // 0x1f4 == 500; decimal 499 sorts before it, 501 after.
        let records = vec![
            tx("501", "0", "0xc"),
            tx("0x1f4", "0", "0xb"),
            tx("499", "0", "0xa"),
        ];
        let merged = merge(records, Method::AccountTransactions);
        let hashes: Vec<&str> = merged.iter().map(|r| r["hash"].as_str().unwrap()).collect();
        assert_eq!(hashes, ["0xa", "0xb", "0xc"]);
    }

    #[test]
    fn test_order_within_block_by_transaction_index() {
        let records = vec![
            tx("100", "0x2", "0xb"),
            tx("100", "10", "0xc"),
            tx("100", "1", "0xa"),
        ];
        let merged = merge(records, Method::AccountTransactions);
        let hashes: Vec<&str> = merged.iter().map(|r| r["hash"].as_str().unwrap()).collect();
        assert_eq!(hashes, ["0xa", "0xb", "0xc"]);
    }

    #[test]
    fn test_transactions_dedup_on_hash() {
        let records = vec![tx("1", "0", "0xa"), tx("1", "0", "0xa"), tx("2", "0", "0xb")];
        let merged = merge(records, Method::AccountTransactions);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_logs_dedup_on_hash_and_log_index() {
        let log = |index: &str| {
            json!({
                "blockNumber": "5",
                "transactionHash": "0xa",
                "logIndex": index,
            })
        };
        // 0x1 and 1 are the same log observed twice with different encodings.
        let records = vec![log("0x1"), log("1"), log("2")];
        let merged = merge(records, Method::EventLogs);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_internal_transactions_keep_distinct_traces() {
        let itx = |trace: &str| {
            json!({"blockNumber": "9", "hash": "0xparent", "traceId": trace, "value": "1"})
        };
        let records = vec![itx("0"), itx("0_1"), itx("0")];
        let merged = merge(records, Method::AccountInternalTransactions);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_erc20_transfers_in_one_transaction_survive() {
        let transfer = |to: &str| {
            json!({"blockNumber": "3", "hash": "0xsame", "to": to, "value": "10"})
        };
        let records = vec![transfer("0x1"), transfer("0x2"), transfer("0x1")];
        let merged = merge(records, Method::AccountErc20Transfers);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_unordered_records_keep_insertion_order_at_the_end() {
        let records = vec![
            json!({"note": "second", "hash": "0xy"}),
            tx("7", "0", "0xa"),
            json!({"note": "third", "hash": "0xz"}),
        ];
        let merged = merge(records, Method::AccountTransactions);
        assert_eq!(merged[0]["hash"], "0xa");
        assert_eq!(merged[1]["note"], "second");
        assert_eq!(merged[2]["note"], "third");
    }
}
