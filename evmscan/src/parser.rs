//! Response parsers.
//!
//! A [`Parser`] maps a provider's JSON payload to the logical result of a
//! call. Parsers are pure: the same bytes always produce the same outcome,
//! and they never look at anything but the payload. Provider-flavored
//! context (names, chain, method) is attached by the adapter when a fault
//! is converted into [`crate::error::Error`].

use serde_json::Value;

/// How a payload is reduced to the logical result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parser {
    /// Etherscan-family `{status, message, result}` envelope.
    Envelope,
    /// The payload is the result.
    Direct,
    /// Picks one field out of the payload; dots descend into nested objects.
    Field(&'static str),
}

/// A parser-level failure, before provider context is attached.
#[derive(Debug, thiserror::Error)]
pub enum ParseFault {
    /// The provider reported a structured error; message kept verbatim.
    #[error("{message}")]
    Provider {
        /// The provider's raw error message.
        message: String,
    },
    /// The payload shape did not match expectations.
    #[error("{message}")]
    Shape {
        /// What was wrong.
        message: String,
    },
}

/// Messages the Etherscan family uses for "zero rows matched", which is a
/// success, not an error.
const EMPTY_RESULT_PREFIXES: [&str; 2] = ["No transactions found", "No records found"];

impl Parser {
    /// Applies the parser to a raw response body.
    ///
    /// # Errors
    ///
    /// [`ParseFault::Provider`] when the payload is a well-formed provider
    /// error; [`ParseFault::Shape`] when it is not the shape this parser
    /// expects.
    pub fn parse(self, body: &[u8]) -> Result<Value, ParseFault> {
        let value: Value = serde_json::from_slice(body).map_err(|e| ParseFault::Shape {
            message: format!("invalid JSON: {e}"),
        })?;
        match self {
            Self::Direct => Ok(value),
            Self::Field(path) => pick(&value, path),
            Self::Envelope => envelope(&value),
        }
    }
}

fn envelope(value: &Value) -> Result<Value, ParseFault> {
    let status = value.get("status").ok_or_else(|| ParseFault::Shape {
        message: "envelope is missing the status field".to_owned(),
    })?;
    let status = match status {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if status == "1" {
        return Ok(value.get("result").cloned().unwrap_or(Value::Null));
    }

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if EMPTY_RESULT_PREFIXES.iter().any(|p| message.starts_with(p)) {
        return Ok(Value::Array(vec![]));
    }

    // The useful detail usually sits in `result` ("Invalid API Key"), with
    // `message` carrying only "NOTOK".
    let detail = match value.get("result") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => message.to_owned(),
    };
    Err(ParseFault::Provider { message: detail })
}

fn pick(value: &Value, path: &'static str) -> Result<Value, ParseFault> {
    let mut current = value;
    for part in path.split('.') {
        current = current.get(part).ok_or_else(|| ParseFault::Shape {
            message: format!("response is missing the {path:?} field"),
        })?;
    }
    Ok(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success() {
        let body = br#"{"status":"1","message":"OK","result":"4780000000000000000"}"#;
        let value = Parser::Envelope.parse(body).unwrap();
        assert_eq!(value, json!("4780000000000000000"));
    }

    #[test]
    fn test_envelope_empty_success_is_not_an_error() {
        for message in ["No transactions found", "No records found"] {
            let body = format!(r#"{{"status":"0","message":"{message}","result":[]}}"#);
            let value = Parser::Envelope.parse(body.as_bytes()).unwrap();
            assert_eq!(value, json!([]));
        }
    }

    #[test]
    fn test_envelope_error_prefers_result_string() {
        let body = br#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        let fault = Parser::Envelope.parse(body).unwrap_err();
        match fault {
            ParseFault::Provider { message } => assert_eq!(message, "Invalid API Key"),
            ParseFault::Shape { .. } => panic!("expected provider fault"),
        }
    }

    #[test]
    fn test_envelope_error_falls_back_to_message() {
        let body = br#"{"status":"0","message":"Query Timeout occured.","result":null}"#;
        let fault = Parser::Envelope.parse(body).unwrap_err();
        match fault {
            ParseFault::Provider { message } => assert_eq!(message, "Query Timeout occured."),
            ParseFault::Shape { .. } => panic!("expected provider fault"),
        }
    }

    #[test]
    fn test_envelope_missing_status_is_a_shape_fault() {
        let body = br#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#;
        let fault = Parser::Envelope.parse(body).unwrap_err();
        assert!(matches!(fault, ParseFault::Shape { .. }));
    }

    #[test]
    fn test_direct_returns_payload() {
        let body = br#"{"hash":"0xabc","value":"1"}"#;
        let value = Parser::Direct.parse(body).unwrap();
        assert_eq!(value, json!({"hash": "0xabc", "value": "1"}));
    }

    #[test]
    fn test_field_pick() {
        let body = br#"{"balance":"4780000000000000000"}"#;
        let value = Parser::Field("balance").parse(body).unwrap();
        assert_eq!(value, json!("4780000000000000000"));
    }

    #[test]
    fn test_field_pick_nested() {
        let body = br#"{"wallet":{"native":{"balance":"7"}}}"#;
        let value = Parser::Field("wallet.native.balance").parse(body).unwrap();
        assert_eq!(value, json!("7"));
    }

    #[test]
    fn test_field_pick_missing_is_a_shape_fault() {
        let fault = Parser::Field("balance").parse(br#"{"result":"1"}"#).unwrap_err();
        assert!(matches!(fault, ParseFault::Shape { .. }));
    }

    #[test]
    fn test_parsing_is_pure() {
        let body = br#"{"status":"1","message":"OK","result":[{"a":1}]}"#;
        let first = Parser::Envelope.parse(body).unwrap();
        let second = Parser::Envelope.parse(body).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_json_is_a_shape_fault() {
        let fault = Parser::Direct.parse(b"<html>busy</html>").unwrap_err();
        assert!(matches!(fault, ParseFault::Shape { .. }));
    }
}
