//! Declarative endpoint specifications.
//!
//! An [`EndpointSpec`] is data, not code: it describes how one logical
//! method maps onto a provider's wire format, covering the HTTP verb, path
//! template, static query skeleton, parameter renames and the parser for
//! the response. A small interpreter ([`EndpointSpec::build`]) turns the
//! caller's logical parameters into a [`WireCall`]; adding a provider never
//! requires touching the interpreter.

use crate::error::Error;
use crate::params::{ParamValue, Params};
use crate::parser::Parser;

/// A value encoding a provider demands for one parameter.
///
/// The set is closed; providers declare the transform on the spec instead
/// of special-casing it in dispatch code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTransform {
    /// Lowercase the rendered value.
    Lowercase,
}

/// Declarative description of one logical method on one provider.
///
/// Path templates may contain `{name}` placeholders; the placeholder names
/// are the logical parameter names bound to the path, and they are removed
/// from the query during dispatch.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    verb: http::Method,
    path: String,
    query: Vec<(String, String)>,
    renames: Vec<(String, String)>,
    transforms: Vec<(String, ValueTransform)>,
    path_params: Vec<String>,
    parser: Parser,
    cacheable: bool,
}

impl EndpointSpec {
    /// A GET endpoint at the given path template.
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(http::Method::GET, path)
    }

    /// A POST endpoint at the given path template.
    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(http::Method::POST, path)
    }

    fn new(verb: http::Method, path: &str) -> Self {
        Self {
            verb,
            path: path.to_owned(),
            query: vec![],
            renames: vec![],
            transforms: vec![],
            path_params: extract_placeholders(path),
            parser: Parser::Direct,
            cacheable: false,
        }
    }

    /// Adds a static query pair sent with every call.
    #[must_use]
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Renames a logical parameter to its wire name.
    ///
    /// Parameters without a rename, including ones the spec has never heard
    /// of, are forwarded under their logical names.
    #[must_use]
    pub fn rename(mut self, logical: &str, wire: &str) -> Self {
        self.renames.push((logical.to_owned(), wire.to_owned()));
        self
    }

    /// Declares a value transform for one logical parameter.
    #[must_use]
    pub fn transform(mut self, logical: &str, transform: ValueTransform) -> Self {
        self.transforms.push((logical.to_owned(), transform));
        self
    }

    /// Sets the response parser.
    #[must_use]
    pub fn parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    /// Marks the result as a function of final blocks, eligible for caching.
    #[must_use]
    pub fn cacheable(mut self) -> Self {
        self.cacheable = true;
        self
    }

    /// The HTTP verb of this endpoint.
    #[must_use]
    pub fn verb(&self) -> &http::Method {
        &self.verb
    }

    /// The path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Logical parameter names bound to path placeholders.
    #[must_use]
    pub fn path_params(&self) -> &[String] {
        &self.path_params
    }

    /// The response parser.
    #[must_use]
    pub fn response_parser(&self) -> Parser {
        self.parser
    }

    /// Whether results of this endpoint may be cached.
    #[must_use]
    pub const fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Interprets the spec against the caller's logical parameters.
    ///
    /// Renames recognized keys, substitutes path placeholders, and merges
    /// the static query skeleton. A caller-supplied value under a skeleton
    /// key replaces the skeleton default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a path placeholder has no
    /// matching parameter; no network activity happens in that case.
    pub fn build(&self, params: &Params) -> Result<WireCall, Error> {
        let mut segments = Vec::new();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            segments.push(self.fill_segment(segment, params)?);
        }

        let mut query = self.query.clone();
        for (key, value) in params.iter() {
            if self.path_params.iter().any(|p| p == key) {
                continue;
            }
            let wire = self
                .renames
                .iter()
                .find(|(logical, _)| logical == key)
                .map_or(key, |(_, wire)| wire.as_str());
            let rendered = self.render(key, value);
            if let Some(slot) = query.iter_mut().find(|(k, _)| k == wire) {
                slot.1 = rendered;
            } else {
                query.push((wire.to_owned(), rendered));
            }
        }

        Ok(WireCall {
            verb: self.verb.clone(),
            segments,
            query,
        })
    }

    fn fill_segment(&self, template: &str, params: &Params) -> Result<String, Error> {
        if !template.contains('{') {
            return Ok(template.to_owned());
        }
        let mut out = String::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|c| open + c) else {
                return Err(Error::InvalidArgument(format!(
                    "unbalanced placeholder in path template {template:?}"
                )));
            };
            out.push_str(&rest[..open]);
            let name = &rest[open + 1..close];
            let value = params.get(name).ok_or_else(|| {
                Error::InvalidArgument(format!("missing path parameter {name:?}"))
            })?;
            out.push_str(&self.render(name, value));
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn render(&self, key: &str, value: &ParamValue) -> String {
        let rendered = value.to_string();
        match self.transforms.iter().find(|(k, _)| k == key) {
            Some((_, ValueTransform::Lowercase)) => rendered.to_lowercase(),
            None => rendered,
        }
    }
}

/// The wire-level shape of one call, before base-URL assembly.
#[derive(Debug, Clone)]
pub struct WireCall {
    /// HTTP verb.
    pub verb: http::Method,
    /// Path segments with placeholders substituted, not yet URL-encoded.
    pub segments: Vec<String>,
    /// Query pairs: skeleton merged with renamed caller parameters.
    pub query: Vec<(String, String)>,
}

impl WireCall {
    /// Looks up a query value by wire name.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn extract_placeholders(path: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            break;
        };
        names.push(rest[open + 1..close].to_owned());
        rest = &rest[close + 1..];
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance_spec() -> EndpointSpec {
        EndpointSpec::get("/api")
            .query("module", "account")
            .query("action", "balance")
            .query("tag", "latest")
            .parser(Parser::Envelope)
    }

    #[test]
    fn test_parameter_renaming_roundtrip() {
        let spec = EndpointSpec::get("/api")
            .query("module", "account")
            .query("action", "tokenbalance")
            .rename("contract_address", "contractaddress");
        let params = Params::new()
            .set("contract_address", "0xC0")
            .set("address", "0xA1");
        let call = spec.build(&params).unwrap();
        assert_eq!(call.query_value("contractaddress"), Some("0xC0"));
        assert_eq!(call.query_value("address"), Some("0xA1"));
        assert_eq!(call.query_value("contract_address"), None);
    }

    #[test]
    fn test_unknown_parameters_are_forwarded_verbatim() {
        let call = balance_spec()
            .build(&Params::new().set("custom_flag", "yes"))
            .unwrap();
        assert_eq!(call.query_value("custom_flag"), Some("yes"));
    }

    #[test]
    fn test_caller_overrides_skeleton_default() {
        let call = balance_spec()
            .build(&Params::new().set("tag", "earliest"))
            .unwrap();
        assert_eq!(call.query_value("tag"), Some("earliest"));
        assert_eq!(call.query.iter().filter(|(k, _)| k == "tag").count(), 1);
    }

    #[test]
    fn test_path_substitution_removes_param_from_query() {
        let spec = EndpointSpec::get("/{address}/balance");
        let call = spec
            .build(&Params::new().set("address", "0xAbC").set("chain", "0x1"))
            .unwrap();
        assert_eq!(call.segments, vec!["0xAbC".to_owned(), "balance".to_owned()]);
        assert_eq!(call.query_value("address"), None);
        assert_eq!(call.query_value("chain"), Some("0x1"));
    }

    #[test]
    fn test_missing_path_parameter_fails_before_dispatch() {
        let spec = EndpointSpec::get("/transaction/{txhash}");
        let err = spec.build(&Params::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_placeholders_are_derived_from_template() {
        let spec = EndpointSpec::get("/block/{block_number}/nft/{address}");
        assert_eq!(
            spec.path_params(),
            ["block_number".to_owned(), "address".to_owned()]
        );
    }

    #[test]
    fn test_declared_lowercase_transform() {
        let spec = EndpointSpec::get("/{address}/balance")
            .transform("address", ValueTransform::Lowercase);
        let call = spec
            .build(&Params::new().set("address", "0xAbCdEf"))
            .unwrap();
        assert_eq!(call.segments[0], "0xabcdef");
    }

    #[test]
    fn test_integers_render_in_decimal() {
        let call = balance_spec()
            .build(&Params::new().set("startblock", 0_u64).set("endblock", 99_999_u64))
            .unwrap();
        assert_eq!(call.query_value("startblock"), Some("0"));
        assert_eq!(call.query_value("endblock"), Some("99999"));
    }
}
