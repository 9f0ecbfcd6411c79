//! Logical call parameters.
//!
//! [`Params`] is an ordered key/value bag holding the caller's logical
//! arguments before the endpoint table renames them to wire names. Keys keep
//! insertion order for the request itself; [`Params::canonical`] sorts them
//! for cache-key derivation.

use std::fmt;

/// A single logical parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// An opaque string, passed through verbatim.
    Str(String),
    /// An unsigned integer, rendered in decimal.
    Int(u64),
    /// A boolean, rendered as `true`/`false`.
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(u64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered logical parameters for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    /// Creates an empty parameter bag.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets a parameter, replacing an earlier value under the same key.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a parameter in place, replacing an earlier value under the same
    /// key.
    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.0.push((key.to_owned(), value));
        }
    }

    /// Looks up a parameter by its logical name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the bag holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key-sorted `k=v&…` rendering used for cache-key derivation.
    #[must_use]
    pub fn canonical(&self) -> String {
        let mut pairs: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        pairs.join("&")
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a ParamValue);
    type IntoIter = std::vec::IntoIter<(&'a str, &'a ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_existing_key() {
        let params = Params::new().set("page", 1_u64).set("page", 2_u64);
        assert_eq!(params.get("page"), Some(&ParamValue::Int(2)));
        assert_eq!(params.iter().count(), 1);
    }

    #[test]
    fn test_canonical_is_key_sorted() {
        let a = Params::new().set("b", "2").set("a", "1");
        let b = Params::new().set("a", "1").set("b", "2");
        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.canonical(), "a=1&b=2");
    }

    #[test]
    fn test_value_rendering() {
        assert_eq!(ParamValue::from(7_u64).to_string(), "7");
        assert_eq!(ParamValue::from(true).to_string(), "true");
        assert_eq!(ParamValue::from("0xabc").to_string(), "0xabc");
    }
}
