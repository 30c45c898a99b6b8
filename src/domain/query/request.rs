//! Query-string parameters that shape a list response.

use serde::Deserialize;
use std::collections::HashMap;

/// String-valued query parameters supplied by a client.
///
/// Empty values are treated as absent, so `?name=&sort=` behaves like `?`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct QueryRequest {
    params: HashMap<String, String>,
}

impl QueryRequest {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    /// Returns the non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Reads `key` as a leading integer (`"12abc"` is 12, `"abc"` is `None`).
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(parse_leading_int)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryRequest {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parses an optionally signed run of leading digits, ignoring leading whitespace.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_absent() {
        let request: QueryRequest = [("name", ""), ("sort", "price")].into_iter().collect();
        assert_eq!(request.get("name"), None);
        assert_eq!(request.get("sort"), Some("price"));
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int(" 3abc"), Some(3));
        assert_eq!(parse_leading_int("-2"), Some(-2));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn test_with_overrides() {
        let request = QueryRequest::default()
            .with("limit", "50")
            .with("limit", "5");
        assert_eq!(request.get_int("limit"), Some(5));
    }
}
