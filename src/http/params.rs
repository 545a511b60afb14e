//! Value-parsing helpers shared by every handler.
//!
//! - [`QueryParams`]: ordered multi-map over the query string
//! - [`fold_pairs`]: repeated keys collapse into JSON arrays, order preserved
//! - [`parse_number`]: string → number with a declared 400 on failure
//! - [`headers_to_json`]: header map → flat JSON object

use axum::http::HeaderMap;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::http::error::{AppError, AppResult};

/// Ordered query parameters. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a raw (still percent-encoded) query string.
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value for `key`.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Flatten into a JSON object, folding repeated keys into arrays.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        fold_pairs(&mut map, self.iter());
        map
    }
}

/// Insert `pairs` into `map`. A key seen twice becomes an array holding every
/// value in the order observed, including any value already in `map`.
pub fn fold_pairs<'a>(map: &mut Map<String, Value>, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
    for (key, value) in pairs {
        let value = Value::String(value.to_string());
        match map.get_mut(key) {
            None => {
                map.insert(key.to_string(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
}

/// Parse a number from user input, failing with a declared 400.
pub fn parse_number<T: FromStr>(raw: &str) -> AppResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::bad_request(format!("Invalid number: {raw}")))
}

/// Header map as a flat JSON object. Repeated headers are joined with ", ".
pub fn headers_to_json(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        map.insert(name.as_str().to_string(), Value::String(joined));
    }
    map
}
