//! Multi-valued, case-insensitive HTTP header map.
//!
//! Header names are compared in lowercase, but the spelling used on first
//! insertion is kept for serialization. Each name maps to an ordered list of
//! values so repeated headers such as `Set-Cookie` survive round trips.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    /// Lowercased lookup key
    key: String,
    /// Name as first inserted, used when writing the header
    name: String,
    values: Vec<String>,
}

/// Ordered collection of HTTP headers.
///
/// # Example
///
/// ```
/// # use taco_http::http::headers::Headers;
/// let mut headers = Headers::new();
/// headers.add("Set-Cookie", "a=1");
/// headers.add("set-cookie", "b=2");
///
/// assert_eq!(headers.get("SET-COOKIE"), Some("a=1"));
/// assert_eq!(headers.get_all("Set-Cookie"), ["a=1", "b=2"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<HeaderEntry>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.key.eq_ignore_ascii_case(name))
    }

    /// Appends a value, keeping any values already stored under `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(i) => self.entries[i].values.push(value),
            None => self.entries.push(HeaderEntry {
                key: name.to_ascii_lowercase(),
                name,
                values: vec![value],
            }),
        }
    }

    /// Replaces every value stored under `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(i) => self.entries[i].values = vec![value],
            None => self.add(name, value),
        }
    }

    /// Returns the first value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|i| self.entries[i].values.first())
            .map(|v| v.as_str())
    }

    /// Returns every value stored under `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(i) => &self.entries[i].values,
            None => &[],
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Removes `name` and returns its values.
    pub fn remove(&mut self, name: &str) -> Vec<String> {
        match self.position(name) {
            Some(i) => self.entries.remove(i).values,
            None => Vec::new(),
        }
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs, one pair per value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|e| e.values.iter().map(move |v| (e.name.as_str(), v.as_str())))
    }

    /// Merges `other` into `self` additively.
    ///
    /// Every value from `other` is appended after the existing ones, repeats
    /// included. Nothing is ever overwritten or dropped.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.add(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.add(k, v);
        }
        headers
    }
}

impl From<&BTreeMap<String, String>> for Headers {
    fn from(map: &BTreeMap<String, String>) -> Self {
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_spelling() {
        let mut headers = Headers::new();
        headers.add("X-Request-Id", "1");
        headers.add("x-request-id", "2");

        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("X-Request-Id", "1"), ("X-Request-Id", "2")]);
    }

    #[test]
    fn set_replaces_all_values() {
        let mut headers = Headers::new();
        headers.add("Vary", "Accept");
        headers.add("Vary", "Origin");
        headers.set("vary", "*");

        assert_eq!(headers.get_all("Vary"), ["*"]);
    }
}
