//! Splitting of the request target into path segments and query parameters.
//!
//! The request target is split on the first `?`. The path part becomes a list of
//! segments (the leading empty segment before the first `/` is dropped), the query part
//! becomes a flat [`Params`] mapping where later keys overwrite earlier ones and a key
//! without `=` gets the value `"true"`.
//!
//! No percent-decoding is performed; segments and values are matched byte-for-byte.

use std::collections::HashMap;
use std::collections::hash_map;

/// Value given to a query key that has no `=`.
const FLAG_VALUE: &str = "true";

/// A flat name to value mapping, used for both path and query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: HashMap<String, String>,
}

impl Params {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Inserts a value, overwriting any previous value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    /// Merges `other` into `self`, values from `other` win on conflicts.
    pub fn merge(&mut self, other: Params) {
        self.inner.extend(other.inner);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

/// The request target split into path segments and query parameters.
#[derive(Debug, Clone)]
pub struct RequestTarget<'a> {
    segments: Vec<&'a str>,
    query: Params,
}

impl<'a> RequestTarget<'a> {
    pub fn parse(target: &'a str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        Self { segments: split_path(path), query: query.map(parse_query).unwrap_or_default() }
    }

    #[inline]
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    #[inline]
    pub fn query(&self) -> &Params {
        &self.query
    }

    pub fn into_query(self) -> Params {
        self.query
    }
}

/// Splits a path on `/`, dropping everything before the first separator.
///
/// `"/"` yields a single empty segment and `"/echo/"` yields `["echo", ""]`.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').skip(1).collect()
}

/// Parses `a=1&b&a=2` style query strings, last key wins.
pub fn parse_query(query: &str) -> Params {
    query
        .split('&')
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.split_once('=').unwrap_or((entry, FLAG_VALUE)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_flag_defaults_to_true() {
        let target = RequestTarget::parse("/x?a=1&b");

        assert_eq!(target.segments(), &["x"]);
        assert_eq!(target.query().len(), 2);
        assert_eq!(target.query().get("a"), Some("1"));
        assert_eq!(target.query().get("b"), Some("true"));
    }

    #[test]
    fn query_last_key_wins() {
        let target = RequestTarget::parse("/x?a=1&a=2");

        assert_eq!(target.query().len(), 1);
        assert_eq!(target.query().get("a"), Some("2"));
    }

    #[test]
    fn query_splits_on_first_equal_sign() {
        let query = parse_query("token=abc=def&&empty=");

        assert_eq!(query.get("token"), Some("abc=def"));
        assert_eq!(query.get("empty"), Some(""));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn splits_path_segments() {
        assert_eq!(split_path("/"), vec![""]);
        assert_eq!(split_path("/echo/abc"), vec!["echo", "abc"]);
        assert_eq!(split_path("/echo/"), vec!["echo", ""]);
        assert_eq!(split_path("/files//a"), vec!["files", "", "a"]);
        assert!(split_path("").is_empty());
    }

    #[test]
    fn only_first_question_mark_splits() {
        let target = RequestTarget::parse("/search?q=a?b");

        assert_eq!(target.segments(), &["search"]);
        assert_eq!(target.query().get("q"), Some("a?b"));
    }

    #[test]
    fn no_query_is_empty() {
        let target = RequestTarget::parse("/user-agent");

        assert_eq!(target.segments(), &["user-agent"]);
        assert!(target.into_query().is_empty());
    }

    #[test]
    fn merge_overwrites() {
        let mut outer: Params = [("id", "1"), ("org", "a")].into_iter().collect();
        outer.merge([("id", "2")].into_iter().collect());

        assert_eq!(outer.get("id"), Some("2"));
        assert_eq!(outer.get("org"), Some("a"));
    }
}
