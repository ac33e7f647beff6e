//! Case-insensitive, multi-value header storage.
//!
//! [`HeaderStore`] is used for both request and response headers. Names are compared
//! ASCII case-insensitively, but the spelling used on first insertion is kept so that a
//! response written with `Content-Type` goes out on the wire as `Content-Type`.
//!
//! Names keep their first-insertion order, and each name holds its values in the order
//! they were added.

use std::fmt;

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const USER_AGENT: &str = "User-Agent";

/// An ordered, case-insensitive mapping from header name to its values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderStore {
    entries: Vec<HeaderEntry>,
}

#[derive(Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Returns the first value stored for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name).and_then(|entry| entry.values.first()).map(String::as_str)
    }

    /// Returns every value stored for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entry(name).map_or(&[], |entry| entry.values.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Replaces all values of `name` with the single `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entry_mut(&name) {
            Some(entry) => {
                entry.values.clear();
                entry.values.push(value);
            }
            None => self.entries.push(HeaderEntry { name, values: vec![value] }),
        }
    }

    /// Appends `value` to the values of `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entry_mut(&name) {
            Some(entry) => entry.values.push(value),
            None => self.entries.push(HeaderEntry { name, values: vec![value] }),
        }
    }

    /// Removes `name` and returns the values it held.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        let index = self.entries.iter().position(|entry| entry.name.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index).values)
    }

    /// Number of distinct header names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, values)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    /// Iterates over every `(name, value)` pair, one item per value.
    pub fn iter_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|entry| entry.values.iter().map(|value| (entry.name.as_str(), value.as_str())))
    }

    fn entry(&self, name: &str) -> Option<&HeaderEntry> {
        self.entries.iter().find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut HeaderEntry> {
        self.entries.iter_mut().find(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}

impl fmt::Debug for HeaderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<N, V> FromIterator<(N, V)> for HeaderStore
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut store = HeaderStore::new();
        for (name, value) in iter {
            store.add(name, value);
        }
        store
    }
}
