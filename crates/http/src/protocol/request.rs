//! HTTP request representation.
//!
//! A [`Request`] is produced once per connection by the request decoder. At that point
//! only the method, the original request target, the headers and the body are known;
//! path and query parameters are attached later by the router through
//! [`Request::with_params`].

use bytes::Bytes;
use http::Method;

use crate::protocol::{HeaderStore, Params};

/// A fully buffered HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderStore,
    body: Bytes,
}

/// The request target as sent by the client, plus the parameters extracted from it.
#[derive(Debug, Clone, Default)]
struct Url {
    original: String,
    path_params: Params,
    query_params: Params,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: Url { original: url.into(), ..Url::default() }, headers: HeaderStore::new(), body: Bytes::new() }
    }

    pub(crate) fn from_parts(method: Method, url: String, headers: HeaderStore, body: Bytes) -> Self {
        Self { method, url: Url { original: url, ..Url::default() }, headers, body }
    }

    /// Appends a header value, mostly useful when building requests by hand.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Attaches the parameters captured while routing this request.
    #[must_use]
    pub fn with_params(mut self, path_params: Params, query_params: Params) -> Self {
        self.url.path_params = path_params;
        self.url.query_params = query_params;
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target exactly as it appeared in the request line.
    #[inline]
    pub fn url(&self) -> &str {
        &self.url.original
    }

    #[inline]
    pub fn path_params(&self) -> &Params {
        &self.url.path_params
    }

    #[inline]
    pub fn query_params(&self) -> &Params {
        &self.url.query_params
    }

    /// Shortcut for `self.path_params().get(name)`.
    #[inline]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.url.path_params.get(name)
    }

    /// Shortcut for `self.query_params().get(name)`.
    #[inline]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.url.query_params.get(name)
    }

    #[inline]
    pub fn headers(&self) -> &HeaderStore {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderStore {
        &mut self.headers
    }

    #[inline]
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }
}
