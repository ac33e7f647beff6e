//! HTTP response representation.
//!
//! Handlers build a [`Response`] from a status code, headers and a fully buffered body.
//! `Content-Length` and `Content-Encoding` are owned by the response encoder, which
//! computes them when the response is written. The coding it applies comes from the
//! request that produced the response, see [`Response::content_coding`].

use bytes::Bytes;
use http::StatusCode;

use crate::codec::ContentCoding;
use crate::protocol::HeaderStore;

#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderStore,
    body: Bytes,
    content_coding: Option<ContentCoding>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderStore::new(), body: Bytes::new(), content_coding: None }
    }

    /// `200 OK` with no headers and an empty body.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// `201 Created` with no headers and an empty body.
    pub fn created() -> Self {
        Self::new(StatusCode::CREATED)
    }

    /// `404 Not Found` with no headers and an empty body.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

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

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
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

    #[inline]
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// The coding negotiated against the request this response answers. `None` leaves
    /// the choice to the connection, which negotiates against the request it decoded.
    #[inline]
    pub fn content_coding(&self) -> Option<ContentCoding> {
        self.content_coding
    }

    #[inline]
    pub fn set_content_coding(&mut self, content_coding: ContentCoding) {
        self.content_coding = Some(content_coding);
    }

    pub fn into_parts(self) -> (StatusCode, HeaderStore, Bytes) {
        (self.status, self.headers, self.body)
    }
}
