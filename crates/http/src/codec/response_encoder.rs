//! HTTP response encoder module
//!
//! Serializes a [`Response`] into wire bytes. The encoder is created per exchange with
//! the [`ContentCoding`] negotiated from the decoded request. A response that carries
//! its own [`Response::content_coding`] overrides it.

use crate::codec::body::ContentCoding;
use crate::codec::header::HeaderEncoder;
use crate::protocol::header::CONTENT_ENCODING;
use crate::protocol::{HeaderStore, Response, SendError};
use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use tokio_util::codec::Encoder;
use tracing::warn;

#[derive(Debug, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    coding: ContentCoding,
}

impl ResponseEncoder {
    /// Creates an encoder that applies `coding` to non-empty bodies.
    pub fn new(coding: ContentCoding) -> Self {
        Self { header_encoder: HeaderEncoder, coding }
    }

    /// Applies `coding`, falling back to the raw body if compression fails.
    fn encode_body(headers: &mut HeaderStore, body: Bytes, coding: ContentCoding) -> Bytes {
        apply_coding(headers, body, coding, |body| coding.encode(body))
    }
}

fn apply_coding<F>(headers: &mut HeaderStore, body: Bytes, coding: ContentCoding, compress: F) -> Bytes
where
    F: FnOnce(Bytes) -> io::Result<Bytes>,
{
    let Some(coding_name) = coding.name() else {
        return body;
    };

    // empty bodies stay empty, pre-encoded bodies are left alone
    if body.is_empty() || headers.contains(CONTENT_ENCODING) {
        return body;
    }

    match compress(body.clone()) {
        Ok(encoded) => {
            headers.set(CONTENT_ENCODING, coding_name);
            encoded
        }
        Err(e) => {
            warn!(cause = %e, coding = coding_name, "compress response body failed, sending it uncompressed");
            body
        }
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let coding = item.content_coding().unwrap_or(self.coding);
        let (status, mut headers, body) = item.into_parts();

        let body = Self::encode_body(&mut headers, body, coding);

        self.header_encoder.encode((status, &headers, body.len()), dst)?;
        dst.reserve(body.len());
        dst.put_slice(&body);
        Ok(())
    }
}
