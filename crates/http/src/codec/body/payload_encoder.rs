//! Content-coding negotiation and response body compression.
//!
//! The only coding besides identity is gzip. It is chosen when the first
//! `Accept-Encoding` value lists `gzip`, unless that entry carries `q=0`.

use bytes::{Bytes, BytesMut};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io;
use std::io::Write;
use tracing::trace;

use crate::protocol::HeaderStore;
use crate::protocol::header::ACCEPT_ENCODING;

/// The body encoding selected for a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentCoding {
    /// Send the body as is.
    #[default]
    Identity,
    /// Compress the body with gzip.
    Gzip,
}

impl ContentCoding {
    /// Selects a coding from the request's `Accept-Encoding` header.
    pub fn negotiate(request_headers: &HeaderStore) -> Self {
        match request_headers.get(ACCEPT_ENCODING) {
            Some(accept_encodings) if accepts(accept_encodings, "gzip") => Self::Gzip,
            _ => Self::Identity,
        }
    }

    /// The value written to `Content-Encoding`, `None` for identity.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::Identity => None,
            Self::Gzip => Some("gzip"),
        }
    }

    /// Encodes the whole body in one shot.
    pub fn encode(self, body: Bytes) -> io::Result<Bytes> {
        match self {
            Self::Identity => Ok(body),
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Writer::with_capacity(body.len() / 2 + 32), Compression::default());
                encoder.write_all(&body)?;
                let encoded = encoder.finish()?.into_bytes();
                trace!(raw_size = body.len(), encoded_size = encoded.len(), "gzip encoded body");
                Ok(encoded)
            }
        }
    }
}

/// Checks a comma separated `Accept-Encoding` list for `coding`.
fn accepts(accept_encodings: &str, coding: &str) -> bool {
    accept_encodings.split(',').any(|item| {
        let mut parts = item.split(';');
        let name = parts.next().unwrap_or_default().trim();
        name.eq_ignore_ascii_case(coding) && !parts.any(is_zero_quality)
    })
}

fn is_zero_quality(param: &str) -> bool {
    param
        .trim()
        .strip_prefix("q=")
        .and_then(|quality| quality.trim().parse::<f32>().ok())
        .is_some_and(|quality| quality <= 0.0)
}

// inspired by actix-http
struct Writer {
    buf: BytesMut,
}

impl Writer {
    fn with_capacity(capacity: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity) }
    }

    fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
