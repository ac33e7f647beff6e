//! HTTP response head encoder.
//!
//! Writes the status line, every header value on its own line, the `Content-Length`
//! header when the body is not empty, and the terminating blank line.

use crate::protocol::header::CONTENT_LENGTH;
use crate::protocol::{HeaderStore, SendError};

use bytes::{BufMut, BytesMut};

use http::StatusCode;
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for the response head implementing the [`Encoder`] trait.
///
/// The item is the status, the headers to emit and the final body length. Any
/// `Content-Length` left in the headers is ignored, the one written is always computed
/// from the body length.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HeaderEncoder;

impl<'a> Encoder<(StatusCode, &'a HeaderStore, usize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (StatusCode, &'a HeaderStore, usize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (status, headers, body_length) = item;

        dst.reserve(INIT_HEADER_SIZE);
        // unknown codes keep the trailing space and an empty reason
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status.as_str(), status.canonical_reason().unwrap_or(""))?;

        for (name, value) in headers.iter_values() {
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                continue;
            }
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }

        if body_length > 0 {
            write!(FastWrite(dst), "{CONTENT_LENGTH}: {body_length}\r\n")?;
        }

        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to `BytesMut`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
