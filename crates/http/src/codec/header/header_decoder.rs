//! HTTP request head decoder.
//!
//! Parses the request line and header lines that precede the blank line of a request.
//! The parser is deliberately lenient:
//!
//! - the request line only needs a method and a target, the version token is optional
//! - header lines are split on the first `": "`; lines without it are skipped
//! - a missing or non-numeric `Content-Length` means an empty body
//!
//! # Limits
//!
//! - Maximum header section size: 8KB by default, see [`HeaderDecoder::with_max_header_bytes`]

use bytes::{Bytes, BytesMut};
use http::Method;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::header::CONTENT_LENGTH;
use crate::protocol::{HeaderStore, ParseError, Request};

/// Default limit for the header section, terminator included
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// The parsed head of a request, waiting for its body.
#[derive(Debug)]
pub(crate) struct RequestHead {
    method: Method,
    url: String,
    headers: HeaderStore,
}

impl RequestHead {
    /// Attaches a body, producing the final request.
    pub(crate) fn body(self, body: Bytes) -> Request {
        Request::from_parts(self.method, self.url, self.headers, body)
    }
}

/// Decoder for the request head implementing the [`Decoder`] trait.
///
/// Yields the parsed head together with the body length announced by `Content-Length`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderDecoder {
    max_header_bytes: usize,
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self { max_header_bytes: DEFAULT_MAX_HEADER_BYTES }
    }
}

impl HeaderDecoder {
    pub(crate) fn with_max_header_bytes(max_header_bytes: usize) -> Self {
        Self { max_header_bytes }
    }
}

impl Decoder for HeaderDecoder {
    type Item = (RequestHead, usize);
    type Error = ParseError;

    /// Waits for the blank line, then parses everything before it.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - The header section exceeds the configured limit
    /// - The request line is missing its method or target
    /// - The method is not a valid token
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(head_end) = find_head_end(src) else {
            ensure!(src.len() <= self.max_header_bytes, ParseError::too_large_header(src.len(), self.max_header_bytes));
            return Ok(None);
        };

        let head_size = head_end + HEAD_TERMINATOR.len();
        ensure!(head_size <= self.max_header_bytes, ParseError::too_large_header(head_size, self.max_header_bytes));
        trace!(head_size, "found end of request head");

        let head_bytes = src.split_to(head_size);
        parse_head(&head_bytes[..head_end]).map(Some)
    }

    /// A peer that closes right after its header lines still gets served: whatever is
    /// buffered is taken as the complete head.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let head_bytes = src.split();
        parse_head(&head_bytes).map(Some)
    }
}

/// Returns the offset of the first `\r\n\r\n` in `src`.
pub(crate) fn find_head_end(src: &[u8]) -> Option<usize> {
    src.windows(HEAD_TERMINATOR.len()).position(|window| window == HEAD_TERMINATOR)
}

/// Parses a header section (without its terminating blank line).
pub(crate) fn parse_head(section: &[u8]) -> Result<(RequestHead, usize), ParseError> {
    let section = String::from_utf8_lossy(section);
    let mut lines = section.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut tokens = request_line.split_ascii_whitespace();
    let (Some(method), Some(url)) = (tokens.next(), tokens.next()) else {
        return Err(ParseError::invalid_request_line(format!("expect method and path, found '{request_line}'")));
    };

    let method = Method::from_bytes(method.as_bytes()).map_err(|_e| ParseError::invalid_method(method))?;

    let mut headers = HeaderStore::with_capacity(16);
    for line in lines {
        if let Some((name, value)) = line.split_once(": ") {
            headers.add(name, value);
        }
    }

    let content_length = headers.get(CONTENT_LENGTH).and_then(|value| value.trim().parse::<usize>().ok()).unwrap_or(0);
    trace!(%method, url, header_count = headers.len(), content_length, "parsed request head");

    Ok((RequestHead { method, url: url.to_string(), headers }, content_length))
}
