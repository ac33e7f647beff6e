//! HTTP request decoder module
//!
//! This module turns raw connection bytes into [`Request`] values. It is used in two ways:
//!
//! - [`RequestDecoder`]: a streaming decoder for [`FramedRead`](tokio_util::codec::FramedRead).
//!   It knows when the head ends (blank line) and how many body bytes are still missing
//!   (`Content-Length`), so the connection waits for exactly one request and no timing
//!   heuristic is needed.
//! - [`parse_request`]: parses one complete message that is already in memory.
//!
//! # Example
//!
//! ```
//! use burrow_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("POST /files/a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel");
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"lo");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(&request.body_bytes()[..], b"hello");
//! ```

use crate::codec::body::LengthDecoder;
use crate::codec::header::{HeaderDecoder, RequestHead, find_head_end, parse_head};
use crate::ensure;
use crate::protocol::{ParseError, Request};
use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

/// Default limit for a request body, as declared by `Content-Length`
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// A decoder for HTTP requests that handles both head and body
///
/// # State Machine
///
/// The decoder maintains its state through the `pending` field:
/// - `None`: Currently parsing the head
/// - `Some((head, LengthDecoder))`: Head parsed, waiting for the body
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    max_body_bytes: usize,
    pending: Option<(RequestHead, LengthDecoder)>,
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { header_decoder: HeaderDecoder::default(), max_body_bytes: DEFAULT_MAX_BODY_BYTES, pending: None }
    }
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder that rejects header sections larger than `max_header_bytes`.
    pub fn with_max_header_bytes(max_header_bytes: usize) -> Self {
        Self::with_limits(max_header_bytes, DEFAULT_MAX_BODY_BYTES)
    }

    /// Creates a decoder that also rejects any `Content-Length` above `max_body_bytes`.
    pub fn with_limits(max_header_bytes: usize, max_body_bytes: usize) -> Self {
        Self { header_decoder: HeaderDecoder::with_max_header_bytes(max_header_bytes), max_body_bytes, pending: None }
    }

    /// The declared length is checked before a single body byte is buffered.
    fn start_body(&mut self, head: RequestHead, content_length: usize) -> Result<(), ParseError> {
        ensure!(content_length <= self.max_body_bytes, ParseError::too_large_body(content_length, self.max_body_bytes));
        self.pending = Some((head, LengthDecoder::new(content_length)));
        Ok(())
    }

    fn decode_body(&mut self, src: &mut BytesMut, eof: bool) -> Result<Option<Request>, ParseError> {
        let Some((_, body_decoder)) = &mut self.pending else {
            return Ok(None);
        };

        let body = if eof { body_decoder.decode_eof(src)? } else { body_decoder.decode(src)? };

        match body {
            Some(body) => {
                // the head is always present while a body decoder is pending
                let request = self.pending.take().map(|(head, _)| head.body(body));
                Ok(request)
            }
            None => Ok(None),
        }
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode one HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: Head and full body are available
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: The request is malformed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.pending.is_none() {
            match self.header_decoder.decode(src)? {
                Some((head, content_length)) => self.start_body(head, content_length)?,
                None => return Ok(None),
            }
        }

        self.decode_body(src, false)
    }

    /// Called once the peer stopped sending.
    ///
    /// A head without its blank line is accepted, a body shorter than its declared
    /// length is [`ParseError::IncompleteBody`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.pending.is_none() {
            match self.header_decoder.decode_eof(src)? {
                Some((head, content_length)) => self.start_body(head, content_length)?,
                None => return Ok(None),
            }
        }

        self.decode_body(src, true)
    }
}

/// Parses one complete request held in `src`.
///
/// Everything before the first blank line is the head. The body is the first
/// `Content-Length` bytes after it; anything beyond is ignored.
///
/// # Errors
///
/// Returns `ParseError` if the request line is unusable or if fewer body bytes are
/// present than `Content-Length` declares.
pub fn parse_request(src: &[u8]) -> Result<Request, ParseError> {
    let (head_section, body_section) = match find_head_end(src) {
        Some(head_end) => (&src[..head_end], &src[head_end + 4..]),
        None => (src, &[][..]),
    };

    let (head, content_length) = parse_head(head_section)?;
    ensure!(body_section.len() >= content_length, ParseError::incomplete_body(content_length, body_section.len()));

    Ok(head.body(Bytes::copy_from_slice(&body_section[..content_length])))
}
