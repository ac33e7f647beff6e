//! HTTP codec module for decoding requests and encoding responses
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: streaming decoder producing one [`Request`](crate::protocol::Request)
//!     once its head and full body are buffered
//!   - [`parse_request`]: the same parsing rules applied to a complete in-memory message
//!   - Head parsing via the `header` module, body framing via the `body` module
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: writes the status line, headers, computed `Content-Length`
//!     and body
//!   - [`ContentCoding`]: gzip negotiation against `Accept-Encoding`
//!
//! # Example
//!
//! ```
//! use burrow_http::codec::{ContentCoding, RequestDecoder, ResponseEncoder};
//! use burrow_http::protocol::Response;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut request_buffer = BytesMut::from("GET / HTTP/1.1\r\n\r\n");
//! let request = RequestDecoder::new().decode(&mut request_buffer).unwrap().unwrap();
//!
//! let mut encoder = ResponseEncoder::new(ContentCoding::negotiate(request.headers()));
//! let mut response_buffer = BytesMut::new();
//! encoder.encode(Response::ok(), &mut response_buffer).unwrap();
//! assert_eq!(&response_buffer[..], b"HTTP/1.1 200 OK\r\n\r\n");
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use body::ContentCoding;
pub use header::DEFAULT_MAX_HEADER_BYTES;
pub use request_decoder::DEFAULT_MAX_BODY_BYTES;
pub use request_decoder::RequestDecoder;
pub use request_decoder::parse_request;
pub use response_encoder::ResponseEncoder;
