//! HTTP header processing module for encoding and decoding message heads
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes the request line and header lines
//!   - Lenient `Name: Value` splitting
//!   - Header section size limit
//!   - `Content-Length` extraction
//!
//! - [`HeaderEncoder`]: Encodes the status line and response headers
//!   - One line per header value
//!   - Computed `Content-Length`

mod header_decoder;
mod header_encoder;

pub use header_decoder::DEFAULT_MAX_HEADER_BYTES;
pub(crate) use header_decoder::{HeaderDecoder, RequestHead, find_head_end, parse_head};
pub(crate) use header_encoder::HeaderEncoder;
