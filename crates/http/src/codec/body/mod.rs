//! HTTP message body processing
//!
//! - [`LengthDecoder`]: buffers a request body of a known `Content-Length`
//! - [`ContentCoding`]: negotiates and applies the response body encoding

mod length_decoder;
mod payload_encoder;

pub(crate) use length_decoder::LengthDecoder;
pub use payload_encoder::ContentCoding;
