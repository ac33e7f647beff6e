//! Decoder for request bodies framed by the Content-Length header.
//!
//! The whole body is buffered before it is handed out, so the decoder only ever yields
//! one item: the complete body. Buffer growth follows the bytes that actually arrive,
//! never the declared length.

use crate::protocol::ParseError;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

/// A decoder that waits until `length` bytes are buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LengthDecoder {
    /// The number of bytes the body must contain
    length: usize,
}

impl LengthDecoder {
    pub(crate) fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Decoder for LengthDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// # Returns
    /// * `Ok(Some(bytes))` once the whole body is buffered, bytes past it stay in `src`
    /// * `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < self.length {
            trace!(buffered = src.len(), expected = self.length, "waiting for more body bytes");
            return Ok(None);
        }

        Ok(Some(src.split_to(self.length).freeze()))
    }

    /// # Errors
    /// Returns `ParseError::IncompleteBody` when the stream ends before the body does.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(body) => Ok(Some(body)),
            None => Err(ParseError::incomplete_body(self.length, src.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut buffer: BytesMut = BytesMut::from(&b"101234567890abcdef\r\n\r\n"[..]);

        let mut length_decoder = LengthDecoder::new(10);
        let bytes = length_decoder.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(bytes.len(), 10);

        assert_eq!(&bytes[..], b"1012345678");
        assert_eq!(&buffer[..], b"90abcdef\r\n\r\n");
    }

    #[test]
    fn waits_for_whole_body() {
        let mut buffer = BytesMut::from(&b"abc"[..]);
        let mut length_decoder = LengthDecoder::new(5);

        assert!(length_decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"de");
        assert_eq!(&length_decoder.decode(&mut buffer).unwrap().unwrap()[..], b"abcde");
        assert!(buffer.is_empty());
    }

    #[test]
    fn zero_length_is_immediately_done() {
        let mut buffer = BytesMut::new();
        assert!(LengthDecoder::new(0).decode(&mut buffer).unwrap().unwrap().is_empty());
    }

    #[test]
    fn declared_length_is_not_preallocated() {
        let mut buffer = BytesMut::from(&b"abc"[..]);
        let mut length_decoder = LengthDecoder::new(usize::MAX - 8);

        assert!(length_decoder.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.capacity() < 1024);
    }

    #[test]
    fn truncated_at_eof() {
        let mut buffer = BytesMut::from(&b"ab"[..]);

        let result = LengthDecoder::new(3).decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::IncompleteBody { expected: 3, actual: 2 })));
    }
}
