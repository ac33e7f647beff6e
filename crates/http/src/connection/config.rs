use std::time::Duration;

use crate::codec::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEADER_BYTES};

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-connection limits.
///
/// `read_timeout` bounds the time between accepting a connection and having a whole
/// request buffered. `max_header_bytes` bounds the request line plus header lines.
/// `max_body_bytes` bounds the `Content-Length` a request may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    read_timeout: Duration,
    max_header_bytes: usize,
    max_body_bytes: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[inline]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    #[inline]
    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    #[inline]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}
