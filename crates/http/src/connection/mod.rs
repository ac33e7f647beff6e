//! Connection handling for one request/response exchange.
//!
//! [`HttpConnection`] reads exactly one request, hands it to a
//! [`Handler`](crate::handler::Handler), writes the response and closes the write side.
//! There is no keep-alive: every connection carries a single exchange.

mod config;
mod http_connection;

pub use config::ConnectionConfig;
pub use http_connection::HttpConnection;
