//! A small HTTP/1.1 engine that serves one request per connection
//!
//! This crate holds the protocol half of burrow: parsing a buffered request off the
//! wire, writing a response back with optional gzip compression, and driving a single
//! exchange over any async reader/writer pair. Routing and middlewares live in
//! `burrow-web`.
//!
//! # Features
//!
//! - Lenient request parsing: request line, `Name: value` headers, `Content-Length` body
//! - Incremental framing: a request is handed over only once its whole body is buffered
//! - Case-insensitive multi-value header store that keeps the original spelling
//! - Gzip response compression negotiated from `Accept-Encoding`
//! - One exchange per connection, no keep-alive
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use burrow_http::connection::HttpConnection;
//! use burrow_http::handler::make_handler;
//! use burrow_http::protocol::{Request, Response};
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     info!(port = 4221, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:4221").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             if let Err(e) = connection.process(handler).await {
//!                 warn!(cause = %e, "connection closed without response");
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Response {
//!     info!(url = request.url(), "receive request");
//!     Response::ok()
//!         .header("Content-Type", "text/plain")
//!         .body("Hello World!")
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: [`protocol::Request`], [`protocol::Response`], the header store, URL
//!   helpers and error types
//! - [`codec`]: request decoding and response encoding on top of `tokio_util::codec`
//! - [`handler`]: the [`handler::Handler`] trait and [`handler::make_handler`]
//! - [`connection`]: [`connection::HttpConnection`], one exchange per connection
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: top-level error of a connection
//! - [`protocol::ParseError`]: the request could not be read; no response is written
//! - [`protocol::SendError`]: the response could not be written
//!
//! # Limitations
//!
//! - HTTP/1.1 framing by `Content-Length` only, no chunked transfer encoding
//! - No TLS
//! - Request head limited to 8KB by default

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
