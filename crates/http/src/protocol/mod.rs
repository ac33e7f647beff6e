//! Core HTTP protocol types.
//!
//! This module holds the values that flow through one request/response exchange:
//!
//! - **Headers** ([`header`]): [`HeaderStore`], a case-insensitive multi-value mapping
//!   plus the header names the engine itself reads or writes
//! - **Request** (`request`): [`Request`], method, original target, headers and body,
//!   with path and query parameters attached after routing
//! - **Target splitting** (`url`): [`RequestTarget`] splits a target into path segments
//!   and query [`Params`]
//! - **Response** (`response`): [`Response`], status, headers and body
//! - **Error Handling** (`error`):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response sending errors

pub mod header;
pub use header::HeaderStore;

mod request;
pub use request::Request;

mod response;
pub use response::Response;

mod url;
pub use url::Params;
pub use url::RequestTarget;
pub use url::parse_query;
pub use url::split_path;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
