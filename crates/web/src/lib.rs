//! Routing, middlewares and the accept loop for burrow
//!
//! `burrow-web` sits on top of `burrow-http`: a [`Router`] maps a method and a path to a
//! handler, [`middleware`]s wrap handlers with cross-cutting behavior and a [`Server`]
//! accepts TCP connections and answers one request on each.
//!
//! # Example
//!
//! ```no_run
//! use burrow_web::middleware::middleware_fn;
//! use burrow_web::{make_handler, Handler, Request, Response, Router, Server, SharedHandler};
//!
//! async fn echo(req: Request) -> Response {
//!     let value = req.param("str").unwrap_or_default().to_string();
//!     Response::ok().header("Content-Type", "text/plain").body(value)
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder()
//!         .middleware(middleware_fn(|req: Request, next: SharedHandler| async move {
//!             tracing::info!(url = req.url(), "receive request");
//!             next.call(req).await
//!         }))
//!         .get("/echo/{str}", make_handler(echo))
//!         .build()
//!         .unwrap();
//!
//!     Server::builder()
//!         .router(router)
//!         .address("127.0.0.1:4221")
//!         .build()
//!         .unwrap()
//!         .start()
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod middleware;
pub mod router;

mod server;

pub use burrow_http::handler::{Handler, SharedHandler, make_handler};
pub use burrow_http::protocol::{Params, Request, Response};
pub use middleware::Middleware;
pub use router::{RouteError, Router, RouterBuilder};
pub use server::{DEFAULT_PORT, Server, ServerBuildError, ServerBuilder};
