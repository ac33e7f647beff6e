use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use burrow_http::handler::{Handler, SharedHandler};
use burrow_http::protocol::{Request, Response};

use crate::middleware::Middleware;

/// A middleware built from an async closure taking the request and the next handler.
pub struct FnMiddleware<F> {
    f: Arc<F>,
}

/// Turns `async fn(Request, SharedHandler) -> Response` into a [`Middleware`].
///
/// ```
/// use burrow_web::middleware::middleware_fn;
/// use burrow_web::{Handler, Request, SharedHandler};
///
/// let add_server_header = middleware_fn(|req: Request, next: SharedHandler| async move {
///     let mut response = next.call(req).await;
///     response.headers_mut().set("Server", "burrow");
///     response
/// });
/// ```
pub fn middleware_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Request, SharedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FnMiddleware { f: Arc::new(f) }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, SharedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn decorate(&self, next: SharedHandler) -> SharedHandler {
        Arc::new(FnMiddlewareHandler { f: Arc::clone(&self.f), next })
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware").finish_non_exhaustive()
    }
}

struct FnMiddlewareHandler<F> {
    f: Arc<F>,
    next: SharedHandler,
}

#[async_trait]
impl<F, Fut> Handler for FnMiddlewareHandler<F>
where
    F: Fn(Request, SharedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn call(&self, req: Request) -> Response {
        (self.f)(req, Arc::clone(&self.next)).await
    }
}
