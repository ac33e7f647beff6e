//! Request handler trait and utilities.
//!
//! A [`Handler`] turns a [`Request`] into a [`Response`]. Whatever the handler does on
//! the side (file access and the like) is its own business; the connection only cares
//! about the response it returns.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::codec::ContentCoding;
use crate::protocol::{Request, Response};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: Request) -> Response;
}

/// A handler shared between connections and middlewares.
pub type SharedHandler = Arc<dyn Handler>;

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn call(&self, req: Request) -> Response {
        (**self).call(req).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn call(&self, req: Request) -> Response {
        (**self).call(req).await
    }
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    async fn call(&self, req: Request) -> Response {
        (self.f)(req).await
    }
}

/// Wraps an async function or closure into a [`Handler`].
pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    HandlerFn { f }
}

/// Negotiates the response coding against the request as it reaches `handler`.
///
/// Middlewares wrapped around the result see the original request, so changes they make
/// to `Accept-Encoding` before delegating decide the coding. A coding the inner handler
/// already set is kept.
pub fn negotiate_coding(handler: SharedHandler) -> SharedHandler {
    Arc::new(NegotiateCoding { handler })
}

struct NegotiateCoding {
    handler: SharedHandler,
}

#[async_trait]
impl Handler for NegotiateCoding {
    async fn call(&self, req: Request) -> Response {
        let coding = ContentCoding::negotiate(req.headers());
        let mut response = self.handler.call(req).await;
        if response.content_coding().is_none() {
            response.set_content_coding(coding);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};

    async fn echo_path(req: Request) -> Response {
        Response::ok().body(req.url().to_string())
    }

    fn assert_is_handler<T: Handler>(_handler: &T) {
        // no op
    }

    #[test]
    fn fn_is_handler() {
        let handler = make_handler(echo_path);
        assert_is_handler(&handler);
        assert_is_handler(&Arc::new(make_handler(echo_path)));
    }

    #[tokio::test]
    async fn shared_handler_delegates() {
        let handler: SharedHandler = Arc::new(make_handler(|_req: Request| async { Response::created() }));

        let response = handler.call(Request::new(Method::POST, "/files/a")).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = make_handler(echo_path).call(Request::new(Method::GET, "/echo/x")).await;
        assert_eq!(&response.body_bytes()[..], b"/echo/x");
    }

    #[tokio::test]
    async fn coding_follows_request_reaching_handler() {
        let handler = negotiate_coding(Arc::new(make_handler(echo_path)));

        let request = Request::new(Method::GET, "/").header("Accept-Encoding", "gzip");
        assert_eq!(handler.call(request).await.content_coding(), Some(ContentCoding::Gzip));

        let response = handler.call(Request::new(Method::GET, "/")).await;
        assert_eq!(response.content_coding(), Some(ContentCoding::Identity));
    }

    #[tokio::test]
    async fn coding_set_by_handler_is_kept() {
        let handler = negotiate_coding(Arc::new(make_handler(|_req: Request| async {
            let mut response = Response::ok().body("raw");
            response.set_content_coding(ContentCoding::Identity);
            response
        })));

        let request = Request::new(Method::GET, "/").header("Accept-Encoding", "gzip");
        assert_eq!(handler.call(request).await.content_coding(), Some(ContentCoding::Identity));
    }
}
