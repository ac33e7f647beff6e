//! Middlewares wrap a handler into another handler.
//!
//! A [`Middleware`] receives the next handler of the chain and returns the handler that
//! runs in its place. Because the wrapping handler owns `next`, it may inspect or rewrite
//! the request, inspect or rewrite the response, skip `next` entirely or call it more
//! than once.
//!
//! [`MiddlewareChain`] is an ordered list of middlewares that is itself a middleware. The
//! first registered middleware ends up outermost:
//!
//! ```text
//! A(before) -> B(before) -> handler -> B(after) -> A(after)
//! ```

mod middleware_fn;

use std::fmt;
use std::sync::Arc;

use burrow_http::handler::SharedHandler;

pub use middleware_fn::{FnMiddleware, middleware_fn};

pub trait Middleware: Send + Sync {
    fn decorate(&self, next: SharedHandler) -> SharedHandler;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    #[inline]
    fn decorate(&self, next: SharedHandler) -> SharedHandler {
        (**self).decorate(next)
    }
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    #[inline]
    fn decorate(&self, next: SharedHandler) -> SharedHandler {
        (**self).decorate(next)
    }
}

/// Middlewares in registration order.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// A new chain running `self` outside of `inner`.
    pub fn concat(&self, inner: &MiddlewareChain) -> MiddlewareChain {
        let middlewares = self.middlewares.iter().chain(inner.middlewares.iter()).cloned().collect();
        MiddlewareChain { middlewares }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl Middleware for MiddlewareChain {
    fn decorate(&self, next: SharedHandler) -> SharedHandler {
        // the last registered middleware wraps the handler first
        self.middlewares.iter().rev().fold(next, |handler, middleware| middleware.decorate(handler))
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain").field("len", &self.middlewares.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_http::handler::{Handler, make_handler};
    use burrow_http::protocol::{Request, Response};
    use http::{Method, StatusCode};
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn tracing_middleware(name: &'static str, trace: Trace) -> impl Middleware {
        middleware_fn(move |req: Request, next: SharedHandler| {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push(format!("{name}-before"));
                let response = next.call(req).await;
                trace.lock().unwrap().push(format!("{name}-after"));
                response
            }
        })
    }

    fn recording_handler(trace: Trace) -> SharedHandler {
        Arc::new(make_handler(move |_req: Request| {
            let trace = trace.clone();
            async move {
                trace.lock().unwrap().push("handler".to_string());
                Response::ok()
            }
        }))
    }

    #[tokio::test]
    async fn first_registered_is_outermost() {
        let trace = Trace::default();
        let mut chain = MiddlewareChain::new();
        chain.push(tracing_middleware("a", trace.clone()));
        chain.push(tracing_middleware("b", trace.clone()));

        let handler = chain.decorate(recording_handler(trace.clone()));
        handler.call(Request::new(Method::GET, "/")).await;

        assert_eq!(*trace.lock().unwrap(), vec!["a-before", "b-before", "handler", "b-after", "a-after"]);
    }

    #[tokio::test]
    async fn concat_keeps_outer_first() {
        let trace = Trace::default();
        let mut outer = MiddlewareChain::new();
        outer.push(tracing_middleware("root", trace.clone()));
        let mut inner = MiddlewareChain::new();
        inner.push(tracing_middleware("child", trace.clone()));

        let chain = outer.concat(&inner);
        assert_eq!(chain.len(), 2);
        assert_eq!(outer.len(), 1);

        chain.decorate(recording_handler(trace.clone())).call(Request::new(Method::GET, "/")).await;
        assert_eq!(*trace.lock().unwrap(), vec!["root-before", "child-before", "handler", "child-after", "root-after"]);
    }

    #[tokio::test]
    async fn empty_chain_is_identity() {
        let trace = Trace::default();
        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());

        let response = chain.decorate(recording_handler(trace.clone())).call(Request::new(Method::GET, "/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*trace.lock().unwrap(), vec!["handler"]);
    }

    #[tokio::test]
    async fn can_short_circuit() {
        let trace = Trace::default();
        let mut chain = MiddlewareChain::new();
        chain.push(middleware_fn(|req: Request, next: SharedHandler| async move {
            if !req.headers().contains("Authorization") {
                return Response::new(StatusCode::UNAUTHORIZED);
            }
            next.call(req).await
        }));

        let handler = chain.decorate(recording_handler(trace.clone()));

        let response = handler.call(Request::new(Method::GET, "/")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(trace.lock().unwrap().is_empty());

        let response = handler.call(Request::new(Method::GET, "/").header("authorization", "token")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*trace.lock().unwrap(), vec!["handler"]);
    }

    #[tokio::test]
    async fn can_call_next_twice_and_rewrite() {
        let trace = Trace::default();
        let mut chain = MiddlewareChain::new();
        chain.push(middleware_fn(|req: Request, next: SharedHandler| async move {
            next.call(req.clone()).await;
            let mut response = next.call(req).await;
            response.headers_mut().set("X-Calls", "2");
            response
        }));

        let response = chain.decorate(recording_handler(trace.clone())).call(Request::new(Method::GET, "/")).await;
        assert_eq!(response.headers().get("x-calls"), Some("2"));
        assert_eq!(*trace.lock().unwrap(), vec!["handler", "handler"]);
    }
}
