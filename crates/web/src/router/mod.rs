//! Route tree and matcher.
//!
//! A [`Router`] is a tree of nodes. Each node holds routes (method, pattern, handler)
//! and child nodes mounted under a path prefix, the subrouters. Middlewares registered on
//! a node apply to every route of that node and of its descendants, outer nodes first.
//!
//! The tree is assembled with a [`RouterBuilder`] and sealed by [`RouterBuilder::build`],
//! which validates every pattern and composes every route's middleware chain once.
//!
//! # Matching
//!
//! [`Router::at`] walks the tree depth first:
//! - local routes in registration order, the first whose method and pattern match wins
//! - then children in registration order, a child is entered when its prefix matches the
//!   leading segments and the remaining segments are matched inside it
//! - parameters captured by a prefix are visible to the handler, deeper parameters with
//!   the same name win
//!
//! # Example
//!
//! ```
//! use burrow_web::router::Router;
//! use burrow_web::{make_handler, Request, Response};
//! use http::Method;
//!
//! async fn echo(req: Request) -> Response {
//!     Response::ok().body(req.param("str").unwrap_or_default().to_string())
//! }
//!
//! let router = Router::builder()
//!     .get("/echo/{str}", make_handler(echo))
//!     .build()
//!     .unwrap();
//!
//! let result = router.at(&Method::GET, &["echo", "abc"]);
//! assert!(result.handler().is_some());
//! assert_eq!(result.params().get("str"), Some("abc"));
//! ```

mod pattern;

use std::fmt;
use std::sync::Arc;

use burrow_http::handler::{Handler, SharedHandler, negotiate_coding};
use burrow_http::protocol::Params;
use http::Method;
use tracing::trace;

use crate::middleware::{Middleware, MiddlewareChain};

pub use pattern::{PathPattern, RouteError};

/// The sealed route tree.
#[derive(Debug)]
pub struct Router {
    root: RouterNode,
    root_middlewares: MiddlewareChain,
}

/// A (method, pattern, handler) binding. The handler is already wrapped by every
/// middleware in scope.
pub struct Route {
    method: Method,
    pattern: PathPattern,
    handler: SharedHandler,
}

#[derive(Debug)]
struct RouterNode {
    routes: Vec<Route>,
    children: Vec<(PathPattern, RouterNode)>,
}

/// Outcome of [`Router::at`]: the matched handler, if any, and the captured path
/// parameters.
pub struct RouteResult<'router> {
    handler: Option<&'router SharedHandler>,
    params: Params,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Finds the handler for `method` and the path `segments`.
    ///
    /// `segments` is the path split on `/` without the leading empty segment, see
    /// [`split_path`](burrow_http::protocol::split_path).
    pub fn at<'router>(&'router self, method: &Method, segments: &[&str]) -> RouteResult<'router> {
        match self.root.find(method, segments) {
            Some((route, params)) => {
                trace!(%method, pattern = %route.pattern, "route matched");
                RouteResult { handler: Some(&route.handler), params }
            }
            None => RouteResult::empty(),
        }
    }

    /// Middlewares registered on the root node, the ones a not-found fallback runs through.
    pub fn root_middlewares(&self) -> &MiddlewareChain {
        &self.root_middlewares
    }
}

impl RouterNode {
    fn find(&self, method: &Method, segments: &[&str]) -> Option<(&Route, Params)> {
        let local = self
            .routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| route.pattern.capture(segments).map(|params| (route, params)));
        if local.is_some() {
            return local;
        }

        self.children.iter().find_map(|(prefix, child)| {
            let (mut params, rest) = prefix.capture_prefix(segments)?;
            let (route, child_params) = child.find(method, rest)?;
            params.merge(child_params);
            Some((route, params))
        })
    }
}

impl Route {
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[inline]
    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("method", &self.method).field("pattern", &self.pattern).finish_non_exhaustive()
    }
}

impl<'router> RouteResult<'router> {
    fn empty() -> Self {
        Self { handler: None, params: Params::new() }
    }

    /// Returns true if no route matched
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handler.is_none()
    }

    #[inline]
    pub fn handler(&self) -> Option<&'router SharedHandler> {
        self.handler
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_parts(self) -> (Option<&'router SharedHandler>, Params) {
        (self.handler, self.params)
    }
}

impl fmt::Debug for RouteResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteResult").field("matched", &self.handler.is_some()).field("params", &self.params).finish()
    }
}

struct RouteBuilder {
    method: Method,
    pattern: String,
    handler: SharedHandler,
}

impl fmt::Debug for RouteBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBuilder").field("method", &self.method).field("pattern", &self.pattern).finish_non_exhaustive()
    }
}

/// Collects routes, subrouters and middlewares for one node of the tree.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    routes: Vec<RouteBuilder>,
    children: Vec<(String, RouterBuilder)>,
    middlewares: MiddlewareChain,
}

macro_rules! method_route {
    ($name:ident, $method:expr) => {
        pub fn $name(self, pattern: impl Into<String>, handler: impl Handler + 'static) -> Self {
            self.route($method, pattern, handler)
        }
    };
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: Method, pattern: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.routes.push(RouteBuilder { method, pattern: pattern.into(), handler: Arc::new(handler) });
        self
    }

    method_route!(get, Method::GET);
    method_route!(post, Method::POST);
    method_route!(put, Method::PUT);
    method_route!(delete, Method::DELETE);

    /// Adds a middleware to this node. It wraps the routes of this node and of every
    /// subrouter below it.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Mounts `router` under `prefix`. The prefix may contain parameters.
    pub fn subrouter(mut self, prefix: impl Into<String>, router: RouterBuilder) -> Self {
        self.children.push((prefix.into(), router));
        self
    }

    /// Validates every pattern and composes the middleware chain of every route.
    pub fn build(self) -> Result<Router, RouteError> {
        let root_middlewares = self.middlewares.clone();
        let root = self.build_node(&MiddlewareChain::new())?;
        Ok(Router { root, root_middlewares })
    }

    fn build_node(self, inherited: &MiddlewareChain) -> Result<RouterNode, RouteError> {
        let chain = inherited.concat(&self.middlewares);

        let routes = self
            .routes
            .into_iter()
            .map(|route| {
                let pattern = PathPattern::parse(&route.pattern)?;
                Ok(Route { method: route.method, pattern, handler: chain.decorate(negotiate_coding(route.handler)) })
            })
            .collect::<Result<Vec<_>, RouteError>>()?;

        let children = self
            .children
            .into_iter()
            .map(|(prefix, builder)| Ok((PathPattern::parse(&prefix)?, builder.build_node(&chain)?)))
            .collect::<Result<Vec<_>, RouteError>>()?;

        Ok(RouterNode { routes, children })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::middleware_fn;
    use burrow_http::handler::make_handler;
    use burrow_http::protocol::{Request, Response, split_path};

    fn named(name: &'static str) -> impl Handler {
        make_handler(move |_req: Request| async move { Response::ok().body(name) })
    }

    async fn call(router: &Router, method: Method, path: &str) -> Option<(String, Params)> {
        let segments = split_path(path);
        let (handler, params) = router.at(&method, &segments).into_parts();
        let response = handler?.call(Request::new(method, path)).await;
        Some((String::from_utf8(response.body_bytes().to_vec()).unwrap(), params))
    }

    fn tag(name: &'static str) -> impl Middleware {
        middleware_fn(move |req: Request, next: SharedHandler| async move {
            let mut response = next.call(req).await;
            response.headers_mut().add("X-Trace", name);
            response
        })
    }

    #[tokio::test]
    async fn literal_routes() {
        let router = Router::builder().get("/", named("index")).get("/user-agent", named("ua")).build().unwrap();

        let (body, params) = call(&router, Method::GET, "/").await.unwrap();
        assert_eq!(body, "index");
        assert!(params.is_empty());

        let (body, _) = call(&router, Method::GET, "/user-agent").await.unwrap();
        assert_eq!(body, "ua");

        assert!(call(&router, Method::GET, "/user-agent/").await.is_none());
        assert!(call(&router, Method::GET, "/user-agent/x").await.is_none());
        assert!(call(&router, Method::GET, "/nope").await.is_none());
    }

    #[tokio::test]
    async fn param_routes() {
        let router = Router::builder().get("/echo/{str}", named("echo")).build().unwrap();

        let (_, params) = call(&router, Method::GET, "/echo/abc").await.unwrap();
        assert_eq!(params.get("str"), Some("abc"));

        let (_, params) = call(&router, Method::GET, "/echo/").await.unwrap();
        assert_eq!(params.get("str"), Some(""));

        assert!(call(&router, Method::GET, "/echo").await.is_none());
        assert!(call(&router, Method::GET, "/echo/a/b").await.is_none());
    }

    #[tokio::test]
    async fn method_must_match() {
        let router = Router::builder()
            .get("/files/{filename}", named("read"))
            .post("/files/{filename}", named("write"))
            .build()
            .unwrap();

        assert_eq!(call(&router, Method::GET, "/files/a").await.unwrap().0, "read");
        assert_eq!(call(&router, Method::POST, "/files/a").await.unwrap().0, "write");
        assert!(call(&router, Method::DELETE, "/files/a").await.is_none());
    }

    #[tokio::test]
    async fn earlier_route_wins() {
        let router = Router::builder()
            .get("/echo/{str}", named("param"))
            .get("/echo/fixed", named("literal"))
            .build()
            .unwrap();

        assert_eq!(call(&router, Method::GET, "/echo/fixed").await.unwrap().0, "param");
    }

    #[tokio::test]
    async fn local_routes_before_subrouters() {
        let router = Router::builder()
            .subrouter("/api", Router::builder().get("/status", named("child")))
            .get("/api/status", named("local"))
            .build()
            .unwrap();

        assert_eq!(call(&router, Method::GET, "/api/status").await.unwrap().0, "local");
    }

    #[tokio::test]
    async fn subrouter_params() {
        let router = Router::builder()
            .subrouter(
                "/users/{id}",
                Router::builder()
                    .get("/profile", named("profile"))
                    .get("/override/{id}", named("override"))
                    .subrouter("/posts", Router::builder().get("/{post}", named("post"))),
            )
            .build()
            .unwrap();

        let (body, params) = call(&router, Method::GET, "/users/7/profile").await.unwrap();
        assert_eq!(body, "profile");
        assert_eq!(params.get("id"), Some("7"));

        let (_, params) = call(&router, Method::GET, "/users/7/override/8").await.unwrap();
        assert_eq!(params.get("id"), Some("8"));
        assert_eq!(params.len(), 1);

        let (body, params) = call(&router, Method::GET, "/users/7/posts/42").await.unwrap();
        assert_eq!(body, "post");
        assert_eq!(params.get("id"), Some("7"));
        assert_eq!(params.get("post"), Some("42"));

        assert!(call(&router, Method::GET, "/users/7").await.is_none());
        assert!(call(&router, Method::GET, "/users").await.is_none());
    }

    #[tokio::test]
    async fn unmatched_child_falls_through() {
        let router = Router::builder()
            .subrouter("/api", Router::builder().get("/a", named("first")))
            .subrouter("/api", Router::builder().get("/b", named("second")))
            .build()
            .unwrap();

        assert_eq!(call(&router, Method::GET, "/api/a").await.unwrap().0, "first");
        assert_eq!(call(&router, Method::GET, "/api/b").await.unwrap().0, "second");
    }

    #[tokio::test]
    async fn middlewares_root_to_leaf() {
        let router = Router::builder()
            .middleware(tag("root"))
            .get("/", named("index"))
            .subrouter("/api", Router::builder().middleware(tag("api")).get("/a", named("a")))
            .build()
            .unwrap();

        let segments = split_path("/api/a");
        let handler = router.at(&Method::GET, &segments).handler().unwrap().clone();
        let response = handler.call(Request::new(Method::GET, "/api/a")).await;
        // responses travel back out, innermost tag first
        assert_eq!(response.headers().get_all("x-trace"), ["api", "root"]);

        let segments = split_path("/");
        let handler = router.at(&Method::GET, &segments).handler().unwrap().clone();
        let response = handler.call(Request::new(Method::GET, "/")).await;
        assert_eq!(response.headers().get_all("x-trace"), ["root"]);

        assert_eq!(router.root_middlewares().len(), 1);
    }

    #[test]
    fn invalid_pattern_fails_build() {
        let result = Router::builder().get("echo", named("echo")).build();
        assert!(matches!(result, Err(RouteError::MissingLeadingSlash { .. })));

        let result = Router::builder().subrouter("/{id", Router::builder().get("/", named("x"))).build();
        assert!(matches!(result, Err(RouteError::UnbalancedBrace { .. })));

        let result = Router::builder().subrouter("/api", Router::builder().get("/{}", named("x"))).build();
        assert!(matches!(result, Err(RouteError::EmptyParamName { .. })));
    }
}
