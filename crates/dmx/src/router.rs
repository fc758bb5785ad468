//! Main router implementation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::error::{Result, RouterError};
use crate::handler::{BoxFuture, Handler, handler_fn};
use crate::not_found::{NotFound, NotFoundHandler};
use crate::path::{Resource, trim};
use crate::request::{Method, PathParams, Request};
use crate::resources::ResourceSet;
use crate::response::Response;

/// Outcome of looking up a method and path.
///
/// The router never turns this into a status code; that is left to the
/// [`NotFoundHandler`].
#[derive(Debug)]
pub enum Dispatch<'a> {
    /// Nothing is registered under the method.
    MethodUnregistered,
    /// The method has resources, none of which matches the path.
    PathUnmatched,
    /// A resource matched.
    Matched {
        /// The first matching resource.
        resource: &'a Resource,
        /// Parameters bound by its named segments.
        params: PathParams,
    },
}

impl Dispatch<'_> {
    /// Whether a resource matched.
    pub const fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Maps methods and paths to handlers.
///
/// All registration happens through `&mut self` and all dispatch through
/// `&self`, so once the router is shared (e.g. behind an `Arc`) it is
/// read-only and workers may dispatch concurrently without locking.
/// Registering at runtime would need the router behind a `RwLock`.
///
/// # Example
///
/// ```
/// use dmx::{Request, Response, Router};
///
/// # fn main() -> dmx::Result<()> {
/// let mut router = Router::new();
/// router
///     .get_fn("/", |_req| async { Response::text("index") })?
///     .putp_fn("/posts/:id", |req: Request| async move {
///         Response::text(format!("updated {}", req.params.get("id").unwrap_or("")))
///     })?;
///
/// assert!(router.dispatch(&"PATCH".into(), "/posts/7").is_matched());
/// # Ok(())
/// # }
/// ```
pub struct Router {
    /// One entry per method with at least one registration.
    resources: HashMap<Method, ResourceSet>,
    /// Fallback for unmatched requests.
    not_found: Arc<dyn NotFoundHandler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("resources", &self.resources)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Creates a new empty router with the [`NotFound`] fallback.
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
            not_found: Arc::new(NotFound),
        }
    }

    /// Replaces the fallback used for unmatched requests.
    #[must_use]
    pub fn not_found_handler(mut self, handler: impl NotFoundHandler + 'static) -> Self {
        self.not_found = Arc::new(handler);
        self
    }

    /// Registers `handler` for `pattern` under every method in `methods`.
    ///
    /// The pattern is normalized first (see [`trim`]). Fails if a method
    /// already has that normalized pattern, or is listed twice. Nothing is
    /// registered when the call fails.
    ///
    /// A duplicate is a setup bug: propagate the error and abort startup.
    pub fn add(
        &mut self,
        pattern: &str,
        handler: impl Handler + 'static,
        methods: &[Method],
    ) -> Result<&mut Self> {
        let pattern = trim(pattern);
        let methods: Vec<Method> = methods.iter().map(Method::canonical).collect();

        for (i, method) in methods.iter().enumerate() {
            let registered = self
                .resources
                .get(method)
                .is_some_and(|set| set.contains(pattern));
            if registered || methods[..i].contains(method) {
                warn!(%method, pattern, "duplicate route");
                return Err(RouterError::DuplicateRoute {
                    method: method.to_string(),
                    pattern: pattern.to_string(),
                });
            }
        }

        let handler: Arc<dyn Handler> = Arc::new(handler);
        for method in methods {
            debug!(%method, pattern, "registering route");
            self.resources
                .entry(method)
                .or_default()
                .add(Resource::new(pattern, Arc::clone(&handler)));
        }

        Ok(self)
    }

    /// Registers an async closure under every method in `methods`.
    pub fn add_fn<F, Fut>(&mut self, pattern: &str, f: F, methods: &[Method]) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.add(pattern, handler_fn(f), methods)
    }

    /// Adds a GET route.
    pub fn get(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.add(pattern, handler, &[Method::Get])
    }

    /// Adds a HEAD route.
    pub fn head(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.add(pattern, handler, &[Method::Head])
    }

    /// Adds one handler for both HEAD and GET.
    pub fn geth(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.add(pattern, handler, &[Method::Head, Method::Get])
    }

    /// Adds a POST route.
    pub fn post(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.add(pattern, handler, &[Method::Post])
    }

    /// Adds a PUT route.
    pub fn put(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.add(pattern, handler, &[Method::Put])
    }

    /// Adds one handler for both PUT and PATCH.
    pub fn putp(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.add(pattern, handler, &[Method::Put, Method::Patch])
    }

    /// Adds a PATCH route.
    pub fn patch(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.add(pattern, handler, &[Method::Patch])
    }

    /// Adds a DELETE route.
    pub fn del(&mut self, pattern: &str, handler: impl Handler + 'static) -> Result<&mut Self> {
        self.add(pattern, handler, &[Method::Delete])
    }

    /// Adds a GET route from an async closure.
    pub fn get_fn<F, Fut>(&mut self, pattern: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.get(pattern, handler_fn(f))
    }

    /// Adds a HEAD route from an async closure.
    pub fn head_fn<F, Fut>(&mut self, pattern: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.head(pattern, handler_fn(f))
    }

    /// Adds a HEAD and GET route from an async closure.
    pub fn geth_fn<F, Fut>(&mut self, pattern: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.geth(pattern, handler_fn(f))
    }

    /// Adds a POST route from an async closure.
    pub fn post_fn<F, Fut>(&mut self, pattern: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.post(pattern, handler_fn(f))
    }

    /// Adds a PUT route from an async closure.
    pub fn put_fn<F, Fut>(&mut self, pattern: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.put(pattern, handler_fn(f))
    }

    /// Adds a PUT and PATCH route from an async closure.
    pub fn putp_fn<F, Fut>(&mut self, pattern: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.putp(pattern, handler_fn(f))
    }

    /// Adds a PATCH route from an async closure.
    pub fn patch_fn<F, Fut>(&mut self, pattern: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.patch(pattern, handler_fn(f))
    }

    /// Adds a DELETE route from an async closure.
    pub fn del_fn<F, Fut>(&mut self, pattern: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.del(pattern, handler_fn(f))
    }

    /// Returns the resources registered under `method`, if any.
    pub fn resources(&self, method: &Method) -> Option<&ResourceSet> {
        self.resources.get(&method.canonical())
    }

    /// Iterates the methods that have at least one resource.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.resources.keys()
    }

    /// Looks up the resource for a method and path.
    ///
    /// `Method::Other("GET")` and `Method::Get` name the same method.
    pub fn dispatch(&self, method: &Method, path: &str) -> Dispatch<'_> {
        let Some(set) = self.resources.get(&method.canonical()) else {
            return Dispatch::MethodUnregistered;
        };

        match set.match_path(path) {
            Some((resource, params)) => Dispatch::Matched { resource, params },
            None => Dispatch::PathUnmatched,
        }
    }

    /// Returns the matching resource and its parameters, if any.
    pub fn match_request(&self, method: &Method, path: &str) -> Option<(&Resource, PathParams)> {
        match self.dispatch(method, path) {
            Dispatch::Matched { resource, params } => Some((resource, params)),
            Dispatch::MethodUnregistered | Dispatch::PathUnmatched => None,
        }
    }

    /// Methods under which some resource matches `path`, sorted by name.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .resources
            .iter()
            .filter(|(_, set)| set.match_path(path).is_some())
            .map(|(method, _)| method.clone())
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    /// Runs the fallback for an unmatched request.
    pub fn not_found(&self, request: Request) -> BoxFuture<'_, Response> {
        self.not_found.handle(self, request)
    }

    /// Handles an incoming request.
    pub fn handle(&self, request: Request) -> BoxFuture<'_, Response> {
        match self.dispatch(&request.method, &request.path) {
            Dispatch::Matched { resource, params } => {
                trace!(
                    method = %request.method,
                    path = %request.path,
                    pattern = resource.pattern(),
                    "matched"
                );
                resource.handle(request, params)
            }
            outcome => {
                trace!(
                    method = %request.method,
                    path = %request.path,
                    ?outcome,
                    "no resource matched"
                );
                self.not_found(request)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hello_handler(_req: Request) -> Response {
        Response::text("Hello, World!")
    }

    async fn post_handler(req: Request) -> Response {
        let id = req.params.get(":id").unwrap_or("unknown");
        Response::text(format!("Post: {id}"))
    }

    #[tokio::test]
    async fn test_basic_routing() {
        let mut router = Router::new();
        router
            .get_fn("/", hello_handler)
            .unwrap()
            .get_fn("/posts/:id", post_handler)
            .unwrap();

        let res = router.handle(Request::get("/")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, World!".to_string()));
    }

    #[tokio::test]
    async fn test_path_params() {
        let mut router = Router::new();
        router.get_fn("/posts/:id", post_handler).unwrap();

        let res = router.handle(Request::get("/posts/123/")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Post: 123".to_string()));
    }

    #[test]
    fn test_dispatch_outcomes() {
        let mut router = Router::new();
        router.get_fn("/posts", hello_handler).unwrap();

        assert!(matches!(
            router.dispatch(&Method::Delete, "/posts"),
            Dispatch::MethodUnregistered
        ));
        assert!(matches!(
            router.dispatch(&Method::Get, "/users"),
            Dispatch::PathUnmatched
        ));
        assert!(router.dispatch(&Method::Get, "/posts/").is_matched());
        assert!(router.match_request(&Method::Get, "/users").is_none());
    }

    #[test]
    fn test_duplicate_after_normalization() {
        let mut router = Router::new();
        router.post_fn("/posts", hello_handler).unwrap();

        let err = router.post_fn("/posts/", hello_handler).unwrap_err();
        assert_eq!(
            err,
            RouterError::DuplicateRoute {
                method: "POST".to_string(),
                pattern: "/posts".to_string(),
            }
        );
        assert_eq!(err.to_string(), "mux: POST /posts is already defined");
    }

    #[test]
    fn test_duplicate_method_in_one_call() {
        let mut router = Router::new();
        let err = router
            .add_fn("", hello_handler, &[Method::Post, Method::Post])
            .unwrap_err();
        assert_eq!(err.to_string(), "mux: POST / is already defined");
    }

    #[test]
    fn test_failed_add_registers_nothing() {
        let mut router = Router::new();
        router.patch_fn("/posts/:id", hello_handler).unwrap();

        assert!(router.putp_fn("/posts/:id", hello_handler).is_err());
        assert!(router.resources(&Method::Put).is_none());
        assert_eq!(router.resources(&Method::Patch).map(ResourceSet::len), Some(1));
    }

    #[test]
    fn test_same_pattern_other_method_is_fine() {
        let mut router = Router::new();
        router
            .get_fn("/posts", hello_handler)
            .unwrap()
            .post_fn("/posts", hello_handler)
            .unwrap();

        let mut methods: Vec<_> = router.methods().map(Method::as_str).collect();
        methods.sort_unstable();
        assert_eq!(methods, vec!["GET", "POST"]);
    }

    #[test]
    fn test_shared_handler_across_methods() {
        let mut router = Router::new();
        router.geth_fn("/", hello_handler).unwrap();

        let (get, _) = router.match_request(&Method::Get, "/").unwrap();
        let (head, _) = router.match_request(&Method::Head, "/").unwrap();
        assert!(Arc::ptr_eq(get.handler(), head.handler()));
    }

    #[tokio::test]
    async fn test_not_found() {
        let mut router = Router::new();
        router.get_fn("/", hello_handler).unwrap();

        let res = router.handle(Request::get("/nonexistent")).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let mut router = Router::new();
        router.get_fn("/", hello_handler).unwrap();

        let res = router.handle(Request::post("/")).await;
        assert_eq!(res.status, 405);
        assert_eq!(res.get_header("Allow"), Some("GET"));
    }

    #[tokio::test]
    async fn test_custom_not_found_handler() {
        let mut router =
            Router::new().not_found_handler(crate::not_found::FallbackHandler(handler_fn(
                |_req: Request| async { Response::text("nothing here").status(404) },
            )));
        router.get_fn("/", hello_handler).unwrap();

        let res = router.handle(Request::post("/")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body_string(), Some("nothing here".to_string()));
    }
}
