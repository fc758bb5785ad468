//! Fallbacks for requests no resource matched.

use crate::handler::{BoxFuture, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Invoked by [`Router::handle`] when dispatch finds no resource.
///
/// It receives the router so it can re-query other methods.
pub trait NotFoundHandler: Send + Sync {
    /// Produces the response for an unmatched request.
    fn handle<'a>(&'a self, router: &'a Router, req: Request) -> BoxFuture<'a, Response>;
}

/// Default fallback: 405 if some other method matches the path, else 404.
///
/// The 405 response carries an `Allow` header listing those methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl NotFoundHandler for NotFound {
    fn handle<'a>(&'a self, router: &'a Router, req: Request) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let allowed = router.allowed_methods(&req.path);
            if allowed.is_empty() {
                return Response::not_found();
            }

            let allow = allowed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Response::method_not_allowed().header("Allow", allow)
        })
    }
}

/// Always answers 404, without looking at other methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNotFound;

impl NotFoundHandler for PlainNotFound {
    fn handle<'a>(&'a self, _router: &'a Router, _req: Request) -> BoxFuture<'a, Response> {
        Box::pin(async { Response::not_found() })
    }
}

/// Uses an ordinary [`Handler`] as the fallback.
pub struct FallbackHandler<H>(pub H);

impl<H: Handler> NotFoundHandler for FallbackHandler<H> {
    fn handle<'a>(&'a self, _router: &'a Router, req: Request) -> BoxFuture<'a, Response> {
        self.0.handle(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::request::Method;

    fn ok() -> impl Handler + 'static {
        handler_fn(|_req: Request| async { Response::ok() })
    }

    #[tokio::test]
    async fn test_not_found_without_any_match() {
        let mut router = Router::new();
        router.get("/posts", ok()).unwrap();

        let res = NotFound.handle(&router, Request::get("/users")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.get_header("Allow"), None);
    }

    #[tokio::test]
    async fn test_method_not_allowed_lists_methods() {
        let mut router = Router::new();
        router
            .add("/posts", ok(), &[Method::Post, Method::Get])
            .unwrap();

        let res = NotFound.handle(&router, Request::delete("/posts")).await;
        assert_eq!(res.status, 405);
        assert_eq!(res.get_header("Allow"), Some("GET, POST"));
    }

    #[tokio::test]
    async fn test_plain_not_found() {
        let mut router = Router::new();
        router.get("/posts", ok()).unwrap();

        let res = PlainNotFound.handle(&router, Request::post("/posts")).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn test_fallback_handler() {
        let router = Router::new();
        let fallback = FallbackHandler(handler_fn(|req: Request| async move {
            Response::new(410).body(req.path)
        }));

        let res = fallback.handle(&router, Request::get("/gone")).await;
        assert_eq!(res.status, 410);
        assert_eq!(res.body_string(), Some("/gone".to_string()));
    }
}
