#![allow(dead_code)]

use dmx::{Handler, Method, Request, Response, Router, handler_fn};

/// Handler that answers 200 with `body`.
pub fn text(body: &'static str) -> impl Handler + 'static {
    handler_fn(move |_req: Request| async move { Response::text(body) })
}

/// The blog route table shared by the dispatch tests.
pub fn blog_router() -> Router {
    let mut router = Router::new();
    router
        .add("/posts/:post_id/comments/:id", text(""), &[Method::Put, Method::Patch])
        .and_then(|r| r.add("/posts/:post_id/comments", text(""), &[Method::Post]))
        .and_then(|r| r.add("/posts/:post_id/comments", text(""), &[Method::Get]))
        .and_then(|r| r.add("/posts/:id", text(""), &[Method::Put, Method::Patch]))
        .and_then(|r| r.add("/posts", text(""), &[Method::Post]))
        .and_then(|r| r.add("/posts", text(""), &[Method::Get]))
        .and_then(|r| r.add("/", text(""), &[Method::Get]))
        .unwrap_or_else(|e| panic!("Failed to build blog router: {e}"));
    router
}

/// Dispatches `method path` and returns the status code.
pub async fn status(router: &Router, method: &str, path: &str) -> u16 {
    router.handle(Request::new(method, path)).await.status
}
