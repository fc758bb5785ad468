//! Handler abstraction shared by every resource.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

/// A boxed future for async handler operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can handle a request.
///
/// The router treats handlers as opaque: it only decides whether to call
/// one. Path parameters bound by the matching resource are available in
/// [`Request::params`].
///
/// # Example
///
/// ```
/// use dmx::{BoxFuture, Handler, Request, Response};
///
/// struct Hello;
///
/// impl Handler for Hello {
///     fn handle(&self, _req: Request) -> BoxFuture<'_, Response> {
///         Box::pin(async { Response::text("hello") })
///     }
/// }
/// ```
pub trait Handler: Send + Sync {
    /// Handles the request and produces a response.
    fn handle(&self, req: Request) -> BoxFuture<'_, Response>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle(&self, req: Request) -> BoxFuture<'_, Response> {
        (**self).handle(req)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn handle(&self, req: Request) -> BoxFuture<'_, Response> {
        (**self).handle(req)
    }
}

/// Adapts an async function or closure into a [`Handler`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn handle(&self, req: Request) -> BoxFuture<'_, Response> {
        Box::pin((self.f)(req))
    }
}

/// Wraps `f` so it can be registered wherever a [`Handler`] is expected.
///
/// ```
/// use dmx::{handler_fn, Request, Response};
///
/// let handler = handler_fn(|req: Request| async move {
///     Response::text(format!("id={}", req.params.get("id").unwrap_or("")))
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    HandlerFn { f }
}
