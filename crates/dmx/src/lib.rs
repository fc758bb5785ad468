//! # dmx
//!
//! A small method-aware HTTP request router.
//!
//! This crate provides:
//! - Path patterns with literal and named (`:name`) segments
//! - One ordered resource set per HTTP method, first match wins
//! - Fail-fast duplicate detection at registration time
//! - A tri-state dispatch result, rendered into 404/405 by a pluggable
//!   fallback
//!
//! The transport (accepting connections, parsing requests, writing
//! responses) is not part of this crate; it hands a [`Request`] to
//! [`Router::handle`] and writes back the [`Response`].
//!
//! ## Quick Start
//!
//! ```
//! use dmx::{Request, Response, Router};
//!
//! async fn index(_req: Request) -> Response {
//!     Response::text("Hello, World!")
//! }
//!
//! async fn tag(req: Request) -> Response {
//!     let post_id = req.params.get(":post_id").unwrap_or_default();
//!     let id = req.params.get(":id").unwrap_or_default();
//!     Response::text(format!("post_id={post_id}&id={id}"))
//! }
//!
//! # fn main() -> dmx::Result<()> {
//! let mut router = Router::new();
//! router
//!     .geth_fn("/", index)?
//!     .get_fn("/posts/:post_id/tags/:id", tag)?;
//!
//! let response = futures::executor::block_on(
//!     router.handle(Request::get("/posts/123/tags/456")),
//! );
//! assert_eq!(response.body_string().unwrap(), "post_id=123&id=456");
//! # Ok(())
//! # }
//! ```
//!
//! ## Patterns
//!
//! Segments are separated by `/`. A segment starting with `:` captures
//! any single non-empty path segment under the rest of its name; every
//! other segment must match exactly. Trailing slashes are ignored and the
//! empty pattern is `/`.
//!
//! ## Unmatched requests
//!
//! [`Router::dispatch`] reports whether the method is unregistered, the
//! path is unmatched, or a resource matched. [`Router::handle`] sends the
//! first two cases to the configured [`NotFoundHandler`]. The default,
//! [`NotFound`], answers 405 when the path matches under some other method
//! and 404 otherwise.
//!
//! ## Registration errors
//!
//! Registering the same normalized pattern twice for one method returns
//! [`RouterError::DuplicateRoute`]. Treat it as fatal and abort startup.

mod error;
mod handler;
mod not_found;
mod path;
mod request;
mod resources;
mod response;
mod router;

pub use error::{Result, RouterError};
pub use handler::{BoxFuture, Handler, HandlerFn, handler_fn};
pub use not_found::{FallbackHandler, NotFound, NotFoundHandler, PlainNotFound};
pub use path::{PARAM_MARKER, Resource, Segment, trim};
pub use request::{Method, PathParams, Request};
pub use resources::ResourceSet;
pub use response::Response;
pub use router::{Dispatch, Router};
