//! Path patterns and the resources built from them.

use std::fmt;
use std::sync::Arc;

use crate::handler::{BoxFuture, Handler};
use crate::request::{PathParams, Request};
use crate::response::Response;

/// Prefix marking a named segment in a pattern (`/posts/:id`).
pub const PARAM_MARKER: char = ':';

/// Strips trailing slashes. Always returns at least `"/"`.
///
/// Patterns and request paths go through the same normalization, so
/// `/posts/`, `/posts` and `/posts//` are the same resource, and the empty
/// pattern is the root.
///
/// ```
/// assert_eq!(dmx::trim("/posts/"), "/posts");
/// assert_eq!(dmx::trim(""), "/");
/// ```
pub fn trim(s: &str) -> &str {
    match s.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// A segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment byte-for-byte.
    Literal(String),
    /// Matches any non-empty path segment and binds it to the name.
    Param(String),
}

impl Segment {
    fn parse(part: &str) -> Self {
        part.strip_prefix(PARAM_MARKER).map_or_else(
            || Self::Literal(part.to_string()),
            |name| Self::Param(name.to_string()),
        )
    }
}

/// A normalized pattern bound to a handler.
///
/// Immutable once built; owned by the [`ResourceSet`](crate::ResourceSet)
/// of the method it was registered under.
#[derive(Clone)]
pub struct Resource {
    pattern: String,
    segments: Vec<Segment>,
    handler: Arc<dyn Handler>,
}

impl Resource {
    /// Builds a resource, normalizing `pattern` first.
    ///
    /// Splitting keeps empty segments, so `/` becomes the single
    /// canonical root shape `["", ""]`.
    pub fn new(pattern: &str, handler: Arc<dyn Handler>) -> Self {
        let pattern = trim(pattern).to_string();
        let segments = pattern.split('/').map(Segment::parse).collect();

        Self {
            pattern,
            segments,
            handler,
        }
    }

    /// Returns the normalized pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the per-segment matching metadata.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the handler bound to this resource.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Attempts to match a path against this resource's pattern.
    ///
    /// Returns the bound parameters if the path matches. Values are taken
    /// verbatim.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use dmx::{handler_fn, Request, Resource, Response};
    ///
    /// let handler = Arc::new(handler_fn(|_: Request| async { Response::ok() }));
    /// let resource = Resource::new("/posts/:post_id/tags/:id", handler);
    /// let params = resource.match_path("/posts/123/tags/456/").unwrap();
    /// assert_eq!(params.get("post_id"), Some("123"));
    /// assert_eq!(params.get(":id"), Some("456"));
    /// ```
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let mut parts = trim(path).split('/');
        let mut params = PathParams::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    params.insert(name.as_str(), part);
                }
                _ => return None,
            }
        }

        // The path has more segments than the pattern
        if parts.next().is_some() {
            return None;
        }

        Some(params)
    }

    /// Runs the handler with `params` attached to the request.
    pub fn handle(&self, mut req: Request, params: PathParams) -> BoxFuture<'_, Response> {
        req.params = params;
        self.handler.handle(req)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("pattern", &self.pattern)
            .field("segments", &self.segments)
            .finish_non_exhaustive()
    }
}
