//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
///
/// Unmatched requests are not errors; they fall through to the
/// [`NotFoundHandler`](crate::NotFoundHandler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The method already has a resource with this normalized pattern.
    ///
    /// Raised during setup. Callers are expected to propagate it and abort
    /// startup.
    #[error("mux: {method} {pattern} is already defined")]
    DuplicateRoute {
        /// The offending method.
        method: String,
        /// The normalized pattern.
        pattern: String,
    },
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
