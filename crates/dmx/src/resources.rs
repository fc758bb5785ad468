//! Per-method resource collections.

use crate::path::Resource;
use crate::request::PathParams;

/// All resources registered under one method, in registration order.
///
/// Order is the search order: the first resource whose pattern matches
/// wins.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    resources: Vec<Resource>,
}

impl ResourceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource. Duplicate detection is up to the caller.
    pub fn add(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    /// Whether a resource with this exact normalized pattern exists.
    pub fn contains(&self, pattern: &str) -> bool {
        self.resources.iter().any(|r| r.pattern() == pattern)
    }

    /// Finds the first resource matching `path`, with its bound parameters.
    pub fn match_path(&self, path: &str) -> Option<(&Resource, PathParams)> {
        self.resources
            .iter()
            .find_map(|r| r.match_path(path).map(|params| (r, params)))
    }

    /// Iterates the resources in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
