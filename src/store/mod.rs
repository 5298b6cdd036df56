//! Component graph storage.

pub mod memory;

use std::collections::BTreeSet;

use crate::types::{BuildStatus, Component, ComponentId, Edge};

/// Read access to a component graph.
///
/// Implementations must guarantee deterministic ordering of results.
/// All methods are synchronous and side-effect free, so a graph can be
/// shared across threads during a parallel resolution pass.
pub trait ComponentGraph: Send + Sync {
    /// Build status of a component, or `None` if it was never declared.
    fn status_of(&self, id: &ComponentId) -> Option<BuildStatus>;

    /// Components with an edge pointing into `id` (ordered by ComponentId).
    ///
    /// Undeclared ids have no producers.
    fn producers_of(&self, id: &ComponentId) -> BTreeSet<ComponentId>;

    /// Components consuming `id` (ordered by ComponentId).
    fn consumers_of(&self, id: &ComponentId) -> BTreeSet<ComponentId>;

    /// All declared components (ordered by ComponentId).
    fn all_components(&self) -> Vec<Component>;

    /// All declared edges (canonical order, duplicates preserved).
    fn all_edges(&self) -> Vec<Edge>;

    /// Whether the component was declared.
    fn contains(&self, id: &ComponentId) -> bool {
        self.status_of(id).is_some()
    }
}

pub use memory::{InMemoryComponentGraph, GraphError};
