//! In-memory component graph.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{BuildStatus, Component, ComponentId, Edge};
use super::ComponentGraph;

/// Error type for graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Edge references a component that was never added.
    #[error("Unknown component: {0}")]
    UnknownComponent(ComponentId),
    /// Component was added twice.
    #[error("Duplicate component: {0}")]
    DuplicateComponent(ComponentId),
}

/// In-memory component graph.
///
/// Uses BTreeMap/BTreeSet for deterministic iteration order.
/// Edges must reference declared components: `add_edge` rejects
/// unknown endpoints instead of silently dropping them at lookup time.
#[derive(Debug, Clone, Default)]
pub struct InMemoryComponentGraph {
    /// Components by ID.
    components: BTreeMap<ComponentId, BuildStatus>,
    /// Consumer -> producers mapping.
    producers: BTreeMap<ComponentId, BTreeSet<ComponentId>>,
    /// Producer -> consumers mapping.
    consumers: BTreeMap<ComponentId, BTreeSet<ComponentId>>,
    /// All edges, in insertion order.
    edges: Vec<Edge>,
}

impl InMemoryComponentGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component to the graph.
    pub fn add_component(
        &mut self,
        id: impl Into<ComponentId>,
        status: BuildStatus,
    ) -> Result<(), GraphError> {
        let id = id.into();
        if self.components.contains_key(&id) {
            return Err(GraphError::DuplicateComponent(id));
        }
        self.components.insert(id, status);
        Ok(())
    }

    /// Add a producer edge to the graph.
    ///
    /// Both endpoints must already be declared. Repeating an edge is
    /// allowed and has no effect on producer lookups.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        for endpoint in [&edge.producer, &edge.consumer] {
            if !self.components.contains_key(endpoint) {
                return Err(GraphError::UnknownComponent(endpoint.clone()));
            }
        }

        self.producers
            .entry(edge.consumer.clone())
            .or_default()
            .insert(edge.producer.clone());

        self.consumers
            .entry(edge.producer.clone())
            .or_default()
            .insert(edge.consumer.clone());

        self.edges.push(edge);
        Ok(())
    }

    /// Get number of components.
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Get number of edges, duplicates included.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}

impl ComponentGraph for InMemoryComponentGraph {
    fn status_of(&self, id: &ComponentId) -> Option<BuildStatus> {
        self.components.get(id).copied()
    }

    fn producers_of(&self, id: &ComponentId) -> BTreeSet<ComponentId> {
        self.producers.get(id).cloned().unwrap_or_default()
    }

    fn consumers_of(&self, id: &ComponentId) -> BTreeSet<ComponentId> {
        self.consumers.get(id).cloned().unwrap_or_default()
    }

    fn all_components(&self) -> Vec<Component> {
        self.components
            .iter()
            .map(|(id, status)| Component::new(id.clone(), *status))
            .collect()
    }

    fn all_edges(&self) -> Vec<Edge> {
        let mut edges = self.edges.clone();
        // Sort for determinism
        edges.sort();
        edges
    }
}
