//! Graph snapshot identity.
//!
//! A `GraphSnapshot` fingerprints the component graph before a batch pass,
//! so a report can prove which graph state its manifests came from.
//! Unlike a timestamped record, the snapshot is a pure function of the
//! graph: the same graph always yields the same `snapshot_id`.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::store::ComponentGraph;
use crate::MANIFEST_KERNEL_SCHEMA_VERSION;

/// A deterministic fingerprint of the graph state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Unique identifier for this snapshot (xxh64 of all fields below).
    pub snapshot_id: String,
    /// Number of declared components.
    pub component_count: u64,
    /// Number of declared edges, duplicates included.
    pub edge_count: u64,
    /// Number of components with status `completed`.
    pub completed_count: u64,
    /// Schema version used for types.
    pub schema_version: String,
    /// Hash of sorted (component, status) pairs.
    pub component_hash: String,
    /// Hash of sorted (producer, consumer) edge pairs.
    pub edge_pair_hash: String,
}

/// Internal struct for computing snapshot_id hash.
#[derive(Serialize)]
struct SnapshotIdInput<'a> {
    component_count: u64,
    edge_count: u64,
    completed_count: u64,
    schema_version: &'a str,
    component_hash: &'a str,
    edge_pair_hash: &'a str,
}

impl GraphSnapshot {
    /// Compute the snapshot of a graph.
    pub fn compute<G: ComponentGraph + ?Sized>(graph: &G) -> Self {
        let components = graph.all_components();
        let edges = graph.all_edges();

        let component_count = components.len() as u64;
        let edge_count = edges.len() as u64;
        let completed_count = components.iter().filter(|c| c.status.is_completed()).count() as u64;

        // all_components() is already ordered by ComponentId
        let component_pairs: Vec<(&str, String)> = components
            .iter()
            .map(|c| (c.id.as_str(), c.status.to_string()))
            .collect();
        let component_hash = canonical_hash_hex(&component_pairs);

        // all_edges() is already in canonical order
        let edge_pairs: Vec<(&str, &str)> = edges
            .iter()
            .map(|e| (e.producer.as_str(), e.consumer.as_str()))
            .collect();
        let edge_pair_hash = canonical_hash_hex(&edge_pairs);

        let snapshot_id = canonical_hash_hex(&SnapshotIdInput {
            component_count,
            edge_count,
            completed_count,
            schema_version: MANIFEST_KERNEL_SCHEMA_VERSION,
            component_hash: &component_hash,
            edge_pair_hash: &edge_pair_hash,
        });

        Self {
            snapshot_id,
            component_count,
            edge_count,
            completed_count,
            schema_version: MANIFEST_KERNEL_SCHEMA_VERSION.to_string(),
            component_hash,
            edge_pair_hash,
        }
    }

    /// Verify that this snapshot matches the given graph.
    pub fn verify<G: ComponentGraph + ?Sized>(&self, graph: &G) -> bool {
        Self::compute(graph).snapshot_id == self.snapshot_id
    }
}
