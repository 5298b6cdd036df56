//! Workspace plans: the already-parsed input of a resolution pass.
//!
//! A plan is the serde form of the data model: component statuses, producer
//! edges and the ordered package table. Building a plan validates it
//! eagerly, so every structural error surfaces before resolution starts.
//!
//! ```json
//! {
//!   "components": { "types": "completed", "graph_core": "pending" },
//!   "edges": [ { "from": "types", "to": "graph_core" } ],
//!   "packages": [
//!     { "name": "core", "components": ["types"] },
//!     { "name": "graph", "components": ["graph_core"] }
//!   ]
//! }
//! ```

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::partition::{PackagePartition, PartitionError};
use crate::store::{GraphError, InMemoryComponentGraph};
use crate::types::{BuildStatus, ComponentId, Edge, PackageId};

/// Errors that can occur when loading or building a plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Plan file could not be read.
    #[error("failed to read plan file: {0}")]
    Io(#[from] std::io::Error),

    /// Plan file is not valid JSON for this schema.
    #[error("failed to parse plan: {0}")]
    Parse(#[from] serde_json::Error),

    /// Graph construction failed.
    #[error("invalid graph: {0}")]
    Graph(#[from] GraphError),

    /// Partition construction failed.
    #[error("invalid partition: {0}")]
    Partition(#[from] PartitionError),
}

/// One package row of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackagePlan {
    /// Package name.
    pub name: PackageId,
    /// Member components, in order.
    pub components: Vec<ComponentId>,
}

/// Complete input of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspacePlan {
    /// Component statuses. A component declared twice is a parse error.
    #[serde(deserialize_with = "deserialize_components")]
    pub components: BTreeMap<ComponentId, BuildStatus>,
    /// Producer edges.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Packages, in workspace order.
    pub packages: Vec<PackagePlan>,
}

/// Read the component table, rejecting repeated keys instead of keeping
/// the last one.
fn deserialize_components<'de, D>(deserializer: D) -> Result<BTreeMap<ComponentId, BuildStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ComponentsVisitor;

    impl<'de> Visitor<'de> for ComponentsVisitor {
        type Value = BTreeMap<ComponentId, BuildStatus>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of component id to build status")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut components = BTreeMap::new();
            while let Some((id, status)) = map.next_entry::<ComponentId, BuildStatus>()? {
                if components.contains_key(&id) {
                    return Err(serde::de::Error::custom(GraphError::DuplicateComponent(id)));
                }
                components.insert(id, status);
            }
            Ok(components)
        }
    }

    deserializer.deserialize_map(ComponentsVisitor)
}

impl WorkspacePlan {
    /// Parse a plan from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a plan file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlanError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Build the graph and partition.
    ///
    /// Fails on edges or memberships naming undeclared components and on
    /// overlapping or repeated packages.
    pub fn build(
        &self,
        fallback: Option<PackageId>,
    ) -> Result<(InMemoryComponentGraph, PackagePartition), PlanError> {
        let mut graph = InMemoryComponentGraph::new();
        for (id, status) in &self.components {
            graph.add_component(id.clone(), *status)?;
        }
        for edge in &self.edges {
            graph.add_edge(edge.clone())?;
        }

        let mut partition = PackagePartition::new(fallback);
        for package in &self.packages {
            partition.add_package(package.name.clone(), package.components.iter().cloned())?;
        }
        partition.validate_against(&graph)?;

        Ok((graph, partition))
    }

    /// The reference six-package layout.
    ///
    /// Most components are complete; the HTTP stack is pending and the
    /// frontend framework is in progress, so `server` versions as alpha.
    pub fn reference() -> Self {
        use BuildStatus::{Completed, InProgress, Pending};

        let packages: [(&str, &[(&str, BuildStatus)]); 6] = [
            (
                "core",
                &[
                    ("types", Completed),
                    ("ir_catalog", Completed),
                    ("ir_rule", Completed),
                    ("ir_query", Completed),
                    ("ir_patch", Completed),
                    ("ir_strategy", Completed),
                ],
            ),
            (
                "graph",
                &[("graph_vertex", Completed), ("graph_edge", Completed), ("graph_core", Completed)],
            ),
            (
                "storage",
                &[("storage_mvcc", Completed), ("storage_merkle", Completed), ("storage_lsm", Completed)],
            ),
            (
                "execution",
                &[
                    ("execution_parser", Completed),
                    ("execution_engine", Completed),
                    ("planner_logical", Completed),
                    ("planner_physical", Completed),
                    ("planner_optimizer", Completed),
                ],
            ),
            (
                "rewrite",
                &[("rewrite_matcher", Completed), ("rewrite_applier", Completed), ("rewrite_engine", Completed)],
            ),
            (
                "server",
                &[
                    ("http_ir", Completed),
                    ("http_parser", Pending),
                    ("http_handlers", Pending),
                    ("http_engine", Pending),
                    ("http_server", Pending),
                    ("frontend_component_ir", Completed),
                    ("frontend_route_ir", Completed),
                    ("frontend_render_ir", Completed),
                    ("frontend_build_ir", Completed),
                    ("frontend_api_ir", Completed),
                    ("frontend_framework", InProgress),
                ],
            ),
        ];

        let edges = [
            ("types", "ir_catalog"),
            ("types", "graph_vertex"),
            ("types", "graph_edge"),
            ("graph_vertex", "graph_core"),
            ("graph_edge", "graph_core"),
            ("types", "graph_core"),
        ];

        let mut plan = Self::default();
        for (name, members) in packages {
            for (component, status) in members {
                plan.components.insert(ComponentId::new(*component), *status);
            }
            plan.packages.push(PackagePlan {
                name: PackageId::new(name),
                components: members.iter().map(|(c, _)| ComponentId::new(*c)).collect(),
            });
        }
        plan.edges = edges.iter().map(|(from, to)| Edge::new(*from, *to)).collect();
        plan
    }
}
