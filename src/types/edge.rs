//! Producer edges between components.

use serde::{Deserialize, Serialize};
use super::component::ComponentId;

/// Edge in the component graph.
///
/// `producer` is consumed to build `consumer`.
/// Implements `Ord` for deterministic ordering: (producer, consumer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Component whose output is consumed.
    #[serde(rename = "from")]
    pub producer: ComponentId,
    /// Component built from the producer's output.
    #[serde(rename = "to")]
    pub consumer: ComponentId,
}

impl Edge {
    /// Create a new edge.
    pub fn new(producer: impl Into<ComponentId>, consumer: impl Into<ComponentId>) -> Self {
        Self {
            producer: producer.into(),
            consumer: consumer.into(),
        }
    }

    /// Whether the edge starts and ends at the same component.
    pub fn is_self_edge(&self) -> bool {
        self.producer == self.consumer
    }
}

// Canonical ordering: producer, then consumer
impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.producer.cmp(&other.producer) {
            std::cmp::Ordering::Equal => self.consumer.cmp(&other.consumer),
            ord => ord,
        }
    }
}
