//! Component types for the manifest kernel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a component in the graph.
///
/// Wraps the component name and implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a new ComponentId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the component name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Build status of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// Work has not started.
    Pending,
    /// Work is underway.
    InProgress,
    /// The component is built.
    Completed,
}

impl BuildStatus {
    /// Parse a status from its snake_case name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Whether this status counts toward the completion ratio.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl Default for BuildStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A component node: identifier plus build status.
///
/// Immutable once added to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Unique component identifier.
    pub id: ComponentId,
    /// Current build status.
    pub status: BuildStatus,
}

impl Component {
    /// Create a new component.
    pub fn new(id: impl Into<ComponentId>, status: BuildStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}
