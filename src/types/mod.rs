//! Core types for the manifest kernel.

pub mod component;
pub mod edge;
pub mod package;
pub mod version;

pub use component::{ComponentId, Component, BuildStatus};
pub use edge::Edge;
pub use package::{PackageId, ResolvedDependency, is_cargo_name};
pub use version::{VersionTier, VersionLabel, ParseLabelError};
