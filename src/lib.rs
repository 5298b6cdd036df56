//! # manifest-kernel
//!
//! Deterministic package manifests from component graphs.
//!
//! The kernel answers one question:
//!
//! > Given components, producer edges and a package partition, which
//! > packages must each package depend on, and at what version?
//!
//! ## Core Contract
//!
//! 1. Lift component edges to package dependencies (no self-dependencies, no duplicates)
//! 2. Derive a version label per package from its completion ratio
//! 3. Emit per-package manifests and one workspace manifest, byte-stable across runs
//!
//! ## Architecture
//!
//! ```text
//! WorkspacePlan → ComponentGraph + PackagePartition → DependencyResolver
//!                                                          ↓
//!                               VersionPolicyV1 → BatchResolver → ManifestRenderer
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Dependencies are ordered by package id
//! - Workspace members keep partition definition order
//! - Report and snapshot hashes use canonical JSON (no HashMap in hashed data)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod store;
pub mod partition;
pub mod resolver;
pub mod canonical;
pub mod snapshot;
pub mod manifest;
pub mod batch;
pub mod config;
pub mod plan;
pub mod generate;

// Re-exports
pub use types::{
    ComponentId, Component, BuildStatus, Edge, PackageId, ResolvedDependency,
    VersionTier, VersionLabel,
};
pub use store::{ComponentGraph, InMemoryComponentGraph, GraphError};
pub use partition::{PackagePartition, PartitionError, DEFAULT_FALLBACK_PACKAGE};
pub use policy::{VersionPolicyV1, CompletionStats, PolicyError};
pub use resolver::{DependencyResolver, ResolveError, PackageSummary};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex, content_digest};
pub use snapshot::GraphSnapshot;
pub use manifest::{
    PackageManifest, DependencyEntry, WorkspaceManifest,
    ManifestRenderer, Artifact, ArtifactSet, RenderError,
};
pub use batch::{BatchResolver, BatchReport, PackageFailure};
pub use config::{KernelConfig, ConfigError, DependencySpec, ManifestSettings};
pub use plan::{WorkspacePlan, PackagePlan, PlanError};
pub use generate::{generate, Generation, KernelError};

/// Schema version for all manifest kernel types.
/// Increment on breaking changes to any schema type.
pub const MANIFEST_KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Default policy version identifier.
pub const DEFAULT_POLICY_VERSION: &str = "version_policy_v1";
