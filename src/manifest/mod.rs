//! Manifest records.
//!
//! A [`PackageManifest`] is the resolved, versioned view of one package;
//! a [`WorkspaceManifest`] lists every package once. Both are plain data:
//! rendering to files lives in [`render`].
//!
//! ## Ordering
//!
//! - Dependencies are ordered by package id
//! - Workspace members keep partition definition order
//!
//! so that unchanged inputs produce byte-identical output.

pub mod render;

use serde::{Deserialize, Serialize};

use crate::partition::PackagePartition;
use crate::resolver::{DependencyResolver, ResolveError};
use crate::store::ComponentGraph;
use crate::types::{PackageId, VersionLabel};

pub use render::{Artifact, ArtifactSet, ManifestRenderer, RenderError};

/// One dependency entry of a package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEntry {
    /// Dependency package.
    pub package: PackageId,
    /// The dependency's label computed in the same pass.
    pub version: VersionLabel,
}

/// Resolved manifest record for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package identity.
    pub package: PackageId,
    /// Version label of the package.
    pub version: VersionLabel,
    /// Dependencies, ordered by package id.
    pub dependencies: Vec<DependencyEntry>,
}

impl PackageManifest {
    /// Resolve and version a package.
    pub fn build<G: ComponentGraph + ?Sized>(
        resolver: &DependencyResolver<'_, G>,
        package: &PackageId,
    ) -> Result<Self, ResolveError> {
        let version = resolver.version_of(package)?;
        let dependencies = resolver
            .resolve_with_versions(package)?
            .into_iter()
            .map(|d| DependencyEntry {
                package: d.dependency,
                version: d.version,
            })
            .collect();

        Ok(Self {
            package: package.clone(),
            version,
            dependencies,
        })
    }

    /// Dependency ids, in manifest order.
    pub fn dependency_ids(&self) -> Vec<&PackageId> {
        self.dependencies.iter().map(|d| &d.package).collect()
    }
}

/// Workspace-level manifest listing every package once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    /// Package ids in partition definition order.
    pub members: Vec<PackageId>,
}

impl WorkspaceManifest {
    /// Build from a partition's package order.
    pub fn from_partition(partition: &PackagePartition) -> Self {
        Self {
            members: partition.all_packages().to_vec(),
        }
    }
}
