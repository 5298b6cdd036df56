//! Package dependency resolver.
//!
//! Lifts component-level producer edges to package-level dependencies and
//! derives each package's version label from its completion ratio.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::partition::{PackagePartition, PartitionError};
use crate::policy::{CompletionStats, VersionPolicyV1};
use crate::store::ComponentGraph;
use crate::types::{ComponentId, PackageId, ResolvedDependency, VersionLabel, VersionTier};

/// Error type for resolver operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Package membership references a component the graph never declared.
    #[error("Package {package} references unknown component {component}")]
    UnknownComponent {
        /// Package with the bad member.
        package: PackageId,
        /// The undeclared component.
        component: ComponentId,
    },
    /// A producer has no owning package and no fallback is configured.
    #[error("Component {0} has no package and no fallback is configured")]
    NonTotalPartition(ComponentId),
    /// Package has no components, so no completion ratio exists.
    #[error("Package {0} has no components")]
    EmptyPackage(PackageId),
    /// A resolved dependency's own version could not be computed.
    #[error("Dependency {dependency} has no version: {source}")]
    DependencyVersion {
        /// The dependency that failed.
        dependency: PackageId,
        /// Why it failed.
        source: Box<ResolveError>,
    },
    /// Partition is malformed.
    #[error("Partition error: {0}")]
    Partition(PartitionError),
}

impl From<PartitionError> for ResolveError {
    fn from(e: PartitionError) -> Self {
        match e {
            PartitionError::NonTotal(component) => Self::NonTotalPartition(component),
            PartitionError::UnknownComponent { package, component } => {
                Self::UnknownComponent { package, component }
            }
            other => Self::Partition(other),
        }
    }
}

/// Completion summary for one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSummary {
    /// The package.
    pub package: PackageId,
    /// Completed and total component counts.
    pub stats: CompletionStats,
    /// Completed / total.
    pub ratio: f64,
    /// Tier derived from the ratio.
    pub tier: VersionTier,
    /// Rendered label.
    pub version: VersionLabel,
}

/// Dependency resolver over a graph and a partition.
///
/// ## Algorithm
///
/// For a package P:
/// 1. For each member component c, collect `producers_of(c)`
/// 2. Map each producer to its owning package
/// 3. Union, then drop P itself
///
/// Resolution is single-hop: only direct producers are consulted, so
/// package-level cycles terminate. A transitive closure would need its
/// own cycle detection.
///
/// Borrows the graph and partition immutably, so one resolver can be
/// shared across threads.
pub struct DependencyResolver<'a, G: ComponentGraph + ?Sized> {
    graph: &'a G,
    partition: &'a PackagePartition,
    policy: VersionPolicyV1,
}

impl<'a, G: ComponentGraph + ?Sized> DependencyResolver<'a, G> {
    /// Create a resolver.
    ///
    /// Fails fast with [`ResolveError::UnknownComponent`] if any package
    /// member was never declared in the graph.
    pub fn new(
        graph: &'a G,
        partition: &'a PackagePartition,
        policy: VersionPolicyV1,
    ) -> Result<Self, ResolveError> {
        partition.validate_against(graph)?;
        Ok(Self { graph, partition, policy })
    }

    /// Packages that `package` depends on, ordered by PackageId.
    ///
    /// Never contains `package`. Unknown packages resolve to the empty set.
    pub fn resolve(&self, package: &PackageId) -> Result<BTreeSet<PackageId>, ResolveError> {
        let mut dependencies: BTreeSet<PackageId> = BTreeSet::new();

        for component in self.partition.components_of(package) {
            for producer in self.graph.producers_of(component) {
                let owner = self.partition.package_of(&producer)?;
                if owner != package {
                    dependencies.insert(owner.clone());
                }
            }
        }

        debug!(
            package = %package,
            dependency_count = dependencies.len(),
            "resolved package dependencies"
        );

        Ok(dependencies)
    }

    /// Completed and total component counts for a package.
    pub fn completion(&self, package: &PackageId) -> CompletionStats {
        CompletionStats::from_statuses(
            self.partition
                .components_of(package)
                .iter()
                .filter_map(|c| self.graph.status_of(c)),
        )
    }

    /// Version label for a package.
    ///
    /// Packages with no components fail with [`ResolveError::EmptyPackage`]
    /// rather than being treated as fully complete.
    pub fn version_of(&self, package: &PackageId) -> Result<VersionLabel, ResolveError> {
        Ok(self.summary(package)?.version)
    }

    /// Completion stats, tier and label for a package.
    pub fn summary(&self, package: &PackageId) -> Result<PackageSummary, ResolveError> {
        let stats = self.completion(package);
        let ratio = stats
            .ratio()
            .ok_or_else(|| ResolveError::EmptyPackage(package.clone()))?;
        let tier = self.policy.classify(ratio);

        Ok(PackageSummary {
            package: package.clone(),
            stats,
            ratio,
            tier,
            version: self.policy.label(tier),
        })
    }

    /// Dependencies of `package` paired with their current labels.
    pub fn resolve_with_versions(
        &self,
        package: &PackageId,
    ) -> Result<Vec<ResolvedDependency>, ResolveError> {
        self.resolve(package)?
            .into_iter()
            .map(|dependency| {
                let version = self.version_of(&dependency).map_err(|e| {
                    ResolveError::DependencyVersion {
                        dependency: dependency.clone(),
                        source: Box::new(e),
                    }
                })?;
                Ok(ResolvedDependency {
                    dependent: package.clone(),
                    dependency,
                    version,
                })
            })
            .collect()
    }

    /// Get the policy.
    pub fn policy(&self) -> &VersionPolicyV1 {
        &self.policy
    }

    /// Get the partition.
    pub fn partition(&self) -> &PackagePartition {
        self.partition
    }

    /// Get a reference to the graph.
    pub fn graph(&self) -> &G {
        self.graph
    }
}
