//! Batch resolution across every package of a partition.
//!
//! Packages are resolved independently and in parallel; a failure in one
//! package is recorded and does not stop the others. Output order is the
//! partition definition order regardless of scheduling.

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::canonical::canonical_hash_hex;
use crate::manifest::{PackageManifest, WorkspaceManifest};
use crate::resolver::{DependencyResolver, PackageSummary, ResolveError};
use crate::snapshot::GraphSnapshot;
use crate::store::ComponentGraph;
use crate::types::PackageId;

fn serialize_display<T: std::fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// A package that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageFailure {
    /// The failed package.
    pub package: PackageId,
    /// Why it failed.
    #[serde(serialize_with = "serialize_display")]
    pub error: ResolveError,
}

/// Result of a batch pass.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Graph snapshot the pass was computed against.
    pub snapshot_id: String,
    /// Policy ID used for versioning.
    pub policy_id: String,
    /// Policy parameters hash.
    pub policy_params_hash: String,
    /// Manifests of healthy packages, in partition order.
    pub manifests: Vec<PackageManifest>,
    /// Completion summaries of healthy packages, in partition order.
    pub summaries: Vec<PackageSummary>,
    /// Failed packages, in partition order.
    pub failures: Vec<PackageFailure>,
    /// Workspace listing every package, failed ones included.
    pub workspace: WorkspaceManifest,
    /// Hash over manifests and failures for integrity verification.
    pub report_hash: String,
}

impl BatchReport {
    /// Whether every package resolved.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get manifest by package ID.
    pub fn manifest_for(&self, package: &PackageId) -> Option<&PackageManifest> {
        self.manifests.iter().find(|m| &m.package == package)
    }

    /// Get failure by package ID.
    pub fn failure_for(&self, package: &PackageId) -> Option<&PackageFailure> {
        self.failures.iter().find(|f| &f.package == package)
    }
}

/// Internal struct for computing report_hash.
#[derive(Serialize)]
struct ReportHashInput<'a> {
    snapshot_id: &'a str,
    policy_params_hash: &'a str,
    manifests: &'a [PackageManifest],
    failures: &'a [PackageFailure],
    workspace: &'a WorkspaceManifest,
}

/// Batch resolver for generating manifests across all packages.
pub struct BatchResolver<'a, G: ComponentGraph + ?Sized> {
    resolver: DependencyResolver<'a, G>,
}

impl<'a, G: ComponentGraph + ?Sized> BatchResolver<'a, G> {
    /// Create a batch resolver.
    pub fn new(resolver: DependencyResolver<'a, G>) -> Self {
        Self { resolver }
    }

    /// Resolve and version every package.
    pub fn run(&self) -> BatchReport {
        let snapshot = GraphSnapshot::compute(self.resolver.graph());
        let partition = self.resolver.partition();
        let policy = self.resolver.policy();

        let outcomes: Vec<(PackageId, Result<(PackageManifest, PackageSummary), ResolveError>)> = partition
            .all_packages()
            .par_iter()
            .map(|package| (package.clone(), self.build_one(package)))
            .collect();

        let mut manifests = Vec::with_capacity(outcomes.len());
        let mut summaries = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for (package, outcome) in outcomes {
            match outcome {
                Ok((manifest, summary)) => {
                    manifests.push(manifest);
                    summaries.push(summary);
                }
                Err(error) => {
                    warn!(package = %package, error = %error, "package resolution failed");
                    failures.push(PackageFailure { package, error });
                }
            }
        }

        let workspace = WorkspaceManifest::from_partition(partition);
        let policy_params_hash = policy.params_hash();

        let report_hash = canonical_hash_hex(&ReportHashInput {
            snapshot_id: &snapshot.snapshot_id,
            policy_params_hash: &policy_params_hash,
            manifests: &manifests,
            failures: &failures,
            workspace: &workspace,
        });

        info!(
            snapshot_id = %snapshot.snapshot_id,
            packages = workspace.members.len(),
            resolved = manifests.len(),
            failed = failures.len(),
            report_hash = %report_hash,
            "batch resolution complete"
        );

        BatchReport {
            snapshot_id: snapshot.snapshot_id,
            policy_id: policy.policy_id().to_string(),
            policy_params_hash,
            manifests,
            summaries,
            failures,
            workspace,
            report_hash,
        }
    }

    fn build_one(&self, package: &PackageId) -> Result<(PackageManifest, PackageSummary), ResolveError> {
        let summary = self.resolver.summary(package)?;
        let manifest = PackageManifest::build(&self.resolver, package)?;
        Ok((manifest, summary))
    }

    /// Get the underlying resolver.
    pub fn resolver(&self) -> &DependencyResolver<'a, G> {
        &self.resolver
    }
}
