//! End-to-end generation: plan + config → report + rendered artifacts.

use tracing::{info, warn};

use crate::batch::{BatchReport, BatchResolver};
use crate::config::{ConfigError, KernelConfig};
use crate::manifest::{ArtifactSet, ManifestRenderer, RenderError};
use crate::plan::{PlanError, WorkspacePlan};
use crate::resolver::{DependencyResolver, ResolveError};
use crate::store::ComponentGraph;
use crate::types::ComponentId;

/// Errors that stop a generation run before any artifact exists.
///
/// Per-package failures are not here; they are recorded in
/// [`BatchReport::failures`].
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Plan is invalid.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// Resolver could not be constructed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Resolution report.
    pub report: BatchReport,
    /// Rendered files, not yet written.
    pub artifacts: ArtifactSet,
    /// Edge endpoints no package claims, ordered by id.
    pub unassigned: Vec<ComponentId>,
}

/// Resolve, version and render a whole plan in memory.
pub fn generate(plan: &WorkspacePlan, config: &KernelConfig) -> Result<Generation, KernelError> {
    config.validate()?;
    let policy = config.version_policy()?;
    let base_version = policy.base_version.clone();
    let (graph, partition) = plan.build(config.fallback_package())?;

    let unassigned = partition.unassigned_components(&graph);
    if !unassigned.is_empty() {
        let names: Vec<&str> = unassigned.iter().map(|c| c.as_str()).collect();
        match partition.fallback() {
            Some(fallback) => warn!(
                fallback = %fallback,
                components = ?names,
                "components without a package fall back"
            ),
            None => warn!(components = ?names, "components without a package and no fallback"),
        }
    }
    for edge in graph.all_edges().iter().filter(|e| e.is_self_edge()) {
        warn!(component = %edge.producer, "self edge ignored");
    }

    let resolver = DependencyResolver::new(&graph, &partition, policy)?;
    let report = BatchResolver::new(resolver).run();

    let renderer = ManifestRenderer::new(config.manifest.clone(), base_version);
    let artifacts = renderer.render_report(&report)?;

    info!(
        artifacts = artifacts.len(),
        failed = report.failures.len(),
        "generation rendered"
    );

    Ok(Generation {
        report,
        artifacts,
        unassigned,
    })
}
