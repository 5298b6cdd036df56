//! Package partition: which package owns which components.
//!
//! A partition assigns every component to exactly one package. Packages
//! keep their definition order so that workspace output stays stable
//! across runs. Components without an explicit owner fall back to an
//! injected default package; with no fallback configured the lookup fails
//! with [`PartitionError::NonTotal`].

use std::collections::BTreeMap;

use crate::store::ComponentGraph;
use crate::types::{ComponentId, PackageId};

/// Default fallback package name used by [`crate::config::KernelConfig`].
pub const DEFAULT_FALLBACK_PACKAGE: &str = "core";

/// Error type for partition construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    /// Package name is not a valid Cargo package name.
    #[error("Invalid package name {0:?}: use ASCII letters, digits, '-' and '_'")]
    InvalidPackageName(PackageId),
    /// Package declared twice.
    #[error("Duplicate package: {0}")]
    DuplicatePackage(PackageId),
    /// Component assigned to more than one package.
    #[error("Component {component} assigned to both {first} and {second}")]
    OverlappingMembership {
        /// The contested component.
        component: ComponentId,
        /// Package that claimed it first.
        first: PackageId,
        /// Package that tried to claim it again.
        second: PackageId,
    },
    /// Package membership references a component the graph never declared.
    #[error("Package {package} references unknown component {component}")]
    UnknownComponent {
        /// Package with the bad member.
        package: PackageId,
        /// The undeclared component.
        component: ComponentId,
    },
    /// Component has no owner and no fallback package is configured.
    #[error("Component {0} has no package and no fallback is configured")]
    NonTotal(ComponentId),
}

/// Static mapping from packages to their components.
#[derive(Debug, Clone, Default)]
pub struct PackagePartition {
    /// Packages in definition order.
    order: Vec<PackageId>,
    /// Package -> members, in definition order.
    members: BTreeMap<PackageId, Vec<ComponentId>>,
    /// Component -> owning package.
    owners: BTreeMap<ComponentId, PackageId>,
    /// Owner for components not explicitly assigned.
    fallback: Option<PackageId>,
}

impl PackagePartition {
    /// Create an empty partition with an optional fallback package.
    pub fn new(fallback: Option<PackageId>) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    /// Create an empty partition using [`DEFAULT_FALLBACK_PACKAGE`].
    pub fn with_default_fallback() -> Self {
        Self::new(Some(PackageId::new(DEFAULT_FALLBACK_PACKAGE)))
    }

    /// Declare a package and its components.
    ///
    /// A component listed twice in the same package is kept once. The
    /// name must pass [`PackageId::is_cargo_name`], since it becomes a
    /// directory of the generated workspace.
    pub fn add_package<I, C>(&mut self, package: impl Into<PackageId>, components: I) -> Result<(), PartitionError>
    where
        I: IntoIterator<Item = C>,
        C: Into<ComponentId>,
    {
        let package = package.into();
        if !package.is_cargo_name() {
            return Err(PartitionError::InvalidPackageName(package));
        }
        if self.members.contains_key(&package) {
            return Err(PartitionError::DuplicatePackage(package));
        }

        let mut list: Vec<ComponentId> = Vec::new();
        for component in components {
            let component = component.into();
            if list.contains(&component) {
                continue;
            }
            if let Some(first) = self.owners.get(&component) {
                return Err(PartitionError::OverlappingMembership {
                    component,
                    first: first.clone(),
                    second: package,
                });
            }
            list.push(component);
        }

        for component in &list {
            self.owners.insert(component.clone(), package.clone());
        }
        self.order.push(package.clone());
        self.members.insert(package, list);
        Ok(())
    }

    /// Owning package of a component.
    ///
    /// Falls back to the configured default package for unassigned
    /// components.
    pub fn package_of(&self, component: &ComponentId) -> Result<&PackageId, PartitionError> {
        self.owners
            .get(component)
            .or(self.fallback.as_ref())
            .ok_or_else(|| PartitionError::NonTotal(component.clone()))
    }

    /// Components of a package, in definition order.
    ///
    /// Unknown packages have no components.
    pub fn components_of(&self, package: &PackageId) -> &[ComponentId] {
        self.members.get(package).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All packages, in definition order.
    pub fn all_packages(&self) -> &[PackageId] {
        &self.order
    }

    /// Whether the package was declared.
    pub fn contains_package(&self, package: &PackageId) -> bool {
        self.members.contains_key(package)
    }

    /// The fallback package, if configured.
    pub fn fallback(&self) -> Option<&PackageId> {
        self.fallback.as_ref()
    }

    /// Number of declared packages.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no package is declared.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Check that every member is a declared component of `graph`.
    pub fn validate_against<G: ComponentGraph + ?Sized>(&self, graph: &G) -> Result<(), PartitionError> {
        for package in &self.order {
            for component in self.components_of(package) {
                if !graph.contains(component) {
                    return Err(PartitionError::UnknownComponent {
                        package: package.clone(),
                        component: component.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Components appearing in edges of `graph` that no package claims.
    ///
    /// These resolve to the fallback package, or fail when none is set.
    pub fn unassigned_components<G: ComponentGraph + ?Sized>(&self, graph: &G) -> Vec<ComponentId> {
        let mut unassigned: Vec<ComponentId> = graph
            .all_edges()
            .into_iter()
            .flat_map(|e| [e.producer, e.consumer])
            .filter(|c| !self.owners.contains_key(c))
            .collect();
        unassigned.sort();
        unassigned.dedup();
        unassigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryComponentGraph;
    use crate::types::{BuildStatus, Edge};

    fn pkg(s: &str) -> PackageId {
        PackageId::new(s)
    }

    fn comp(s: &str) -> ComponentId {
        ComponentId::new(s)
    }

    #[test]
    fn test_package_of_explicit_member() {
        let mut partition = PackagePartition::new(None);
        partition.add_package("graph", ["graph_vertex", "graph_edge"]).unwrap();

        assert_eq!(partition.package_of(&comp("graph_edge")).unwrap(), &pkg("graph"));
    }

    #[test]
    fn test_fallback_makes_lookup_total() {
        let mut partition = PackagePartition::new(Some(pkg("base")));
        partition.add_package("graph", ["graph_core"]).unwrap();

        assert_eq!(partition.package_of(&comp("stray")).unwrap(), &pkg("base"));
    }

    #[test]
    fn test_no_fallback_is_non_total() {
        let partition = PackagePartition::new(None);
        assert_eq!(
            partition.package_of(&comp("stray")).unwrap_err(),
            PartitionError::NonTotal(comp("stray"))
        );
    }

    #[test]
    fn test_default_fallback_constant() {
        let partition = PackagePartition::with_default_fallback();
        assert_eq!(partition.fallback(), Some(&pkg(DEFAULT_FALLBACK_PACKAGE)));
    }

    #[test]
    fn test_overlapping_membership_rejected() {
        let mut partition = PackagePartition::new(None);
        partition.add_package("x", ["a", "b"]).unwrap();

        let err = partition.add_package("y", ["c", "b"]).unwrap_err();
        assert_eq!(
            err,
            PartitionError::OverlappingMembership {
                component: comp("b"),
                first: pkg("x"),
                second: pkg("y"),
            }
        );
        // Failed declaration leaves no trace
        assert!(!partition.contains_package(&pkg("y")));
        assert!(partition.package_of(&comp("c")).is_err());
    }

    #[test]
    fn test_duplicate_package_rejected() {
        let mut partition = PackagePartition::new(None);
        partition.add_package("x", ["a"]).unwrap();
        assert_eq!(
            partition.add_package("x", ["b"]).unwrap_err(),
            PartitionError::DuplicatePackage(pkg("x"))
        );
    }

    #[test]
    fn test_path_like_package_name_rejected() {
        let mut partition = PackagePartition::new(None);
        for name in ["../../escaped", "nested/pkg", ""] {
            assert_eq!(
                partition.add_package(name, ["a"]).unwrap_err(),
                PartitionError::InvalidPackageName(pkg(name))
            );
        }
        assert!(partition.is_empty());
        assert!(partition.package_of(&comp("a")).is_err());
    }

    #[test]
    fn test_definition_order_preserved() {
        let mut partition = PackagePartition::new(None);
        partition.add_package("zeta", ["z"]).unwrap();
        partition.add_package("alpha", ["a", "a", "b"]).unwrap();

        assert_eq!(partition.all_packages(), &[pkg("zeta"), pkg("alpha")]);
        assert_eq!(partition.components_of(&pkg("alpha")), &[comp("a"), comp("b")]);
        assert!(partition.components_of(&pkg("missing")).is_empty());
    }

    #[test]
    fn test_validate_against_graph() {
        let mut graph = InMemoryComponentGraph::new();
        graph.add_component("a", BuildStatus::Completed).unwrap();

        let mut partition = PackagePartition::new(None);
        partition.add_package("x", ["a", "ghost"]).unwrap();

        assert_eq!(
            partition.validate_against(&graph).unwrap_err(),
            PartitionError::UnknownComponent {
                package: pkg("x"),
                component: comp("ghost"),
            }
        );
    }

    #[test]
    fn test_unassigned_components() {
        let mut graph = InMemoryComponentGraph::new();
        for name in ["a", "b", "c"] {
            graph.add_component(name, BuildStatus::Completed).unwrap();
        }
        graph.add_edge(Edge::new("a", "b")).unwrap();
        graph.add_edge(Edge::new("c", "b")).unwrap();

        let mut partition = PackagePartition::new(None);
        partition.add_package("x", ["b"]).unwrap();

        assert_eq!(partition.unassigned_components(&graph), vec![comp("a"), comp("c")]);
    }
}
