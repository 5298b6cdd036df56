//! Property tests for resolution and versioning.

use proptest::prelude::*;

use manifest_kernel::{
    BuildStatus, ComponentId, CompletionStats, DependencyResolver, Edge,
    InMemoryComponentGraph, PackageId, PackagePartition, VersionPolicyV1,
};

const COMPONENTS: usize = 12;
const PACKAGES: usize = 4;

fn status_strategy() -> impl Strategy<Value = BuildStatus> {
    prop_oneof![
        Just(BuildStatus::Pending),
        Just(BuildStatus::InProgress),
        Just(BuildStatus::Completed),
    ]
}

/// Random graph over `COMPONENTS` components, each assigned to one of
/// `PACKAGES` packages. Repeated edges are likely.
fn world_strategy() -> impl Strategy<Value = (Vec<BuildStatus>, Vec<usize>, Vec<(usize, usize)>)> {
    (
        prop::collection::vec(status_strategy(), COMPONENTS),
        prop::collection::vec(0..PACKAGES, COMPONENTS),
        prop::collection::vec((0..COMPONENTS, 0..COMPONENTS), 0..40),
    )
}

fn build_world(
    statuses: &[BuildStatus],
    owners: &[usize],
    edges: &[(usize, usize)],
) -> (InMemoryComponentGraph, PackagePartition) {
    let mut graph = InMemoryComponentGraph::new();
    for (i, status) in statuses.iter().enumerate() {
        graph.add_component(format!("c{}", i), *status).unwrap();
    }
    for (from, to) in edges {
        graph.add_edge(Edge::new(format!("c{}", from), format!("c{}", to))).unwrap();
    }

    let mut partition = PackagePartition::new(None);
    for p in 0..PACKAGES {
        let members: Vec<ComponentId> = owners
            .iter()
            .enumerate()
            .filter(|(_, owner)| **owner == p)
            .map(|(i, _)| ComponentId::new(format!("c{}", i)))
            .collect();
        partition.add_package(format!("p{}", p), members).unwrap();
    }

    (graph, partition)
}

proptest! {
    #[test]
    fn resolve_never_contains_self((statuses, owners, edges) in world_strategy()) {
        let (graph, partition) = build_world(&statuses, &owners, &edges);
        let resolver = DependencyResolver::new(&graph, &partition, VersionPolicyV1::default()).unwrap();

        for package in partition.all_packages() {
            let deps = resolver.resolve(package).unwrap();
            prop_assert!(!deps.contains(package));
        }
    }

    #[test]
    fn resolve_matches_cross_package_edges((statuses, owners, edges) in world_strategy()) {
        let (graph, partition) = build_world(&statuses, &owners, &edges);
        let resolver = DependencyResolver::new(&graph, &partition, VersionPolicyV1::default()).unwrap();

        for p in 0..PACKAGES {
            let package = PackageId::new(format!("p{}", p));
            let mut expected: Vec<PackageId> = edges
                .iter()
                .filter(|(from, to)| owners[*to] == p && owners[*from] != p)
                .map(|(from, _)| PackageId::new(format!("p{}", owners[*from])))
                .collect();
            expected.sort();
            expected.dedup();

            let actual: Vec<PackageId> = resolver.resolve(&package).unwrap().into_iter().collect();
            // No duplicates however many edges connect two packages
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn packages_without_inbound_cross_edges_resolve_empty((statuses, owners, edges) in world_strategy()) {
        let (graph, partition) = build_world(&statuses, &owners, &edges);
        let resolver = DependencyResolver::new(&graph, &partition, VersionPolicyV1::default()).unwrap();

        for p in 0..PACKAGES {
            let inbound = edges.iter().any(|(from, to)| owners[*to] == p && owners[*from] != p);
            if !inbound {
                let package = PackageId::new(format!("p{}", p));
                prop_assert!(resolver.resolve(&package).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn tier_is_monotonic_in_completed(total in 1usize..200, a in 0usize..200, b in 0usize..200) {
        let policy = VersionPolicyV1::default();
        let lo = a.min(b).min(total);
        let hi = a.max(b).min(total);

        let lo_tier = CompletionStats::new(lo, total).tier(&policy).unwrap();
        let hi_tier = CompletionStats::new(hi, total).tier(&policy).unwrap();
        prop_assert!(lo_tier <= hi_tier);
    }

    #[test]
    fn resolution_is_repeatable((statuses, owners, edges) in world_strategy()) {
        let (graph, partition) = build_world(&statuses, &owners, &edges);
        let resolver = DependencyResolver::new(&graph, &partition, VersionPolicyV1::default()).unwrap();

        for package in partition.all_packages() {
            prop_assert_eq!(resolver.resolve(package).unwrap(), resolver.resolve(package).unwrap());
        }
    }
}
