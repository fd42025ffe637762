//! Property tests: parameter resolution laws and connectivity invariants
//! under random connection sequences.

use circuit_graph::library::ELECTRICAL;
use circuit_graph::{Graph, NodeId, Parameter};
use proptest::prelude::*;

fn parameter() -> impl Strategy<Value = Parameter> {
    prop_oneof![
        Just(Parameter::Tbd),
        (0i32..8).prop_map(|v| Parameter::Constant(v as f64)),
        (0i32..8, 0i32..8).prop_map(|(a, b)| Parameter::Range {
            min: a.min(b) as f64,
            max: a.max(b) as f64,
        }),
        prop::collection::vec(0i32..8, 1..5)
            .prop_map(|values| Parameter::set(values.into_iter().map(f64::from))),
    ]
}

/// Connected components of `pairs` over `n` vertices.
fn components(n: usize, pairs: &[(usize, usize)]) -> Vec<usize> {
    fn find(parent: &mut [usize], x: usize) -> usize {
        let mut root = x;
        while parent[root] != root {
            root = parent[root];
        }
        parent[x] = root;
        root
    }

    let mut parent: Vec<usize> = (0..n).collect();
    for (a, b) in pairs {
        let (ra, rb) = (find(&mut parent, *a), find(&mut parent, *b));
        parent[ra] = rb;
    }
    (0..n).map(|x| find(&mut parent, x)).collect()
}

fn wires(g: &mut Graph, n: usize) -> Vec<NodeId> {
    (0..n).map(|_| g.create(&ELECTRICAL).unwrap()).collect()
}

// ============================================================================
// 1. Parameter resolution
// ============================================================================

proptest! {
    #[test]
    fn prop_tbd_is_identity(p in parameter()) {
        prop_assert_eq!(Parameter::Tbd.resolve(&p).unwrap(), p.clone());
        prop_assert_eq!(p.resolve(&Parameter::Tbd).unwrap(), p);
    }

    #[test]
    fn prop_resolve_is_order_independent(a in parameter(), b in parameter()) {
        let (ab, ba) = (a.resolve(&b), b.resolve(&a));
        prop_assert_eq!(ab.is_ok(), ba.is_ok());
        if let (Ok(ab), Ok(ba)) = (ab, ba) {
            prop_assert_eq!(ab, ba);
        }
    }

    #[test]
    fn prop_resolve_is_idempotent(p in parameter()) {
        prop_assert_eq!(p.resolve(&p).unwrap(), p);
    }

    #[test]
    fn prop_resolved_constant_is_admissible(a in parameter(), b in parameter()) {
        if let Ok(Parameter::Constant(v)) = a.resolve(&b) {
            prop_assert!(a.contains(v));
            prop_assert!(b.contains(v));
        }
    }

    #[test]
    fn prop_constant_and_range(v in 0i32..20, lo in 0i32..20, hi in 0i32..20) {
        let (lo, hi) = (lo.min(hi) as f64, lo.max(hi) as f64);
        let v = v as f64;
        let resolved = Parameter::Constant(v).resolve(&Parameter::Range { min: lo, max: hi });
        prop_assert_eq!(resolved.is_ok(), lo <= v && v <= hi);
    }
}

// ============================================================================
// 2. Connectivity under random connection sequences
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_connectivity_matches_union_find(
        pairs in prop::collection::vec((0usize..8, 0usize..8), 0..12),
    ) {
        let mut g = Graph::new();
        let nodes = wires(&mut g, 8);
        for (a, b) in &pairs {
            g.connect(nodes[*a], nodes[*b]).unwrap();
        }

        let expected = components(8, &pairs);
        for a in 0..8 {
            for b in 0..8 {
                let connected = g.is_connected_to(nodes[a], nodes[b]);
                prop_assert_eq!(connected, expected[a] == expected[b], "{} {}", a, b);
                prop_assert_eq!(connected, g.is_connected_to(nodes[b], nodes[a]));
            }
        }
    }

    #[test]
    fn prop_reconnecting_adds_no_links(
        pairs in prop::collection::vec((0usize..6, 0usize..6), 1..10),
    ) {
        let mut g = Graph::new();
        let nodes = wires(&mut g, 6);
        for (a, b) in &pairs {
            g.connect(nodes[*a], nodes[*b]).unwrap();
        }

        let links = g.link_count();
        for (a, b) in pairs.iter().rev() {
            g.connect(nodes[*b], nodes[*a]).unwrap();
        }
        prop_assert_eq!(g.link_count(), links);
    }

    #[test]
    fn prop_connected_classes_are_cliques(
        pairs in prop::collection::vec((0usize..6, 0usize..6), 0..10),
    ) {
        let mut g = Graph::new();
        let nodes = wires(&mut g, 6);
        for (a, b) in &pairs {
            g.connect(nodes[*a], nodes[*b]).unwrap();
        }

        for a in &nodes {
            for b in g.connected_interfaces(*a).unwrap() {
                let (ga, gb) = (g.connected_gif(*a).unwrap(), g.connected_gif(b).unwrap());
                prop_assert!(g.is_interface_connected(ga, gb));
            }
        }
    }
}
