//! End-to-end tests for the board-level passes and netlist export.
//!
//! Each test elaborates a small board of resistors with footprints, then
//! checks designators, nets and the exported text.

use circuit_graph::export::{Component, NetEntry, NetNode};
use circuit_graph::library::{
    HasDesignator, HasOverriddenNameDefined, RESISTOR, attach_footprint, collect_nets,
    create_footprint, net_name,
};
use circuit_graph::{
    Graph, GraphConfig, Netlist, NodeId, NodeKind, NodeType, build_netlist, export_netlist_dump,
    export_netlist_json,
};
use pretty_assertions::assert_eq;

static BOARD: NodeType = NodeType::new("Board", NodeKind::Module);

fn resistor(g: &mut Graph, board: NodeId, name: &str, ohms: f64) -> NodeId {
    let r = g.create_child(board, name, &RESISTOR).unwrap();
    g.set_parameter(r, "resistance", ohms).unwrap();
    let fp = create_footprint(g, &["1", "2"]).unwrap();
    let pins = [
        ("1", g.child(r, "unnamed[0]").unwrap()),
        ("2", g.child(r, "unnamed[1]").unwrap()),
    ];
    attach_footprint(g, r, fp, &pins, Some("Resistor_SMD:R_0402")).unwrap();
    r
}

/// Two resistors in series: r1.2 joins r2.1.
fn divider(g: &mut Graph) -> (NodeId, NodeId, NodeId) {
    let board = g.create(&BOARD).unwrap();
    let r1 = resistor(g, board, "r1", 10_000.0);
    let r2 = resistor(g, board, "r2", 4_700.0);
    let (a, b) = (g.child(r1, "unnamed[1]").unwrap(), g.child(r2, "unnamed[0]").unwrap());
    g.connect(a, b).unwrap();
    (board, r1, r2)
}

fn node(designator: &str, pin: &str) -> NetNode {
    NetNode {
        designator: designator.into(),
        pin: pin.into(),
    }
}

// ============================================================================
// 1. Netlist model
// ============================================================================

#[test]
fn test_divider_netlist() {
    let mut g = Graph::new();
    let (board, _, _) = divider(&mut g);

    let netlist = build_netlist(&mut g, &[board]).unwrap();

    assert_eq!(
        netlist.components,
        vec![
            Component {
                designator: "R1".into(),
                name: format!("*{board}.r1"),
                footprint: Some("Resistor_SMD:R_0402".into()),
                value: Some("10kΩ".into()),
            },
            Component {
                designator: "R2".into(),
                name: format!("*{board}.r2"),
                footprint: Some("Resistor_SMD:R_0402".into()),
                value: Some("4.7kΩ".into()),
            },
        ]
    );
    assert_eq!(
        netlist.nets,
        vec![
            NetEntry {
                name: "R1-1".into(),
                nodes: vec![node("R1", "1")],
            },
            NetEntry {
                name: "R1-2-R2-1".into(),
                nodes: vec![node("R1", "2"), node("R2", "1")],
            },
            NetEntry {
                name: "R2-2".into(),
                nodes: vec![node("R2", "2")],
            },
        ]
    );
}

#[test]
fn test_netlist_is_stable_across_runs() {
    let mut g = Graph::new();
    let (board, r1, _) = divider(&mut g);

    let first = build_netlist(&mut g, &[board]).unwrap();
    let nodes = g.node_count();
    let second = build_netlist(&mut g, &[board]).unwrap();

    assert_eq!(first, second);
    assert_eq!(g.node_count(), nodes);
    assert_eq!(g.get_trait::<dyn HasDesignator>(r1).unwrap().designator(), "R1");
}

// ============================================================================
// 2. Net naming
// ============================================================================

#[test]
fn test_overridden_net_name() {
    let mut g = Graph::new();
    let (board, r1, _) = divider(&mut g);
    let middle = g.child(r1, "unnamed[1]").unwrap();
    let nets = collect_nets(&mut g, &[middle]).unwrap();
    g.add_trait(nets[0], HasOverriddenNameDefined("MID".into())).unwrap();

    let netlist = build_netlist(&mut g, &[board]).unwrap();
    let names: Vec<&str> = netlist.nets.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["MID", "R1-1", "R2-2"]);
}

#[test]
fn test_net_name_respects_limit() {
    let mut g = Graph::with_config(GraphConfig {
        net_name_limit: 8,
        ..GraphConfig::default()
    });
    let (board, r1, _) = divider(&mut g);
    build_netlist(&mut g, &[board]).unwrap();

    let middle = g.child(r1, "unnamed[1]").unwrap();
    let nets = collect_nets(&mut g, &[middle]).unwrap();
    assert_eq!(net_name(&g, nets[0]).unwrap(), "R1-2-...");
}

// ============================================================================
// 3. Writers
// ============================================================================

#[test]
fn test_json_export_parses_back() {
    let mut g = Graph::new();
    let (board, _, _) = divider(&mut g);

    let mut out = Vec::new();
    export_netlist_json(&mut g, &[board], &mut out).unwrap();

    let parsed: Netlist = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed, build_netlist(&mut g, &[board]).unwrap());
    assert_eq!(parsed.components.len(), 2);
}

#[test]
fn test_text_dump() {
    let mut g = Graph::new();
    let (board, _, _) = divider(&mut g);

    let mut out = Vec::new();
    export_netlist_dump(&mut g, &[board], &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let expected = "\
// circuit-graph netlist dump
// Components: 2
// Nets: 3

COMPONENT R1 footprint='Resistor_SMD:R_0402' value='10kΩ'
COMPONENT R2 footprint='Resistor_SMD:R_0402' value='4.7kΩ'

NET 'R1-1' R1.1
NET 'R1-2-R2-1' R1.2 R2.1
NET 'R2-2' R2.2
";
    assert_eq!(text, expected);
}
