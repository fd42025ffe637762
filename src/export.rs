//! Netlist export: flatten an elaborated circuit into components and nets.
//!
//! ```text
//! Graph → build_netlist() → Netlist
//!   → export_netlist_json()  pretty JSON for downstream tooling
//!   → export_netlist_dump()  line-oriented text for review and diffs
//! ```
//!
//! Building a netlist runs the board-level passes first: components without
//! a designator get one and every connectivity class gets a net. File
//! formats of specific EDA tools are not produced here.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::library::{
    HasDesignator, HasFootprint, HasKicadFootprint, HasTypeDescription, assign_designators,
    collect_nets, net_name, pad_owner,
};
use crate::model::NodeId;
use crate::Result;

/// A placed part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub designator: String,
    /// Hierarchical name of the module.
    pub name: String,
    pub footprint: Option<String>,
    pub value: Option<String>,
}

/// One pad on a net.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetNode {
    pub designator: String,
    pub pin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetEntry {
    pub name: String,
    pub nodes: Vec<NetNode>,
}

/// Components and nets, both sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netlist {
    pub components: Vec<Component>,
    pub nets: Vec<NetEntry>,
}

/// Build the netlist of everything under `roots`.
///
/// Components are the modules carrying a footprint. Nets without any pad
/// are left out.
pub fn build_netlist(graph: &mut Graph, roots: &[NodeId]) -> Result<Netlist> {
    for root in roots {
        assign_designators(graph, *root)?;
    }
    let nets = collect_nets(graph, roots)?;
    let graph: &Graph = graph;

    let mut netlist = Netlist::default();
    for root in roots {
        let mut modules = vec![*root];
        modules.extend(graph.descendants(*root)?);
        for module in modules {
            if let Some(component) = component_of(graph, module)? {
                netlist.components.push(component);
            }
        }
    }
    netlist.components.sort_by(|a, b| a.designator.cmp(&b.designator));
    netlist.components.dedup();

    for net in nets {
        let part_of = graph.child(net, "part_of")?;
        let mut nodes: Vec<NetNode> = graph
            .connected_interfaces(part_of)?
            .into_iter()
            .filter_map(|member| pad_owner(graph, member))
            .filter_map(|(component, pin)| {
                let designator = graph.get_trait::<dyn HasDesignator>(component).ok()?;
                Some(NetNode {
                    designator: designator.designator().to_string(),
                    pin,
                })
            })
            .collect();
        if nodes.is_empty() {
            continue;
        }
        nodes.sort();
        nodes.dedup();
        netlist.nets.push(NetEntry {
            name: net_name(graph, net)?,
            nodes,
        });
    }
    netlist.nets.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(
        components = netlist.components.len(),
        nets = netlist.nets.len(),
        "netlist built"
    );
    Ok(netlist)
}

fn component_of(graph: &Graph, module: NodeId) -> Result<Option<Component>> {
    if !graph.has_trait::<dyn HasFootprint>(module) || !graph.has_trait::<dyn HasDesignator>(module) {
        return Ok(None);
    }
    let designator = graph.get_trait::<dyn HasDesignator>(module)?.designator().to_string();
    let footprint = if graph.has_trait::<dyn HasKicadFootprint>(module) {
        Some(graph.get_trait::<dyn HasKicadFootprint>(module)?.kicad_footprint().to_string())
    } else {
        None
    };
    let value = graph
        .get_trait::<dyn HasTypeDescription>(module)
        .ok()
        .map(|d| d.type_description(graph, module.into()));

    Ok(Some(Component {
        designator,
        name: graph.full_name(module),
        footprint,
        value,
    }))
}

/// Write the netlist of `roots` as pretty JSON.
pub fn export_netlist_json(graph: &mut Graph, roots: &[NodeId], writer: &mut dyn Write) -> Result<()> {
    let netlist = build_netlist(graph, roots)?;
    serde_json::to_writer_pretty(&mut *writer, &netlist)?;
    writeln!(writer)?;
    Ok(())
}

/// Write the netlist of `roots` as a line-oriented text dump.
///
/// ```text
/// // circuit-graph netlist dump
/// // Components: 2
/// // Nets: 1
///
/// COMPONENT R1 footprint='Resistor_SMD:R_0402' value='10kΩ'
/// NET 'R1-2-R2-1' R1.2 R2.1
/// ```
pub fn export_netlist_dump(graph: &mut Graph, roots: &[NodeId], writer: &mut dyn Write) -> Result<()> {
    let netlist = build_netlist(graph, roots)?;

    writeln!(writer, "// circuit-graph netlist dump")?;
    writeln!(writer, "// Components: {}", netlist.components.len())?;
    writeln!(writer, "// Nets: {}", netlist.nets.len())?;
    writeln!(writer)?;

    for component in &netlist.components {
        writeln!(
            writer,
            "COMPONENT {} footprint={} value={}",
            component.designator,
            format_field(component.footprint.as_deref()),
            format_field(component.value.as_deref()),
        )?;
    }

    writeln!(writer)?;
    for net in &netlist.nets {
        let nodes: Vec<String> = net
            .nodes
            .iter()
            .map(|node| format!("{}.{}", node.designator, node.pin))
            .collect();
        writeln!(writer, "NET {} {}", format_field(Some(net.name.as_str())), nodes.join(" "))?;
    }
    Ok(())
}

/// Quote a text field, `-` when absent.
fn format_field(value: Option<&str>) -> String {
    match value {
        Some(s) => format!("'{}'", s.replace('\'', "\\'")),
        None => "-".to_string(),
    }
}
