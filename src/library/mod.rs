//! # Standard Library
//!
//! Node types, trait families and board-level passes shared by every
//! circuit description.
//!
//! | Type | Kind | Children | Parameters |
//! |------|------|----------|------------|
//! | [`ELECTRICAL`] | interface | | |
//! | [`ELECTRIC_POWER`] | interface | `hv`, `lv` | `voltage` |
//! | [`ELECTRIC_LOGIC`] | interface | `signal`, `reference` | |
//! | [`PAD`] | module | `net` | |
//! | [`FOOTPRINT`] | module | pads by pin number | |
//! | [`NET`] | module | `part_of` | |
//! | [`RESISTOR`] | module | `unnamed[0]`, `unnamed[1]` | `resistance` |
//! | [`CAPACITOR`] | module | `unnamed[0]`, `unnamed[1]` | `capacitance` |

pub mod net;
pub mod traits;

pub use net::{apply_pcb_layout, assign_designators, collect_nets, net_name, pad_owner};
pub use traits::*;

use crate::graph::Graph;
use crate::model::{NodeId, NodeKind, NodeType, Parameter};
use crate::{Error, Result};

// ============================================================================
// Interfaces
// ============================================================================

/// A single electrical conductor.
pub static ELECTRICAL: NodeType = NodeType::new("Electrical", NodeKind::ModuleInterface);

/// A supply rail; connecting two rails merges their `voltage`.
pub static ELECTRIC_POWER: NodeType = NodeType::new("ElectricPower", NodeKind::ModuleInterface)
    .with_init(init_power)
    .with_on_connect(merge_voltage);

/// A logic signal with the rail it is referenced to.
pub static ELECTRIC_LOGIC: NodeType =
    NodeType::new("ElectricLogic", NodeKind::ModuleInterface).with_init(init_logic);

fn init_power(graph: &mut Graph, id: NodeId) -> Result<()> {
    graph.create_child(id, "hv", &ELECTRICAL)?;
    graph.create_child(id, "lv", &ELECTRICAL)?;
    graph.set_parameter(id, "voltage", Parameter::Tbd)
}

fn init_logic(graph: &mut Graph, id: NodeId) -> Result<()> {
    graph.create_child(id, "signal", &ELECTRICAL)?;
    graph.create_child(id, "reference", &ELECTRIC_POWER)?;
    Ok(())
}

fn merge_voltage(graph: &mut Graph, a: NodeId, b: NodeId) -> Result<()> {
    let merged = graph
        .parameter(a, "voltage")?
        .resolve(&graph.parameter(b, "voltage")?)?;
    graph.set_parameter(a, "voltage", merged.clone())?;
    graph.set_parameter(b, "voltage", merged)
}

// ============================================================================
// Board structure
// ============================================================================

/// One footprint pad, wired to the board through `net`.
pub static PAD: NodeType = NodeType::new("Pad", NodeKind::Module).with_init(init_pad);

/// Container of pads, each registered under its pin number.
pub static FOOTPRINT: NodeType = NodeType::new("Footprint", NodeKind::Module);

/// Names one connectivity class through `part_of`.
pub static NET: NodeType = NodeType::new("Net", NodeKind::Module).with_init(init_net);

fn init_pad(graph: &mut Graph, id: NodeId) -> Result<()> {
    graph.create_child(id, "net", &ELECTRICAL)?;
    Ok(())
}

fn init_net(graph: &mut Graph, id: NodeId) -> Result<()> {
    graph.create_child(id, "part_of", &ELECTRICAL)?;
    Ok(())
}

/// Create a footprint with one pad per pin number.
pub fn create_footprint(graph: &mut Graph, pins: &[&str]) -> Result<NodeId> {
    let footprint = graph.create(&FOOTPRINT)?;
    for pin in pins {
        graph.create_child(footprint, *pin, &PAD)?;
    }
    Ok(footprint)
}

/// Give `component` a footprint, wiring each pad to the mapped interface.
///
/// `pinmap` pairs pin numbers of `footprint` with `Electrical` interfaces
/// of `component`. `kicad_name` upgrades the attached trait to
/// `has_kicad_footprint`.
pub fn attach_footprint(
    graph: &mut Graph,
    component: NodeId,
    footprint: NodeId,
    pinmap: &[(&str, NodeId)],
    kicad_name: Option<&str>,
) -> Result<()> {
    if !graph.node(footprint)?.is_a(&FOOTPRINT) {
        return Err(Error::TypeMismatch {
            expected: FOOTPRINT.name.into(),
            got: graph.node_type(footprint)?.name.into(),
        });
    }
    graph.add_child(component, footprint, "footprint")?;

    for (pin, electrical) in pinmap {
        let pad_net = graph.descendant(footprint, &format!("{pin}.net"))?;
        graph.connect(pad_net, *electrical)?;
    }

    let pins = pinmap
        .iter()
        .map(|(pin, electrical)| (pin.to_string(), *electrical))
        .collect();
    graph.add_trait(component, HasFootprintPinmapDefined(pins))?;
    match kicad_name {
        Some(name) => graph.add_trait(
            component,
            HasKicadFootprintDefined {
                footprint,
                name: name.to_string(),
            },
        )?,
        None => graph.add_trait(component, HasFootprintDefined(footprint))?,
    };
    Ok(())
}

// ============================================================================
// Passives
// ============================================================================

pub static RESISTOR: NodeType = NodeType::new("Resistor", NodeKind::Module).with_init(init_resistor);
pub static CAPACITOR: NodeType = NodeType::new("Capacitor", NodeKind::Module).with_init(init_capacitor);

fn init_two_terminal(graph: &mut Graph, id: NodeId) -> Result<(NodeId, NodeId)> {
    let left = graph.create_child(id, "unnamed[0]", &ELECTRICAL)?;
    let right = graph.create_child(id, "unnamed[1]", &ELECTRICAL)?;
    graph.add_trait(
        id,
        CanBridgeDefined {
            input: left,
            output: right,
        },
    )?;
    Ok((left, right))
}

fn init_resistor(graph: &mut Graph, id: NodeId) -> Result<()> {
    init_two_terminal(graph, id)?;
    graph.set_parameter(id, "resistance", Parameter::Tbd)?;
    graph.add_trait(id, HasDesignatorPrefixDefined("R"))?;
    graph.add_trait(id, TypeDescriptionFromParameters::new(&[("resistance", "Ω")]))?;
    Ok(())
}

fn init_capacitor(graph: &mut Graph, id: NodeId) -> Result<()> {
    init_two_terminal(graph, id)?;
    graph.set_parameter(id, "capacitance", Parameter::Tbd)?;
    graph.add_trait(id, HasDesignatorPrefixDefined("C"))?;
    graph.add_trait(id, TypeDescriptionFromParameters::new(&[("capacitance", "F")]))?;
    Ok(())
}
